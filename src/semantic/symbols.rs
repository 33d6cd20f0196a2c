use serde::{Deserialize, Serialize};

use crate::errors::{Result, TypeDepsError};

/// Index of a symbol inside its [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kinds of symbols the front-end binds identifiers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    TypeParameter,
    Field,
    Method,
    Property,
    Event,
    Local,
    Parameter,
}

#[allow(clippy::should_implement_trait)]
impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Namespace => "namespace",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::Delegate => "delegate",
            SymbolKind::TypeParameter => "type_parameter",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::Event => "event",
            SymbolKind::Local => "local",
            SymbolKind::Parameter => "parameter",
        }
    }

    /// Parses a string into a `SymbolKind`, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<SymbolKind> {
        match s {
            "namespace" => Some(SymbolKind::Namespace),
            "class" => Some(SymbolKind::Class),
            "struct" => Some(SymbolKind::Struct),
            "interface" => Some(SymbolKind::Interface),
            "enum" => Some(SymbolKind::Enum),
            "delegate" => Some(SymbolKind::Delegate),
            "type_parameter" => Some(SymbolKind::TypeParameter),
            "field" => Some(SymbolKind::Field),
            "method" => Some(SymbolKind::Method),
            "property" => Some(SymbolKind::Property),
            "event" => Some(SymbolKind::Event),
            "local" => Some(SymbolKind::Local),
            "parameter" => Some(SymbolKind::Parameter),
            _ => None,
        }
    }

    /// Kinds that can contain members: every type kind except type
    /// parameters.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class
                | SymbolKind::Struct
                | SymbolKind::Interface
                | SymbolKind::Enum
                | SymbolKind::Delegate
        )
    }

    /// Namespaces and every kind of type, type parameters included.
    pub fn is_namespace_or_type(&self) -> bool {
        matches!(
            self,
            SymbolKind::Namespace
                | SymbolKind::Class
                | SymbolKind::Struct
                | SymbolKind::Interface
                | SymbolKind::Enum
                | SymbolKind::Delegate
                | SymbolKind::TypeParameter
        )
    }
}

/// A declared entity as seen by the front-end's binder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Nearest enclosing type. Set for members and nested types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<SymbolId>,
    /// Nearest enclosing namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_namespace: Option<SymbolId>,
    /// Compiled unit (assembly, package) that declares the symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Marks the root namespace, which contributes no path segment.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_global: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            containing_type: None,
            containing_namespace: None,
            module: None,
            is_global: false,
        }
    }

    pub fn is_namespace_or_type(&self) -> bool {
        self.kind.is_namespace_or_type()
    }
}

/// All symbols of a compiled unit, including the external ones its code
/// references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Adds the root namespace.
    pub fn add_global_namespace(&mut self) -> SymbolId {
        self.add(Symbol {
            is_global: true,
            ..Symbol::new("", SymbolKind::Namespace)
        })
    }

    /// Adds a namespace nested in `parent` (or at the root when `None`).
    pub fn add_namespace(&mut self, name: &str, parent: Option<SymbolId>) -> SymbolId {
        self.add(Symbol {
            containing_namespace: parent,
            ..Symbol::new(name, SymbolKind::Namespace)
        })
    }

    /// Adds a type declared directly in `namespace`.
    pub fn add_type(
        &mut self,
        name: &str,
        kind: SymbolKind,
        namespace: Option<SymbolId>,
        module: &str,
    ) -> SymbolId {
        self.add(Symbol {
            containing_namespace: namespace,
            module: Some(module.to_string()),
            ..Symbol::new(name, kind)
        })
    }

    /// Adds a member (or nested type) of `owner`, inheriting its namespace
    /// and module.
    pub fn add_member(&mut self, name: &str, kind: SymbolKind, owner: SymbolId) -> SymbolId {
        let (namespace, module) = match self.get(owner) {
            Some(o) => (o.containing_namespace, o.module.clone()),
            None => (None, None),
        };
        self.add(Symbol {
            containing_type: Some(owner),
            containing_namespace: namespace,
            module,
            ..Symbol::new(name, kind)
        })
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// Checks that every containment link points into the table, that
    /// namespace links point at namespaces and type links at types, and that
    /// no containment chain loops back on itself.
    pub fn validate(&self, path: &str) -> Result<()> {
        let invalid = |message: String| TypeDepsError::Snapshot {
            message,
            path: path.to_string(),
        };

        for (id, symbol) in self.iter() {
            for (link, label) in [
                (symbol.containing_type, "containing_type"),
                (symbol.containing_namespace, "containing_namespace"),
            ] {
                if let Some(target) = link {
                    if self.get(target).is_none() {
                        return Err(invalid(format!(
                            "symbol {} ('{}') has {label} {} outside the table",
                            id.0, symbol.name, target.0
                        )));
                    }
                }
            }
            if let Some(owner) = symbol.containing_type.and_then(|t| self.get(t)) {
                if !owner.kind.is_type() {
                    return Err(invalid(format!(
                        "symbol {} ('{}') has a containing type of kind {}",
                        id.0,
                        symbol.name,
                        owner.kind.as_str()
                    )));
                }
            }
            if let Some(ns) = symbol.containing_namespace.and_then(|n| self.get(n)) {
                if ns.kind != SymbolKind::Namespace {
                    return Err(invalid(format!(
                        "symbol {} ('{}') has a containing namespace of kind {}",
                        id.0,
                        symbol.name,
                        ns.kind.as_str()
                    )));
                }
            }
        }

        for (id, symbol) in self.iter() {
            for (next, label) in [
                (containing_type as fn(&Symbol) -> Option<SymbolId>, "containing_type"),
                (containing_namespace, "containing_namespace"),
            ] {
                if self.is_cyclic(symbol, next) {
                    return Err(invalid(format!(
                        "{label} chain of symbol {} ('{}') is cyclic",
                        id.0, symbol.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// A chain longer than the table itself must revisit a symbol.
    fn is_cyclic(&self, start: &Symbol, next: fn(&Symbol) -> Option<SymbolId>) -> bool {
        let mut steps = 0;
        let mut current = next(start);
        while let Some(id) = current {
            steps += 1;
            if steps > self.len() {
                return true;
            }
            current = self.get(id).and_then(next);
        }
        false
    }
}

fn containing_type(symbol: &Symbol) -> Option<SymbolId> {
    symbol.containing_type
}

fn containing_namespace(symbol: &Symbol) -> Option<SymbolId> {
    symbol.containing_namespace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_kind_as_str_roundtrip() {
        for kind in [
            SymbolKind::Namespace,
            SymbolKind::Class,
            SymbolKind::TypeParameter,
            SymbolKind::Field,
            SymbolKind::Parameter,
        ] {
            assert_eq!(SymbolKind::from_str(kind.as_str()), Some(kind));
        }
        assert!(SymbolKind::from_str("module").is_none());
    }

    #[test]
    fn members_inherit_namespace_and_module() {
        let mut table = SymbolTable::new();
        let ns = table.add_namespace("NS", None);
        let ty = table.add_type("A", SymbolKind::Class, Some(ns), "M");
        let field = table.add_member("f", SymbolKind::Field, ty);
        let f = table.get(field).unwrap();
        assert_eq!(f.containing_type, Some(ty));
        assert_eq!(f.containing_namespace, Some(ns));
        assert_eq!(f.module.as_deref(), Some("M"));
        assert!(table.validate("unit").is_ok());
    }

    #[test]
    fn validate_rejects_namespace_cycle() {
        let mut table = SymbolTable::new();
        let a = table.add_namespace("A", Some(SymbolId(1)));
        table.add_namespace("B", Some(a));
        let err = table.validate("unit").unwrap_err();
        assert!(err.to_string().contains("cyclic"));
    }

    #[test]
    fn validate_rejects_member_contained_in_member() {
        let mut table = SymbolTable::new();
        let ty = table.add_type("T", SymbolKind::Class, None, "M");
        let method = table.add_member("Run", SymbolKind::Method, ty);
        table.add_member("x", SymbolKind::Local, method);
        let err = table.validate("unit").unwrap_err();
        assert!(err.to_string().contains("containing type of kind method"));
    }

    #[test]
    fn validate_rejects_dangling_link() {
        let mut table = SymbolTable::new();
        table.add_namespace("A", Some(SymbolId(9)));
        assert!(table.validate("unit").is_err());
    }
}
