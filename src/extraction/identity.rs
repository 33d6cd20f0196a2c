use crate::semantic::{SemanticModel, Symbol};
use crate::types::TypeIdentity;

/// Dot-joined chain of namespaces enclosing `symbol`, outermost first.
///
/// Walks `containing_namespace` links outward until the chain ends. The
/// global namespace (and any unnamed namespace) adds no segment.
pub fn namespace_path<M: SemanticModel + ?Sized>(model: &M, symbol: &Symbol) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let mut current = symbol.containing_namespace;
    while let Some(id) = current {
        let Some(namespace) = model.symbol(id) else {
            break;
        };
        if !namespace.is_global && !namespace.name.is_empty() {
            segments.push(&namespace.name);
        }
        current = namespace.containing_namespace;
    }
    segments.reverse();
    segments.join(".")
}

/// Canonical identity of a type or namespace symbol.
pub fn type_identity<M: SemanticModel + ?Sized>(model: &M, symbol: &Symbol) -> TypeIdentity {
    TypeIdentity {
        name: symbol.name.clone(),
        namespace_path: namespace_path(model, symbol),
        module_id: symbol.module.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{BoundModel, SymbolKind, SymbolTable, TreeBindings};

    #[test]
    fn nested_namespaces_join_outermost_first() {
        let mut table = SymbolTable::new();
        let global = table.add_global_namespace();
        let outer = table.add_namespace("Company", Some(global));
        let inner = table.add_namespace("Product", Some(outer));
        let ty = table.add_type("Widget", SymbolKind::Class, Some(inner), "Widgets");
        let bindings = TreeBindings::new();
        let model = BoundModel::new(&table, &bindings);

        let identity = type_identity(&model, table.get(ty).unwrap());
        assert_eq!(identity.namespace_path, "Company.Product");
        assert_eq!(identity.module_id, "Widgets");
        assert_eq!(identity.qualified_name(), "Company.Product.Widget");
    }

    #[test]
    fn type_in_global_namespace_has_empty_path() {
        let mut table = SymbolTable::new();
        let global = table.add_global_namespace();
        let ty = table.add_type("Loose", SymbolKind::Struct, Some(global), "M");
        let bindings = TreeBindings::new();
        let model = BoundModel::new(&table, &bindings);

        let identity = type_identity(&model, table.get(ty).unwrap());
        assert_eq!(identity.namespace_path, "");
        assert_eq!(identity.qualified_name(), "Loose");
    }

    #[test]
    fn namespace_identity_uses_its_parents() {
        let mut table = SymbolTable::new();
        let global = table.add_global_namespace();
        let system = table.add_namespace("System", Some(global));
        let collections = table.add_namespace("Collections", Some(system));
        let bindings = TreeBindings::new();
        let model = BoundModel::new(&table, &bindings);

        let identity = type_identity(&model, table.get(collections).unwrap());
        assert_eq!(identity.name, "Collections");
        assert_eq!(identity.namespace_path, "System");
        assert_eq!(identity.module_id, "");
    }
}
