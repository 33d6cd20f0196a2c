use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identity of a declared type (or of a namespace, when a
/// reference resolves to one directly).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeIdentity {
    /// Simple identifier of the type.
    pub name: String,
    /// Dot-joined enclosing namespace chain, outermost first. Empty if none.
    pub namespace_path: String,
    /// Compiled unit containing the declaration. Empty if the symbol has none.
    pub module_id: String,
}

impl TypeIdentity {
    pub fn new(
        name: impl Into<String>,
        namespace_path: impl Into<String>,
        module_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace_path: namespace_path.into(),
            module_id: module_id.into(),
        }
    }

    /// Display name used for aggregation: `namespace_path.name`, or just
    /// `name` when there is no enclosing namespace.
    pub fn qualified_name(&self) -> String {
        if self.namespace_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace_path, self.name)
        }
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Position of an identifier in its source file. Line and column are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One observed dependency: the body of `from` references `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEdge {
    pub from: TypeIdentity,
    pub to: TypeIdentity,
    /// Where the referencing identifier occurs. Not part of aggregation.
    pub location: SourceLocation,
}

impl ReferenceEdge {
    /// Returns `true` when a type references itself.
    pub fn is_self_reference(&self) -> bool {
        self.from == self.to
    }
}

/// Number of raw edges sharing a `(from, to)` qualified-name pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedEdge {
    pub from: String,
    pub to: String,
    pub count: usize,
}

/// A single ranked target inside a [`SourceGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCount {
    pub to: String,
    pub count: usize,
}

/// All targets referenced from one source type, highest count first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceGroup {
    pub from: String,
    pub targets: Vec<TargetCount>,
}

impl SourceGroup {
    /// Total number of raw references leaving this source type.
    pub fn total(&self) -> usize {
        self.targets.iter().map(|t| t.count).sum()
    }
}

/// Ranked dependency summary, one group per source type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub groups: Vec<SourceGroup>,
}

impl DependencyReport {
    /// Looks up the group for a qualified source name.
    pub fn group(&self, from: &str) -> Option<&SourceGroup> {
        self.groups.iter().find(|g| g.from == from)
    }

    /// Sum of all counts in the report.
    pub fn total(&self) -> usize {
        self.groups.iter().map(SourceGroup::total).sum()
    }
}
