use serde::{Deserialize, Serialize};

use crate::errors::{Result, TypeDepsError};
use crate::types::SourceLocation;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kinds of syntax nodes produced by the front-end.
///
/// Only a handful of kinds carry meaning for reference extraction
/// (type declarations, namespaces, invocations, identifiers). The rest exist
/// so that trees keep their real shape and parent descriptions stay useful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxKind {
    CompilationUnit,
    NamespaceDeclaration,
    UsingDirective,
    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    RecordDeclaration,
    DelegateDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    PropertyDeclaration,
    FieldDeclaration,
    EnumMemberDeclaration,
    Parameter,
    Block,
    LocalDeclaration,
    ExpressionStatement,
    ReturnStatement,
    Invocation,
    Argument,
    MemberAccess,
    ObjectCreation,
    Assignment,
    BinaryExpression,
    Literal,
    /// A simple name that refers to a symbol (`Console`, `x`, `Helper`).
    IdentifierName,
    /// A generic name (`List<T>`); the name part is an identifier reference.
    GenericName,
    QualifiedName,
    PredefinedType,
    /// Language-level placeholder for an inferred type (`var`). Occupies an
    /// identifier position but names no symbol of its own.
    InferredType,
    /// Any other node kind, keeping the front-end's own name.
    Other(String),
}

impl SyntaxKind {
    /// Returns the snake_case name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            SyntaxKind::CompilationUnit => "compilation_unit",
            SyntaxKind::NamespaceDeclaration => "namespace_declaration",
            SyntaxKind::UsingDirective => "using_directive",
            SyntaxKind::ClassDeclaration => "class_declaration",
            SyntaxKind::StructDeclaration => "struct_declaration",
            SyntaxKind::InterfaceDeclaration => "interface_declaration",
            SyntaxKind::EnumDeclaration => "enum_declaration",
            SyntaxKind::RecordDeclaration => "record_declaration",
            SyntaxKind::DelegateDeclaration => "delegate_declaration",
            SyntaxKind::MethodDeclaration => "method_declaration",
            SyntaxKind::ConstructorDeclaration => "constructor_declaration",
            SyntaxKind::PropertyDeclaration => "property_declaration",
            SyntaxKind::FieldDeclaration => "field_declaration",
            SyntaxKind::EnumMemberDeclaration => "enum_member_declaration",
            SyntaxKind::Parameter => "parameter",
            SyntaxKind::Block => "block",
            SyntaxKind::LocalDeclaration => "local_declaration",
            SyntaxKind::ExpressionStatement => "expression_statement",
            SyntaxKind::ReturnStatement => "return_statement",
            SyntaxKind::Invocation => "invocation",
            SyntaxKind::Argument => "argument",
            SyntaxKind::MemberAccess => "member_access",
            SyntaxKind::ObjectCreation => "object_creation",
            SyntaxKind::Assignment => "assignment",
            SyntaxKind::BinaryExpression => "binary_expression",
            SyntaxKind::Literal => "literal",
            SyntaxKind::IdentifierName => "identifier_name",
            SyntaxKind::GenericName => "generic_name",
            SyntaxKind::QualifiedName => "qualified_name",
            SyntaxKind::PredefinedType => "predefined_type",
            SyntaxKind::InferredType => "inferred_type",
            SyntaxKind::Other(name) => name,
        }
    }

    /// Nodes that introduce a named type.
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassDeclaration
                | SyntaxKind::StructDeclaration
                | SyntaxKind::InterfaceDeclaration
                | SyntaxKind::EnumDeclaration
                | SyntaxKind::RecordDeclaration
                | SyntaxKind::DelegateDeclaration
        )
    }

    /// Nodes the reference walker inspects: every kind that occupies a
    /// simple-name position in the tree.
    pub fn is_identifier_reference(&self) -> bool {
        matches!(
            self,
            SyntaxKind::IdentifierName | SyntaxKind::GenericName | SyntaxKind::InferredType
        )
    }
}

/// 1-based line and column of a node's first token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

/// A single node in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    /// Identifier or literal text, when the node has any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    /// Derived from `children` when the tree is built.
    #[serde(skip)]
    pub parent: Option<NodeId>,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind) -> Self {
        Self {
            kind,
            text: None,
            span: Span::default(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// An immutable syntax tree for one source file, stored as a node arena with
/// parent links. Node `0` is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    path: String,
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Builds a tree from a node arena, deriving parent links.
    ///
    /// The arena must describe a single tree rooted at index 0: every child
    /// index in range, no node with two parents, the root with none, and
    /// every node reachable from the root.
    pub fn from_nodes(path: impl Into<String>, mut nodes: Vec<SyntaxNode>) -> Result<Self> {
        let path = path.into();
        let invalid = |message: String| TypeDepsError::Snapshot {
            message,
            path: path.clone(),
        };

        if nodes.is_empty() {
            return Err(invalid("syntax tree has no nodes".to_string()));
        }

        let count = nodes.len();
        let mut parents: Vec<Option<NodeId>> = vec![None; count];
        for (index, node) in nodes.iter().enumerate() {
            for child in &node.children {
                if child.index() >= count {
                    return Err(invalid(format!(
                        "node {index} has child {} outside the arena of {count} nodes",
                        child.0
                    )));
                }
                if child.index() == 0 {
                    return Err(invalid(format!("node {index} lists the root as a child")));
                }
                if let Some(existing) = parents[child.index()] {
                    return Err(invalid(format!(
                        "node {} has two parents ({} and {index})",
                        child.0, existing.0
                    )));
                }
                parents[child.index()] = Some(NodeId(index as u32));
            }
        }

        for (node, parent) in nodes.iter_mut().zip(parents) {
            node.parent = parent;
        }

        let tree = Self {
            path: path.clone(),
            nodes,
        };
        let reachable = tree.preorder().count();
        if reachable != count {
            return Err(invalid(format!(
                "{} of {count} nodes are not reachable from the root",
                count - reachable
            )));
        }
        Ok(tree)
    }

    /// Path of the source file this tree was parsed from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[SyntaxNode] {
        &self.nodes
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> &SyntaxKind {
        &self.node(id).kind
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Iterates the strict ancestors of `id`, innermost first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Nearest strict ancestor whose kind satisfies `pred`.
    pub fn enclosing(&self, id: NodeId, pred: impl Fn(&SyntaxKind) -> bool) -> Option<NodeId> {
        self.ancestors(id).find(|&a| pred(self.kind(a)))
    }

    /// Depth-first pre-order traversal from the root, children in order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Source location of a node's first token.
    pub fn location(&self, id: NodeId) -> SourceLocation {
        let span = self.node(id).span;
        SourceLocation {
            file: self.path.clone(),
            line: span.line,
            column: span.column,
        }
    }

    /// Short human description of a node, used in error messages:
    /// its kind, plus its text when it has any.
    pub fn describe(&self, id: NodeId) -> String {
        let node = self.node(id);
        match &node.text {
            Some(text) => format!("{} '{}'", node.kind.as_str(), text),
            None => node.kind.as_str().to_string(),
        }
    }
}

/// Iterator over the ancestors of a node, innermost first.
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Pre-order iterator. Uses an explicit stack so deep trees cannot
/// overflow the call stack.
pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        // Push in reverse so the first child is visited next.
        self.stack
            .extend(self.tree.node(current).children.iter().rev().copied());
        Some(current)
    }
}
