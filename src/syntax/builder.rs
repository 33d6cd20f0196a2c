use super::tree::{NodeId, Span, SyntaxKind, SyntaxNode, SyntaxTree};

/// Incremental builder for [`SyntaxTree`]s.
///
/// Front-end adapters and tests use it to assemble a tree top-down. Each
/// added node gets a span on its own line, in insertion order, unless a span
/// is set explicitly with [`TreeBuilder::add_at`].
pub struct TreeBuilder {
    path: String,
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    /// Starts a tree whose root is a `CompilationUnit` node.
    pub fn new(path: impl Into<String>) -> Self {
        let mut root = SyntaxNode::new(SyntaxKind::CompilationUnit);
        root.span = Span { line: 1, column: 1 };
        Self {
            path: path.into(),
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a child of `parent`. Panics like [`TreeBuilder::add_at`].
    pub fn add(&mut self, parent: NodeId, kind: SyntaxKind, text: Option<&str>) -> NodeId {
        let line = self.nodes.len() as u32 + 1;
        self.add_at(parent, kind, text, Span { line, column: 1 })
    }

    /// Appends a child of `parent` with an explicit span.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not returned by this builder.
    pub fn add_at(
        &mut self,
        parent: NodeId,
        kind: SyntaxKind,
        text: Option<&str>,
        span: Span,
    ) -> NodeId {
        assert!(
            parent.index() < self.nodes.len(),
            "parent {} is not a node of this builder",
            parent.0
        );
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            kind,
            text: text.map(str::to_string),
            span,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Shorthand for an `IdentifierName` child.
    pub fn ident(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add(parent, SyntaxKind::IdentifierName, Some(name))
    }

    pub fn build(self) -> SyntaxTree {
        // Nodes are only ever attached to an existing parent, so the arena is
        // always a well-formed tree.
        match SyntaxTree::from_nodes(self.path, self.nodes) {
            Ok(tree) => tree,
            Err(e) => unreachable!("builder produced an invalid tree: {e}"),
        }
    }
}
