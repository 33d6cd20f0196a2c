/// Arena syntax tree with parent links and pre-order traversal.
mod tree;

/// Top-down construction of syntax trees.
mod builder;

pub use builder::TreeBuilder;
pub use tree::{Ancestors, NodeId, Preorder, Span, SyntaxKind, SyntaxNode, SyntaxTree};

/// Callback surface for [`walk`].
///
/// Only identifier-reference nodes are delivered; the driver descends into
/// every other node on its own.
pub trait SyntaxVisitor {
    type Error;

    fn visit_identifier(&mut self, tree: &SyntaxTree, node: NodeId) -> Result<(), Self::Error>;
}

/// Drives `visitor` over `tree` in pre-order, stopping at the first error.
pub fn walk<V: SyntaxVisitor + ?Sized>(tree: &SyntaxTree, visitor: &mut V) -> Result<(), V::Error> {
    for id in tree.preorder() {
        if tree.kind(id).is_identifier_reference() {
            visitor.visit_identifier(tree, id)?;
        }
    }
    Ok(())
}
