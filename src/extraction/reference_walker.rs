/// Reference extraction over one bound syntax tree.
///
/// Every identifier-reference node is classified against the semantic model
/// and yields at most one [`ReferenceEdge`] from the innermost enclosing type
/// declaration to the type (or namespace) the identifier resolves to.
use tracing::{debug, instrument, trace};

use crate::errors::{Result, TypeDepsError};
use crate::semantic::{SemanticModel, SymbolId};
use crate::syntax::{walk, NodeId, SyntaxKind, SyntaxTree, SyntaxVisitor};
use crate::types::{ReferenceEdge, TypeIdentity};

use super::identity::type_identity;

/// Walks one tree and accumulates its reference edges.
///
/// The edge buffer is owned by the walker and only readable once
/// [`ReferenceWalker::walk`] has returned.
pub struct ReferenceWalker<'a, M: SemanticModel + ?Sized> {
    tree: &'a SyntaxTree,
    model: &'a M,
    edges: Vec<ReferenceEdge>,
}

impl<'a, M: SemanticModel + ?Sized> ReferenceWalker<'a, M> {
    pub fn new(tree: &'a SyntaxTree, model: &'a M) -> Self {
        Self {
            tree,
            model,
            edges: Vec::new(),
        }
    }

    /// Visits every identifier in pre-order.
    ///
    /// On a resolution inconsistency the walk stops, the error is returned,
    /// and the buffer is cleared: a failed tree has no edges.
    #[instrument(skip_all, fields(path = %self.tree.path()))]
    pub fn walk(&mut self) -> Result<()> {
        self.edges.clear();
        let tree = self.tree;
        if let Err(e) = walk(tree, self) {
            self.edges.clear();
            return Err(e);
        }
        debug!(edges = self.edges.len(), "walk complete");
        Ok(())
    }

    pub fn edges(&self) -> &[ReferenceEdge] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<ReferenceEdge> {
        self.edges
    }

    /// True when the node, or its nearest enclosing invocation, was folded
    /// to a compile-time constant (`nameof(x)` and the like).
    fn is_constant(&self, node: NodeId) -> bool {
        if self.model.constant_value(node).is_some() {
            return true;
        }
        self.tree
            .enclosing(node, |k| *k == SyntaxKind::Invocation)
            .is_some_and(|invocation| self.model.constant_value(invocation).is_some())
    }

    /// Maps a bound symbol to the container the edge points at: namespaces
    /// and types stand for themselves, members for their containing type.
    /// A member whose container is missing or not a type is an error.
    fn target_container(&self, node: NodeId, id: SymbolId) -> Result<SymbolId> {
        let Some(symbol) = self.model.symbol(id) else {
            return Err(self.unresolved(node));
        };
        if symbol.is_namespace_or_type() {
            return Ok(id);
        }
        symbol
            .containing_type
            .filter(|&owner| self.model.symbol(owner).is_some_and(|o| o.kind.is_type()))
            .ok_or_else(|| TypeDepsError::MissingContainingType {
                identifier: self.identifier_text(node),
                symbol: format!("{} {}", symbol.kind.as_str(), symbol.name),
                parent: self.parent_description(node),
                location: self.tree.location(node),
            })
    }

    fn source_identity(&self, node: NodeId, type_decl: NodeId) -> Result<TypeIdentity> {
        self.model
            .declared_symbol(type_decl)
            .and_then(|id| self.model.symbol(id))
            .filter(|symbol| symbol.kind.is_type())
            .map(|symbol| type_identity(self.model, symbol))
            .ok_or_else(|| TypeDepsError::MissingDeclaredSymbol {
                identifier: self.identifier_text(node),
                parent: self.tree.describe(type_decl),
                location: self.tree.location(node),
            })
    }

    fn target_identity(&self, node: NodeId, id: SymbolId) -> Result<TypeIdentity> {
        self.model
            .symbol(id)
            .map(|symbol| type_identity(self.model, symbol))
            .ok_or_else(|| self.unresolved(node))
    }

    fn unresolved(&self, node: NodeId) -> TypeDepsError {
        TypeDepsError::UnresolvedReference {
            identifier: self.identifier_text(node),
            parent: self.parent_description(node),
            location: self.tree.location(node),
        }
    }

    fn identifier_text(&self, node: NodeId) -> String {
        self.tree.text(node).unwrap_or_default().to_string()
    }

    fn parent_description(&self, node: NodeId) -> String {
        match self.tree.parent(node) {
            Some(parent) => self.tree.describe(parent),
            None => "<root>".to_string(),
        }
    }
}

impl<M: SemanticModel + ?Sized> SyntaxVisitor for ReferenceWalker<'_, M> {
    type Error = TypeDepsError;

    fn visit_identifier(&mut self, tree: &SyntaxTree, node: NodeId) -> Result<()> {
        let Some(type_decl) = tree.enclosing(node, SyntaxKind::is_type_declaration) else {
            debug!(identifier = ?tree.text(node), "outside any type declaration, skipped");
            return Ok(());
        };

        if *tree.kind(node) == SyntaxKind::InferredType {
            trace!(location = %tree.location(node), "inferred type placeholder, skipped");
            return Ok(());
        }

        let target = match self.model.symbol_info(node) {
            Some(id) => self.target_container(node, id)?,
            None if self.is_constant(node) => {
                debug!(identifier = ?tree.text(node), "constant expression, skipped");
                return Ok(());
            }
            None => return Err(self.unresolved(node)),
        };

        let from = self.source_identity(node, type_decl)?;
        let to = self.target_identity(node, target)?;
        trace!(%from, %to, "reference");
        self.edges.push(ReferenceEdge {
            from,
            to,
            location: tree.location(node),
        });
        Ok(())
    }
}

/// Extracts all reference edges of one tree, in pre-order.
///
/// Returns the first resolution inconsistency instead of a partial list.
pub fn process<M: SemanticModel + ?Sized>(
    tree: &SyntaxTree,
    model: &M,
) -> Result<Vec<ReferenceEdge>> {
    let mut walker = ReferenceWalker::new(tree, model);
    walker.walk()?;
    Ok(walker.into_edges())
}
