use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::syntax::NodeId;

use super::symbols::{Symbol, SymbolId, SymbolTable};

/// A compile-time constant the front-end folded an expression into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
}

/// Symbol-resolution service for one syntax tree.
///
/// Implementations answer questions about nodes of a single tree; node ids
/// from any other tree are meaningless to them. Containment chains reachable
/// through [`SemanticModel::symbol`] must be finite.
pub trait SemanticModel {
    /// Symbol an identifier node binds to, or `None` if it binds to nothing.
    fn symbol_info(&self, node: NodeId) -> Option<SymbolId>;

    /// Constant value of an expression node, if the front-end folded it.
    fn constant_value(&self, node: NodeId) -> Option<&ConstantValue>;

    /// Symbol declared by a declaration node (type declarations in particular).
    fn declared_symbol(&self, node: NodeId) -> Option<SymbolId>;

    /// Looks up a symbol by id.
    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;
}

/// Per-tree binder output: which node binds to which symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeBindings {
    pub bindings: HashMap<NodeId, SymbolId>,
    pub constants: HashMap<NodeId, ConstantValue>,
    pub declarations: HashMap<NodeId, SymbolId>,
}

impl TreeBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, node: NodeId, symbol: SymbolId) -> &mut Self {
        self.bindings.insert(node, symbol);
        self
    }

    pub fn constant(&mut self, node: NodeId, value: ConstantValue) -> &mut Self {
        self.constants.insert(node, value);
        self
    }

    pub fn declare(&mut self, node: NodeId, symbol: SymbolId) -> &mut Self {
        self.declarations.insert(node, symbol);
        self
    }
}

/// [`SemanticModel`] backed by a shared symbol table and one tree's bindings.
#[derive(Debug, Clone, Copy)]
pub struct BoundModel<'a> {
    symbols: &'a SymbolTable,
    bindings: &'a TreeBindings,
}

impl<'a> BoundModel<'a> {
    pub fn new(symbols: &'a SymbolTable, bindings: &'a TreeBindings) -> Self {
        Self { symbols, bindings }
    }

    pub fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }
}

impl SemanticModel for BoundModel<'_> {
    fn symbol_info(&self, node: NodeId) -> Option<SymbolId> {
        self.bindings.bindings.get(&node).copied()
    }

    fn constant_value(&self, node: NodeId) -> Option<&ConstantValue> {
        self.bindings.constants.get(&node)
    }

    fn declared_symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.bindings.declarations.get(&node).copied()
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }
}
