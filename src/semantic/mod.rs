/// Symbols and the per-unit symbol table.
mod symbols;

/// The resolver trait and its map-backed implementation.
mod model;

pub use model::{BoundModel, ConstantValue, SemanticModel, TreeBindings};
pub use symbols::{Symbol, SymbolId, SymbolKind, SymbolTable};
