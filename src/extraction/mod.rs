/// Type identity derivation from bound symbols.
mod identity;

/// Tree walker that turns identifier references into type-to-type edges.
mod reference_walker;

pub use identity::{namespace_path, type_identity};
pub use reference_walker::{process, ReferenceWalker};
