use thiserror::Error;

use crate::types::SourceLocation;

/// Errors that can occur while extracting or reporting type dependencies.
#[derive(Error, Debug)]
pub enum TypeDepsError {
    /// A non-constant identifier that the semantic model could not bind.
    #[error("unresolved reference '{identifier}' in {parent} at {location}")]
    UnresolvedReference {
        identifier: String,
        parent: String,
        location: SourceLocation,
    },

    /// An identifier bound to a member symbol that has no containing type.
    #[error("symbol '{symbol}' referenced by '{identifier}' in {parent} at {location} has no containing type")]
    MissingContainingType {
        identifier: String,
        symbol: String,
        parent: String,
        location: SourceLocation,
    },

    /// A type declaration the semantic model cannot map to its declared symbol.
    #[error("no declared symbol for type declaration enclosing '{identifier}' in {parent} at {location}")]
    MissingDeclaredSymbol {
        identifier: String,
        parent: String,
        location: SourceLocation,
    },

    #[error("snapshot error: {message} (path: {path})")]
    Snapshot { message: String, path: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TypeDepsError {
    /// Returns `true` for errors that signal a broken front-end contract
    /// (an identifier the semantic model should have bound but did not).
    pub fn is_fatal_resolution(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. }
                | Self::MissingContainingType { .. }
                | Self::MissingDeclaredSymbol { .. }
        )
    }

    /// Source location of the offending identifier, for resolution errors.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::UnresolvedReference { location, .. }
            | Self::MissingContainingType { location, .. }
            | Self::MissingDeclaredSymbol { location, .. } => Some(location),
            _ => None,
        }
    }
}

/// Convenience alias for results using `TypeDepsError`.
pub type Result<T> = std::result::Result<T, TypeDepsError>;
