use compact_str::CompactString;
use thiserror::Error;

/// Result type for size tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors raised by [`crate::tree::SizeTree`] and its nodes.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// A child lookup named a segment that was never inserted.
    #[error("no child named '{key}'")]
    NotFound { key: CompactString },

    /// The tree has been finalized and no longer accepts observations.
    #[error("size tree is finalized, cannot insert '{path}'")]
    Finalized { path: String },

    /// Drawing needs aggregated totals.
    #[error("size tree has not been finalized")]
    NotFinalized,

    /// Sizes must be finite and non-negative.
    #[error("invalid size {size} for '{path}'")]
    InvalidValue { path: String, size: f64 },
}
