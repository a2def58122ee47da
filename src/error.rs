use thiserror::Error;

/// Error enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Returned by insert() API when key is empty.
    #[error("invalid key, key must be non-empty")]
    InvalidKey,
    /// Fatal case, root node is colored red.
    #[error("root node is red")]
    RedRoot,
    /// Fatal case, sentinel node is red, holds data, or links away
    /// from itself.
    #[error("sentinel node is corrupted")]
    DirtySentinel,
    /// Fatal case, a red node has a red child.
    #[error("consecutive red nodes")]
    ConsecutiveReds,
    /// Fatal case, paths from a node to its leaves differ in their
    /// number of black nodes. The String component of this variant
    /// can be used for debugging.
    #[error("unbalanced blacks, {0}")]
    UnbalancedBlacks(String),
    /// Fatal case, child's parent link does not point back to parent.
    #[error("broken parent link, {0}")]
    BrokenParent(String),
    /// Fatal case, index entries are not in sort-order.
    #[error("sort error, {0:?} against {1:?}")]
    SortError(Vec<u8>, Vec<u8>),
}

pub type Result<T> = std::result::Result<T, Error>;
