mod depth;
mod error;
mod rbt;
mod tree;

pub use crate::depth::Depth;
pub use crate::error::{Error, Result};
pub use crate::rbt::{Rbt, Stats};
pub use crate::tree::Entry;

#[cfg(test)]
mod depth_test;
