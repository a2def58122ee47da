//! Module ``rbt`` implement a thread safe, in-memory index type over
//! byte-string keys, using [red-black][rbt] tree.
//!
//! [Rbt] allow concurrent read and write access at API level, while
//! behind the scenes all access are serialized on a single mutex owned
//! by the instance. Rotations and re-coloring complete before the mutex
//! is released, so callers only ever observe a balanced tree.
//!
//! [rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree

use std::mem;

use log::{debug, error, info};
use parking_lot::Mutex;
use rand::Rng;

use crate::depth::Depth;
use crate::error::{Error, Result};
use crate::tree::{Entry, Node, Tree};

/// Rbt manage a single instance of in-memory index using
/// [red-black][rbt] tree. Keys and values are opaque byte strings,
/// keys are ordered byte-wise.
///
/// [rbt]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
pub struct Rbt {
    name: String,
    tree: Mutex<Tree>,
}

/// Different ways to construct a new Rbt instance.
impl Rbt {
    /// Create an empty instance of Rbt, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> Rbt
    where
        S: AsRef<str>,
    {
        let name = name.as_ref().to_string();
        debug!(target: "rbt   ", "{:?}, new rbt instance", name);
        Rbt {
            name,
            tree: Mutex::new(Tree::new()),
        }
    }

    /// Create a new instance of Rbt tree and load it with entries
    /// from `iter`. Note that iterator should return (key, value) tuples,
    /// a later entry for the same key overwrites the earlier one.
    pub fn load_from<S, I, K, V>(name: S, iter: I) -> Result<Rbt>
    where
        S: AsRef<str>,
        I: Iterator<Item = (K, V)>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let rbt = Rbt::new(name);
        {
            let mut tree = rbt.tree.lock();
            for (key, value) in iter {
                let key = validate_key(&rbt.name, key.as_ref())?;
                tree.upsert(key, value.as_ref());
            }
            info!(
                target: "rbt   ",
                "{:?}, loaded {} entries", rbt.name, tree.len()
            );
        }
        Ok(rbt)
    }
}

/// Maintenance API.
impl Rbt {
    /// Identify this instance. Applications can choose unique names while
    /// creating Rbt instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of entries in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.lock().len()
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return quickly with basic statisics, only entries() and
    /// node_size() methods are valid with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.len(), mem::size_of::<Node>())
    }

    /// Validate red-black tree with following rules:
    ///
    /// * Root is black, sentinel is black and holds no entry.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same on every path from a node to
    ///   its leaves.
    /// * Parent links agree with child links.
    /// * Make sure keys are in strictly ascending sort-order.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats> {
        let tree = self.tree.lock();
        let mut stats = Stats::new(tree.len(), mem::size_of::<Node>());
        let mut depths = Depth::new();
        match tree.validate(&mut depths) {
            Ok(blacks) => {
                stats.set_blacks(blacks);
                stats.set_depths(depths);
                Ok(stats)
            }
            Err(err) => {
                error!(target: "rbt   ", "{:?}, validate failed: {}", self.name, err);
                Err(err)
            }
        }
    }
}

/// Write operations on Rbt instance.
impl Rbt {
    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value.
    /// Both key and value are copied into the index, later changes to
    /// caller's buffers are not visible to the index.
    ///
    /// Empty keys are rejected with [`Error::InvalidKey`], leaving the
    /// index untouched.
    pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        let key = validate_key(&self.name, key)?;
        Ok(self.tree.lock().upsert(key, value))
    }
}

/// Read operations on Rbt instance.
impl Rbt {
    /// Get a copy of the value for key.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.tree.lock().get(key).map(|value| value.to_vec())
    }

    /// Return a random entry from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<Entry> {
        self.tree.lock().random(rng)
    }

    /// Return all entries in ascending key order.
    pub fn in_order(&self) -> Vec<Entry> {
        self.tree.lock().in_order()
    }

    /// Return all entries with every node ahead of its subtrees. Order
    /// follows the shape of the tree, useful while debugging.
    pub fn pre_order(&self) -> Vec<Entry> {
        self.tree.lock().pre_order()
    }

    /// Return all entries with every node after its subtrees. Order
    /// follows the shape of the tree, useful while debugging.
    pub fn post_order(&self) -> Vec<Entry> {
        self.tree.lock().post_order()
    }
}

impl Drop for Rbt {
    fn drop(&mut self) {
        let n = self.tree.get_mut().len();
        debug!(target: "rbt   ", "{:?}, dropped with {} entries", self.name, n);
    }
}

fn validate_key<'a>(name: &str, key: &'a [u8]) -> Result<&'a [u8]> {
    if key.is_empty() {
        debug!(target: "rbt   ", "{:?}, rejected empty key", name);
        Err(Error::InvalidKey)
    } else {
        Ok(key)
    }
}

/// Statistics on [`Rbt`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`Rbt::stats`] method.
/// * To get full statisics via [`Rbt::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`Rbt`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size of the arena slot, excluding the heap allocated
    /// key and value bytes.
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to any leaf, counting
    /// the root and excluding the sentinel.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        self.depths.clone()
    }
}
