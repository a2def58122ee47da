use std::{cmp::Ordering, mem};

use rand::Rng;

use crate::depth::Depth;
use crate::error::{Error, Result};

/// Arena slot reserved for the sentinel, standing for every absent
/// child and for the root's parent.
pub(crate) const NIL: usize = 0;

/// Single entry in the index, as (key, value).
pub type Entry = (Vec<u8>, Vec<u8>);

/// Red-black tree over byte-string keys, nodes are held in an arena and
/// linked by their arena offsets. Not synchronized, refer to [`Rbt`] for
/// the thread safe index.
///
/// [`Rbt`]: crate::Rbt
pub(crate) struct Tree {
    nodes: Vec<Node>, // nodes[NIL] is the sentinel.
    root: usize,
}

impl Tree {
    pub(crate) fn new() -> Tree {
        Tree {
            nodes: vec![Node::sentinel()],
            root: NIL,
        }
    }

    /// Return number of entries in this tree.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Set value for key. If there is an existing entry for key,
    /// overwrite the old value with new value and return the old value,
    /// tree structure and colors are left untouched in that case.
    pub(crate) fn upsert(&mut self, key: &[u8], value: &[u8]) -> Option<Vec<u8>> {
        let (mut parent, mut curr) = (NIL, self.root);
        let mut side = Ordering::Equal;
        while curr != NIL {
            parent = curr;
            side = key.cmp(self.nodes[curr].key.as_slice());
            curr = match side {
                Ordering::Less => self.nodes[curr].left,
                Ordering::Greater => self.nodes[curr].right,
                Ordering::Equal => {
                    let old_value = self.nodes[curr].set_value(value.to_vec());
                    return Some(old_value);
                }
            };
        }

        let n = self.nodes.len();
        self.nodes.push(Node::new(key.to_vec(), value.to_vec(), parent));

        if parent == NIL {
            self.root = n;
            self.nodes[n].set_black();
            return None;
        }
        match side {
            Ordering::Less => self.nodes[parent].left = n,
            _ => self.nodes[parent].right = n,
        }
        // red child under black root, nothing to repair.
        if self.nodes[parent].parent == NIL {
            return None;
        }
        self.insert_fixup(n);
        None
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let mut curr = self.root;
        while curr != NIL {
            let node = &self.nodes[curr];
            curr = match key.cmp(node.key.as_slice()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Return a random entry from this tree.
    pub(crate) fn random<R: Rng>(&self, rng: &mut R) -> Option<Entry> {
        if self.root == NIL {
            return None;
        }

        let (mut curr, mut at_depth) = (self.root, rng.gen::<u8>() % 40);
        loop {
            let node = &self.nodes[curr];
            let next = match rng.gen::<u8>() % 2 {
                0 => node.left,
                _ => node.right,
            };
            if at_depth == 0 || next == NIL {
                break Some((node.key.clone(), node.value.clone()));
            }
            at_depth -= 1;
            curr = next;
        }
    }

    pub(crate) fn in_order(&self) -> Vec<Entry> {
        let mut acc = Vec::with_capacity(self.len());
        self.walk(self.root, Order::In, &mut acc);
        acc
    }

    pub(crate) fn pre_order(&self) -> Vec<Entry> {
        let mut acc = Vec::with_capacity(self.len());
        self.walk(self.root, Order::Pre, &mut acc);
        acc
    }

    pub(crate) fn post_order(&self) -> Vec<Entry> {
        let mut acc = Vec::with_capacity(self.len());
        self.walk(self.root, Order::Post, &mut acc);
        acc
    }

    fn walk(&self, curr: usize, order: Order, acc: &mut Vec<Entry>) {
        if curr == NIL {
            return;
        }
        let node = &self.nodes[curr];
        if let Order::Pre = order {
            acc.push((node.key.clone(), node.value.clone()));
        }
        self.walk(node.left, order, acc);
        if let Order::In = order {
            acc.push((node.key.clone(), node.value.clone()));
        }
        self.walk(node.right, order, acc);
        if let Order::Post = order {
            acc.push((node.key.clone(), node.value.clone()));
        }
    }

    /// Validate red-black tree with following rules:
    ///
    /// * Root and sentinel are black, sentinel holds nothing.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Every child links back to its parent.
    /// * Make sure keys are in sorted order.
    ///
    /// Leaf depths are sampled into `depths`, return the black-height.
    pub(crate) fn validate(&self, depths: &mut Depth) -> Result<usize> {
        let nil = &self.nodes[NIL];
        let dirty = !nil.black || !nil.key.is_empty() || !nil.value.is_empty();
        if dirty || nil.parent != NIL || nil.left != NIL || nil.right != NIL {
            return Err(Error::DirtySentinel);
        }
        if !self.nodes[self.root].black {
            return Err(Error::RedRoot);
        }
        if self.nodes[self.root].parent != NIL {
            let err = format!("root {} has parent", self.root);
            return Err(Error::BrokenParent(err));
        }
        let blacks = self.validate_tree(self.root, false, 0, 0, depths)?;
        self.validate_sort(self.root, &mut None)?;
        Ok(blacks)
    }

    // in-order walk, each key must be greater than the one before it.
    fn validate_sort<'a>(&'a self, curr: usize, prev: &mut Option<&'a [u8]>) -> Result<()> {
        if curr == NIL {
            return Ok(());
        }
        let node = &self.nodes[curr];
        self.validate_sort(node.left, prev)?;
        if let Some(pkey) = *prev {
            if pkey >= node.key.as_slice() {
                return Err(Error::SortError(pkey.to_vec(), node.key.clone()));
            }
        }
        *prev = Some(node.key.as_slice());
        self.validate_sort(node.right, prev)
    }

    fn validate_tree(
        &self,
        curr: usize,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        depths: &mut Depth,
    ) -> Result<usize> {
        if curr == NIL {
            depths.sample(depth);
            return Ok(nb);
        }

        let node = &self.nodes[curr];
        if fromred && !node.black {
            return Err(Error::ConsecutiveReds);
        }
        if node.black {
            nb += 1;
        }
        let red = !node.black;
        let lblacks = self.validate_tree(node.left, red, nb, depth + 1, depths)?;
        let rblacks = self.validate_tree(node.right, red, nb, depth + 1, depths)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(err));
        }

        for &child in [node.left, node.right].iter() {
            if child != NIL && self.nodes[child].parent != curr {
                let err = format!("node {} parent {}", child, self.nodes[child].parent);
                return Err(Error::BrokenParent(err));
            }
        }
        Ok(lblacks)
    }

    //--------- rebalancing routines ----------------

    fn insert_fixup(&mut self, mut n: usize) {
        while n != self.root && self.is_red(self.nodes[n].parent) {
            let p = self.nodes[n].parent;
            let g = self.nodes[p].parent; // parent is red, hence not root.
            if p == self.nodes[g].left {
                let u = self.nodes[g].right;
                if self.is_red(u) {
                    self.nodes[p].set_black();
                    self.nodes[u].set_black();
                    self.nodes[g].set_red();
                    n = g;
                    continue;
                }
                if n == self.nodes[p].right {
                    n = p;
                    self.rotate_left(n);
                }
                let p = self.nodes[n].parent;
                let g = self.nodes[p].parent;
                self.nodes[p].set_black();
                self.nodes[g].set_red();
                self.rotate_right(g);
            } else {
                let u = self.nodes[g].left;
                if self.is_red(u) {
                    self.nodes[p].set_black();
                    self.nodes[u].set_black();
                    self.nodes[g].set_red();
                    n = g;
                    continue;
                }
                if n == self.nodes[p].left {
                    n = p;
                    self.rotate_right(n);
                }
                let p = self.nodes[n].parent;
                let g = self.nodes[p].parent;
                self.nodes[p].set_black();
                self.nodes[g].set_red();
                self.rotate_left(g);
            }
        }
        let root = self.root;
        self.nodes[root].set_black();
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //          left      x              node      xr
    //                   / \             /  \
    //                 xl   xr        left   xl
    //
    fn rotate_left(&mut self, node: usize) {
        let x = self.nodes[node].right;
        debug_assert!(x != NIL, "rotate_left(): no right child");
        let xl = self.nodes[x].left;

        self.nodes[node].right = xl;
        if xl != NIL {
            self.nodes[xl].parent = node;
        }
        self.replace_child(node, x);
        self.nodes[x].left = node;
        self.nodes[node].parent = x;
    }

    //              (i)                       (i)
    //               |                         |
    //              node                       x
    //              /  \                      / \
    //             /    \                    /   \
    //            /      \                  /     \
    //           x      right             xl      node
    //          / \                               / \
    //        xl   xr                           xr  right
    //
    fn rotate_right(&mut self, node: usize) {
        let x = self.nodes[node].left;
        debug_assert!(x != NIL, "rotate_right(): no left child");
        let xr = self.nodes[x].right;

        self.nodes[node].left = xr;
        if xr != NIL {
            self.nodes[xr].parent = node;
        }
        self.replace_child(node, x);
        self.nodes[x].right = node;
        self.nodes[node].parent = x;
    }

    // hook `x` into the slot `node` occupies under its parent.
    fn replace_child(&mut self, node: usize, x: usize) {
        let parent = self.nodes[node].parent;
        self.nodes[x].parent = parent;
        if parent == NIL {
            self.root = x;
        } else if self.nodes[parent].left == node {
            self.nodes[parent].left = x;
        } else {
            self.nodes[parent].right = x;
        }
    }

    #[inline]
    fn is_red(&self, n: usize) -> bool {
        !self.nodes[n].black
    }
}

#[derive(Clone, Copy)]
enum Order {
    Pre,
    In,
    Post,
}

/// Node corresponds to a single entry in the tree, or to the sentinel.
pub(crate) struct Node {
    key: Vec<u8>,
    value: Vec<u8>,
    black: bool,   // store: black or red
    parent: usize, // back link, NIL for root
    left: usize,   // store: left child
    right: usize,  // store: right child
}

impl Node {
    // CREATE operation, new nodes are always red.
    fn new(key: Vec<u8>, value: Vec<u8>, parent: usize) -> Node {
        Node {
            key,
            value,
            black: false,
            parent,
            left: NIL,
            right: NIL,
        }
    }

    fn sentinel() -> Node {
        Node {
            key: vec![],
            value: vec![],
            black: true,
            parent: NIL,
            left: NIL,
            right: NIL,
        }
    }

    #[inline]
    fn set_value(&mut self, value: Vec<u8>) -> Vec<u8> {
        mem::replace(&mut self.value, value)
    }

    #[inline]
    fn set_red(&mut self) {
        self.black = false
    }

    #[inline]
    fn set_black(&mut self) {
        self.black = true
    }
}
