//! AVL balancing: a balance factor per node, repaired along an explicit path.
//!
//! The balance factor is `height(right) - height(left)`. Insert walks down
//! recording the path, attaches a leaf, then retraces until a subtree stops
//! growing or one rotation restores balance. Delete substitutes the in-order
//! successor structurally (no payload is copied, so indices stay stable) and
//! retraces until a subtree keeps its height.

use std::cmp::Ordering;

use crate::arena::NodeIndex;
use crate::tree::{HeightBalanced, Strategy, Tree};

pub(crate) mod util;

/// AVL strategy marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Avl;

impl Strategy for Avl {
    type Meta = i8;

    const NAME: &'static str = "avl";

    fn link<K, V, const D: usize, F>(
        tree: &mut Tree<K, V, Self, D>,
        nav: &mut F,
        node: NodeIndex,
        pos: [i32; D],
        len: [i32; D],
    ) where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        util::link(tree, nav, node, pos, len);
    }

    fn unlink<K, V, const D: usize, F>(
        tree: &mut Tree<K, V, Self, D>,
        nav: &mut F,
        node: NodeIndex,
        pos: [i32; D],
        len: [i32; D],
    ) where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        util::unlink(tree, nav, node, pos, len);
    }

    fn check<K, V, const D: usize>(tree: &Tree<K, V, Self, D>) -> Result<(), String> {
        util::checked_height(&tree.arena, tree.root).map(|_| ())
    }
}

impl HeightBalanced for Avl {}
