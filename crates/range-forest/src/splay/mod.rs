//! Top-down splaying.
//!
//! There is no balance metadata. Every access, lookups included, brings the
//! target (or the last node on its search path) to the root, so the shape
//! changes on reads and structural cursors go stale after any call.

use std::cmp::Ordering;

use log::trace;

use crate::arena::NodeIndex;
use crate::tree::{Strategy, Tree};

pub(crate) mod util;

/// Splay strategy marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Splay;

impl Strategy for Splay {
    type Meta = ();

    const NAME: &'static str = "splay";

    fn access<K, V, const D: usize, F>(tree: &mut Tree<K, V, Self, D>, nav: &mut F) -> bool
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        let Some(root) = tree.root else {
            return false;
        };
        let top = util::splay_root(&mut tree.arena, root, nav);
        if top != root {
            trace!("splayed node {top} over {root}");
        }
        tree.root = Some(top);
        true
    }

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

    fn check<K, V, const D: usize>(_tree: &Tree<K, V, Self, D>) -> Result<(), String> {
        Ok(())
    }
}
