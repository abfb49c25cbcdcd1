//! Red-black balancing, done top-down in a single pass.
//!
//! Insert splits every 4-node met on the way down, so the new red leaf needs
//! at most one rotation. Delete turns every 2-node on the way down into a
//! 3- or 4-node by borrowing from the sibling, so the successor can be
//! spliced out without a bottom-up fixup.

use std::cmp::Ordering;

use crate::arena::NodeIndex;
use crate::tree::{HeightBalanced, Strategy, Tree};

pub(crate) mod util;

/// Node color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Red,
    Black,
}

/// Red-black strategy marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedBlack;

impl Strategy for RedBlack {
    type Meta = Color;

    const NAME: &'static str = "red-black";

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
        if let Some(root) = tree.root {
            if *tree.arena.meta(root) != Color::Black {
                return Err(format!("Root {root} is red"));
            }
        }
        util::black_height(&tree.arena, tree.root).map(|_| ())
    }
}

impl HeightBalanced for RedBlack {}
