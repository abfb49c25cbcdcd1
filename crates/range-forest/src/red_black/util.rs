use std::cmp::Ordering;

use crate::arena::{Arena, NodeIndex};
use crate::offset::{
    add, neg, reattach, rotate_left, rotate_left_right, rotate_right, rotate_right_left,
    shift_right_of_path, sub,
};
use crate::tree::Tree;

use super::{Color, RedBlack};

type RbArena<K, V, const D: usize> = Arena<K, V, Color, D>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rotation {
    Left,
    Right,
    LeftRight,
    RightLeft,
}

#[inline]
fn is_red<K, V, const D: usize>(arena: &RbArena<K, V, D>, i: Option<NodeIndex>) -> bool {
    i.is_some_and(|i| *arena.meta(i) == Color::Red)
}

#[inline]
fn paint<K, V, const D: usize>(arena: &mut RbArena<K, V, D>, i: NodeIndex, color: Color) {
    arena.set_meta(i, color);
}

/// Black node without red children.
fn is_2_node<K, V, const D: usize>(arena: &RbArena<K, V, D>, i: NodeIndex) -> bool {
    *arena.meta(i) == Color::Black && !is_red(arena, arena.l(i)) && !is_red(arena, arena.r(i))
}

fn is_4_node<K, V, const D: usize>(arena: &RbArena<K, V, D>, i: NodeIndex) -> bool {
    is_red(arena, arena.l(i)) && is_red(arena, arena.r(i))
}

fn split_4_node<K, V, const D: usize>(arena: &mut RbArena<K, V, D>, i: NodeIndex) {
    paint(arena, i, Color::Red);
    if let Some(l) = arena.l(i) {
        paint(arena, l, Color::Black);
    }
    if let Some(r) = arena.r(i) {
        paint(arena, r, Color::Black);
    }
}

fn merge_2_nodes<K, V, const D: usize>(arena: &mut RbArena<K, V, D>, i: NodeIndex) {
    paint(arena, i, Color::Black);
    if let Some(l) = arena.l(i) {
        paint(arena, l, Color::Red);
    }
    if let Some(r) = arena.r(i) {
        paint(arena, r, Color::Red);
    }
}

fn sibling<K, V, const D: usize>(
    arena: &RbArena<K, V, D>,
    parent: NodeIndex,
    node: NodeIndex,
) -> NodeIndex {
    let other = if arena.l(parent) == Some(node) {
        arena.r(parent)
    } else {
        arena.l(parent)
    };
    other.expect("a black node has a sibling")
}

fn replace_child_or_root<K, V, const D: usize>(
    arena: &mut RbArena<K, V, D>,
    root: &mut Option<NodeIndex>,
    parent: Option<NodeIndex>,
    child: NodeIndex,
    new_child: Option<NodeIndex>,
) {
    match parent {
        Some(p) if arena.l(p) == Some(child) => arena.set_l(p, new_child),
        Some(p) => arena.set_r(p, new_child),
        None => *root = new_child,
    }
}

/// Rotation at `parent` that lets its 2-node child `current` borrow a red
/// node from `sibling`, which has at least one red child.
fn rotation<K, V, const D: usize>(
    arena: &RbArena<K, V, D>,
    parent: NodeIndex,
    current: NodeIndex,
    sibling: NodeIndex,
) -> Rotation {
    let current_is_left = arena.l(parent) == Some(current);
    match (is_red(arena, arena.l(sibling)), current_is_left) {
        (true, true) => Rotation::RightLeft,
        (true, false) => Rotation::Right,
        (false, true) => Rotation::Left,
        (false, false) => Rotation::LeftRight,
    }
}

fn rotate<K, V, const D: usize>(
    arena: &mut RbArena<K, V, D>,
    parent: NodeIndex,
    rotation: Rotation,
) -> NodeIndex {
    match rotation {
        Rotation::Right => {
            let c = arena.l(parent).expect("sibling on the left");
            let red = arena.l(c).expect("sibling has a red outer child");
            paint(arena, red, Color::Black);
            rotate_right(arena, parent, c)
        }
        Rotation::Left => {
            let c = arena.r(parent).expect("sibling on the right");
            let red = arena.r(c).expect("sibling has a red outer child");
            paint(arena, red, Color::Black);
            rotate_left(arena, parent, c)
        }
        Rotation::RightLeft => {
            let c = arena.r(parent).expect("sibling on the right");
            let g = arena.l(c).expect("sibling has a red inner child");
            rotate_right_left(arena, parent, c, g)
        }
        Rotation::LeftRight => {
            let c = arena.l(parent).expect("sibling on the left");
            let g = arena.r(c).expect("sibling has a red inner child");
            rotate_left_right(arena, parent, c, g)
        }
    }
}

/// Resolve a red `current` under a red `parent` by rotating at `grand`.
///
/// After a double rotation `current` sits where `grand` was, so `parent`
/// becomes `great`.
fn insertion_balance<K, V, const D: usize>(
    arena: &mut RbArena<K, V, D>,
    root: &mut Option<NodeIndex>,
    current: NodeIndex,
    parent: &mut Option<NodeIndex>,
    grand: NodeIndex,
    great: Option<NodeIndex>,
) {
    let p = parent.expect("red parent is present");
    let parent_is_right = arena.r(grand) == Some(p);
    let current_is_right = arena.r(p) == Some(current);
    let top = if parent_is_right == current_is_right {
        if current_is_right {
            rotate_left(arena, grand, p)
        } else {
            rotate_right(arena, grand, p)
        }
    } else {
        *parent = great;
        if current_is_right {
            rotate_left_right(arena, grand, p, current)
        } else {
            rotate_right_left(arena, grand, p, current)
        }
    };
    paint(arena, grand, Color::Red);
    paint(arena, top, Color::Black);
    replace_child_or_root(arena, root, great, grand, Some(top));
}

pub(crate) fn link<K, V, const D: usize, F>(
    tree: &mut Tree<K, V, RedBlack, D>,
    nav: &mut F,
    node: NodeIndex,
    pos: [i32; D],
    len: [i32; D],
) where
    F: FnMut(&K, &[i32; D]) -> Ordering,
{
    let Tree { arena, root, .. } = tree;
    if D > 0 {
        shift_right_of_path(arena, *root, pos[0], len);
    }

    let Some(top) = *root else {
        arena.set_offset(node, pos);
        paint(arena, node, Color::Black);
        *root = Some(node);
        return;
    };

    let mut current = Some(top);
    let mut abs = arena.offset(top);
    let mut parent: Option<NodeIndex> = None;
    let mut parent_abs = [0; D];
    let mut grand: Option<NodeIndex> = None;
    let mut great: Option<NodeIndex> = None;
    let mut left = false;
    while let Some(c) = current {
        left = nav(arena.key(c), &abs) == Ordering::Less;
        if is_4_node(arena, c) {
            split_4_node(arena, c);
            if is_red(arena, parent) {
                let g = grand.expect("red parent is not the root");
                insertion_balance(arena, root, c, &mut parent, g, great);
            }
        }
        great = grand;
        grand = parent;
        parent = Some(c);
        parent_abs = abs;
        current = if left { arena.l(c) } else { arena.r(c) };
        if let Some(next) = current {
            abs = add(abs, arena.offset(next));
        }
    }

    let p = parent.expect("descent visits the root");
    arena.set_offset(node, sub(pos, parent_abs));
    paint(arena, node, Color::Red);
    if left {
        arena.set_l(p, Some(node));
    } else {
        arena.set_r(p, Some(node));
    }
    if is_red(arena, parent) {
        let g = grand.expect("red parent is not the root");
        insertion_balance(arena, root, node, &mut parent, g, great);
    }
    if let Some(r) = *root {
        paint(arena, r, Color::Black);
    }
}

pub(crate) fn unlink<K, V, const D: usize, F>(
    tree: &mut Tree<K, V, RedBlack, D>,
    nav: &mut F,
    node: NodeIndex,
    pos: [i32; D],
    len: [i32; D],
) where
    F: FnMut(&K, &[i32; D]) -> Ordering,
{
    let Tree { arena, root, .. } = tree;
    let mut current = *root;
    let mut abs = root.map_or([0; D], |r| arena.offset(r));
    let mut parent: Option<NodeIndex> = None;
    let mut parent_abs = [0; D];
    let mut grand: Option<NodeIndex> = None;
    let mut found = false;
    let mut parent_of_match: Option<NodeIndex> = None;

    while let Some(c) = current {
        if is_2_node(arena, c) {
            match parent {
                None => paint(arena, c, Color::Red),
                Some(p) => {
                    let mut sib = sibling(arena, p, c);
                    if is_red(arena, Some(sib)) {
                        // Flip the red link of the 3-node above so the sibling is black.
                        let top = if arena.r(p) == Some(sib) {
                            rotate_left(arena, p, sib)
                        } else {
                            rotate_right(arena, p, sib)
                        };
                        paint(arena, p, Color::Red);
                        paint(arena, sib, Color::Black);
                        replace_child_or_root(arena, root, grand, p, Some(top));
                        grand = Some(sib);
                        if found && p == node {
                            parent_of_match = Some(sib);
                        }
                        sib = sibling(arena, p, c);
                    }
                    if is_2_node(arena, sib) {
                        merge_2_nodes(arena, p);
                    } else {
                        let rotation = rotation(arena, p, c, sib);
                        let parent_color = *arena.meta(p);
                        let top = rotate(arena, p, rotation);
                        paint(arena, top, parent_color);
                        paint(arena, p, Color::Black);
                        paint(arena, c, Color::Red);
                        replace_child_or_root(arena, root, grand, p, Some(top));
                        if found && p == node {
                            parent_of_match = Some(top);
                        }
                    }
                }
            }
        }

        // Past the match the walk heads for its successor.
        let go_left = if found {
            true
        } else if c == node {
            found = true;
            parent_of_match = parent;
            false
        } else {
            nav(arena.key(c), &abs) == Ordering::Less
        };
        grand = parent;
        parent = Some(c);
        parent_abs = abs;
        current = if go_left { arena.l(c) } else { arena.r(c) };
        if let Some(next) = current {
            abs = add(abs, arena.offset(next));
        }
    }

    let successor = parent.expect("descent visits the root");
    replace_node(
        arena,
        root,
        node,
        pos,
        parent_of_match,
        successor,
        parent_abs,
        grand,
    );
    if let Some(r) = *root {
        paint(arena, r, Color::Black);
    }
    if D > 0 {
        shift_right_of_path(arena, *root, pos[0], neg(len));
    }
}

/// Put `successor` (the leftmost node of the match's right subtree, or the
/// match itself when it has no right child) in the place of `matched`.
#[allow(clippy::too_many_arguments)]
fn replace_node<K, V, const D: usize>(
    arena: &mut RbArena<K, V, D>,
    root: &mut Option<NodeIndex>,
    matched: NodeIndex,
    matched_abs: [i32; D],
    parent_of_match: Option<NodeIndex>,
    successor: NodeIndex,
    successor_abs: [i32; D],
    parent_of_successor: Option<NodeIndex>,
) {
    let color = *arena.meta(matched);
    let base = sub(matched_abs, arena.offset(matched));
    let replacement = if successor == matched {
        let child = arena.l(matched);
        if let Some(c) = child {
            let c_off = arena.offset(c);
            arena.set_offset(c, add(c_off, arena.offset(matched)));
            paint(arena, c, color);
        }
        child
    } else {
        let s = successor;
        let sr = arena.r(s);
        if let Some(sr) = sr {
            paint(arena, sr, Color::Black);
        }
        let ps = parent_of_successor.expect("successor below the match has a parent");
        if ps != matched {
            arena.set_l(ps, sr);
            if let Some(sr) = sr {
                let sr_off = arena.offset(sr);
                arena.set_offset(sr, add(sr_off, arena.offset(s)));
            }
            let mr = arena.r(matched);
            let mr_abs = mr.map(|mr| add(matched_abs, arena.offset(mr)));
            arena.set_r(s, mr);
            if let Some(mr_abs) = mr_abs {
                reattach(arena, mr, mr_abs, successor_abs);
            }
        }
        let ml = arena.l(matched);
        let ml_abs = ml.map(|ml| add(matched_abs, arena.offset(ml)));
        arena.set_l(s, ml);
        if let Some(ml_abs) = ml_abs {
            reattach(arena, ml, ml_abs, successor_abs);
        }
        arena.set_offset(s, sub(successor_abs, base));
        paint(arena, s, color);
        Some(s)
    };
    replace_child_or_root(arena, root, parent_of_match, matched, replacement);
}

/// Black height of the subtree at `node`, counting the absent leaves.
pub(crate) fn black_height<K, V, const D: usize>(
    arena: &RbArena<K, V, D>,
    node: Option<NodeIndex>,
) -> Result<u32, String> {
    let Some(n) = node else {
        return Ok(1);
    };
    let red = *arena.meta(n) == Color::Red;
    if red && (is_red(arena, arena.l(n)) || is_red(arena, arena.r(n))) {
        return Err(format!("Red node {n} has a red child"));
    }
    let lh = black_height(arena, arena.l(n))?;
    let rh = black_height(arena, arena.r(n))?;
    if lh != rh {
        return Err(format!(
            "Black height mismatch at node {n}: left {lh}, right {rh}"
        ));
    }
    Ok(lh + u32::from(!red))
}
