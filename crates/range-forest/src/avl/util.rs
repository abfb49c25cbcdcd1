use std::cmp::Ordering;

use crate::arena::{Arena, NodeIndex};
use crate::offset::{
    add, neg, reattach, rotate_left, rotate_left_right, rotate_right, rotate_right_left,
    shift_right_of_path, sub,
};
use crate::tree::Tree;

use super::Avl;

/// Root-to-node path: each entry is a node and whether the walk went left.
type Path = Vec<(NodeIndex, bool)>;

const PATH_CAPACITY: usize = 48;

#[inline]
fn bf<K, V, const D: usize>(arena: &Arena<K, V, i8, D>, i: NodeIndex) -> i8 {
    *arena.meta(i)
}

#[inline]
fn set_bf<K, V, const D: usize>(arena: &mut Arena<K, V, i8, D>, i: NodeIndex, v: i8) {
    arena.set_meta(i, v);
}

/// Point `path[i - 1]` (or the root) at `top`.
fn relink<K, V, const D: usize>(
    arena: &mut Arena<K, V, i8, D>,
    root: &mut Option<NodeIndex>,
    path: &[(NodeIndex, bool)],
    i: usize,
    top: NodeIndex,
) {
    if i == 0 {
        *root = Some(top);
        return;
    }
    let (p, left) = path[i - 1];
    if left {
        arena.set_l(p, Some(top));
    } else {
        arena.set_r(p, Some(top));
    }
}

/// Rotate the subtree at `n`, whose balance factor reached `nbf = ±2`.
///
/// Returns the new top and whether the subtree kept its previous height
/// (only possible after a deletion, when the taller child was balanced).
fn rebalance<K, V, const D: usize>(
    arena: &mut Arena<K, V, i8, D>,
    n: NodeIndex,
    nbf: i8,
) -> (NodeIndex, bool) {
    if nbf > 0 {
        let c = arena.r(n).expect("right-heavy node has a right child");
        let cbf = bf(arena, c);
        if cbf >= 0 {
            let top = rotate_left(arena, n, c);
            if cbf == 0 {
                set_bf(arena, n, 1);
                set_bf(arena, c, -1);
                return (top, true);
            }
            set_bf(arena, n, 0);
            set_bf(arena, c, 0);
            return (top, false);
        }
        let g = arena.l(c).expect("left-heavy child has a left child");
        let gbf = bf(arena, g);
        let top = rotate_right_left(arena, n, c, g);
        set_bf(arena, n, if gbf > 0 { -1 } else { 0 });
        set_bf(arena, c, if gbf < 0 { 1 } else { 0 });
        set_bf(arena, g, 0);
        return (top, false);
    }

    let c = arena.l(n).expect("left-heavy node has a left child");
    let cbf = bf(arena, c);
    if cbf <= 0 {
        let top = rotate_right(arena, n, c);
        if cbf == 0 {
            set_bf(arena, n, -1);
            set_bf(arena, c, 1);
            return (top, true);
        }
        set_bf(arena, n, 0);
        set_bf(arena, c, 0);
        return (top, false);
    }
    let g = arena.r(c).expect("right-heavy child has a right child");
    let gbf = bf(arena, g);
    let top = rotate_left_right(arena, n, c, g);
    set_bf(arena, n, if gbf < 0 { 1 } else { 0 });
    set_bf(arena, c, if gbf > 0 { -1 } else { 0 });
    set_bf(arena, g, 0);
    (top, false)
}

pub(crate) fn link<K, V, const D: usize, F>(
    tree: &mut Tree<K, V, Avl, D>,
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

    let Some(mut curr) = *root else {
        arena.set_offset(node, pos);
        *root = Some(node);
        return;
    };

    let mut path: Path = Vec::with_capacity(PATH_CAPACITY);
    let mut abs = arena.offset(curr);
    loop {
        let left = nav(arena.key(curr), &abs) == Ordering::Less;
        path.push((curr, left));
        let next = if left { arena.l(curr) } else { arena.r(curr) };
        match next {
            Some(next) => {
                abs = add(abs, arena.offset(next));
                curr = next;
            }
            None => break,
        }
    }

    arena.set_offset(node, sub(pos, abs));
    relink(arena, root, &path, path.len(), node);

    for i in (0..path.len()).rev() {
        let (n, left) = path[i];
        let nbf = bf(arena, n) + if left { -1 } else { 1 };
        match nbf {
            0 => {
                set_bf(arena, n, 0);
                break;
            }
            1 | -1 => set_bf(arena, n, nbf),
            _ => {
                let (top, _) = rebalance(arena, n, nbf);
                relink(arena, root, &path, i, top);
                break;
            }
        }
    }
}

pub(crate) fn unlink<K, V, const D: usize, F>(
    tree: &mut Tree<K, V, Avl, D>,
    nav: &mut F,
    node: NodeIndex,
    pos: [i32; D],
    len: [i32; D],
) where
    F: FnMut(&K, &[i32; D]) -> Ordering,
{
    let Tree { arena, root, .. } = tree;
    let mut path: Path = Vec::with_capacity(PATH_CAPACITY);
    let mut curr = root.expect("unlink from a non-empty tree");
    let mut abs = arena.offset(curr);
    while curr != node {
        let left = nav(arena.key(curr), &abs) == Ordering::Less;
        path.push((curr, left));
        let next = if left { arena.l(curr) } else { arena.r(curr) };
        curr = next.expect("navigation reaches the located node");
        abs = add(abs, arena.offset(curr));
    }

    let parent_abs = sub(pos, arena.offset(node));
    match (arena.l(node), arena.r(node)) {
        (Some(l), Some(r)) => {
            let l_abs = add(pos, arena.offset(l));
            let r_abs = add(pos, arena.offset(r));
            let slot = path.len();
            path.push((node, false));

            let mut s = r;
            let mut s_abs = r_abs;
            while let Some(sl) = arena.l(s) {
                path.push((s, true));
                s_abs = add(s_abs, arena.offset(sl));
                s = sl;
            }

            if s != r {
                let (sp, _) = path[path.len() - 1];
                let sr = arena.r(s);
                arena.set_l(sp, sr);
                if let Some(sr) = sr {
                    let sr_off = arena.offset(sr);
                    arena.set_offset(sr, add(sr_off, arena.offset(s)));
                }
                arena.set_r(s, Some(r));
                reattach(arena, Some(r), r_abs, s_abs);
            }
            arena.set_l(s, Some(l));
            reattach(arena, Some(l), l_abs, s_abs);
            arena.set_offset(s, sub(s_abs, parent_abs));
            let node_bf = bf(arena, node);
            set_bf(arena, s, node_bf);

            path[slot] = (s, false);
            relink(arena, root, &path, slot, s);
        }
        (child, None) | (None, child) => {
            if let Some(c) = child {
                let c_off = arena.offset(c);
                arena.set_offset(c, add(c_off, arena.offset(node)));
            }
            match child {
                Some(c) => relink(arena, root, &path, path.len(), c),
                None if path.is_empty() => *root = None,
                None => {
                    let (p, left) = path[path.len() - 1];
                    if left {
                        arena.set_l(p, None);
                    } else {
                        arena.set_r(p, None);
                    }
                }
            }
        }
    }

    for i in (0..path.len()).rev() {
        let (n, left) = path[i];
        let nbf = bf(arena, n) + if left { 1 } else { -1 };
        match nbf {
            1 | -1 => {
                set_bf(arena, n, nbf);
                break;
            }
            0 => set_bf(arena, n, 0),
            _ => {
                let (top, same_height) = rebalance(arena, n, nbf);
                relink(arena, root, &path, i, top);
                if same_height {
                    break;
                }
            }
        }
    }

    if D > 0 {
        shift_right_of_path(arena, *root, pos[0], neg(len));
    }
}

/// Height of the subtree at `node`, checking every balance factor on the way.
pub(crate) fn checked_height<K, V, const D: usize>(
    arena: &Arena<K, V, i8, D>,
    node: Option<NodeIndex>,
) -> Result<i32, String> {
    let Some(n) = node else {
        return Ok(0);
    };
    let lh = checked_height(arena, arena.l(n))?;
    let rh = checked_height(arena, arena.r(n))?;
    let expected = rh - lh;
    let actual = i32::from(bf(arena, n));
    if actual != expected {
        return Err(format!(
            "Balance factor mismatch at node {n}: expected {expected}, got {actual}"
        ));
    }
    if !(-1..=1).contains(&actual) {
        return Err(format!("AVL balance violated at node {n}"));
    }
    Ok(1 + lh.max(rh))
}
