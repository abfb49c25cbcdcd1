use std::cmp::Ordering;

use crate::arena::{Arena, NodeIndex};
use crate::offset::{add, reattach, rotate_left, rotate_right, sub};
use crate::tree::Tree;

use super::Splay;

type SplayArena<K, V, const D: usize> = Arena<K, V, (), D>;

/// A side tree built up during a splay: its root and the node the next
/// subtree hangs off, each with its absolute start.
type SideTree<const D: usize> = Option<((NodeIndex, [i32; D]), (NodeIndex, [i32; D]))>;

/// Hang `t` as the right child of the left tree's tail.
fn hang_left<K, V, const D: usize>(
    arena: &mut SplayArena<K, V, D>,
    side: &mut SideTree<D>,
    t: NodeIndex,
    t_abs: [i32; D],
) {
    match side {
        Some((_, tail)) => {
            arena.set_r(tail.0, Some(t));
            arena.set_offset(t, sub(t_abs, tail.1));
            *tail = (t, t_abs);
        }
        None => *side = Some(((t, t_abs), (t, t_abs))),
    }
}

/// Hang `t` as the left child of the right tree's tail.
fn hang_right<K, V, const D: usize>(
    arena: &mut SplayArena<K, V, D>,
    side: &mut SideTree<D>,
    t: NodeIndex,
    t_abs: [i32; D],
) {
    match side {
        Some((_, tail)) => {
            arena.set_l(tail.0, Some(t));
            arena.set_offset(t, sub(t_abs, tail.1));
            *tail = (t, t_abs);
        }
        None => *side = Some(((t, t_abs), (t, t_abs))),
    }
}

/// Splay the subtree rooted at `t`, which starts at `t_abs`, toward `nav`.
///
/// Returns the new subtree root and its absolute start. The offset of the
/// returned node is left for the caller to set.
pub(crate) fn splay<K, V, const D: usize, F>(
    arena: &mut SplayArena<K, V, D>,
    mut t: NodeIndex,
    mut t_abs: [i32; D],
    nav: &mut F,
) -> (NodeIndex, [i32; D])
where
    F: FnMut(&K, &[i32; D]) -> Ordering,
{
    let mut left: SideTree<D> = None;
    let mut right: SideTree<D> = None;
    loop {
        match nav(arena.key(t), &t_abs) {
            Ordering::Less => {
                let Some(y) = arena.l(t) else {
                    break;
                };
                let y_abs = add(t_abs, arena.offset(y));
                if nav(arena.key(y), &y_abs) == Ordering::Less {
                    t = rotate_right(arena, t, y);
                    t_abs = y_abs;
                    if arena.l(t).is_none() {
                        break;
                    }
                }
                let next = arena.l(t).expect("left child is present");
                hang_right(arena, &mut right, t, t_abs);
                t_abs = add(t_abs, arena.offset(next));
                t = next;
            }
            Ordering::Greater => {
                let Some(y) = arena.r(t) else {
                    break;
                };
                let y_abs = add(t_abs, arena.offset(y));
                if nav(arena.key(y), &y_abs) == Ordering::Greater {
                    t = rotate_left(arena, t, y);
                    t_abs = y_abs;
                    if arena.r(t).is_none() {
                        break;
                    }
                }
                let next = arena.r(t).expect("right child is present");
                hang_left(arena, &mut left, t, t_abs);
                t_abs = add(t_abs, arena.offset(next));
                t = next;
            }
            Ordering::Equal => break,
        }
    }

    let tl = arena.l(t);
    let tr = arena.r(t);
    let tl_abs = tl.map(|c| add(t_abs, arena.offset(c)));
    let tr_abs = tr.map(|c| add(t_abs, arena.offset(c)));
    if let Some(((root, root_abs), (tail, tail_abs))) = left {
        arena.set_r(tail, tl);
        if let Some(abs) = tl_abs {
            reattach(arena, tl, abs, tail_abs);
        }
        arena.set_l(t, Some(root));
        reattach(arena, Some(root), root_abs, t_abs);
    }
    if let Some(((root, root_abs), (tail, tail_abs))) = right {
        arena.set_l(tail, tr);
        if let Some(abs) = tr_abs {
            reattach(arena, tr, abs, tail_abs);
        }
        arena.set_r(t, Some(root));
        reattach(arena, Some(root), root_abs, t_abs);
    }
    (t, t_abs)
}

/// Splay a whole tree and return its new root.
pub(crate) fn splay_root<K, V, const D: usize, F>(
    arena: &mut SplayArena<K, V, D>,
    root: NodeIndex,
    nav: &mut F,
) -> NodeIndex
where
    F: FnMut(&K, &[i32; D]) -> Ordering,
{
    let abs = arena.offset(root);
    let (top, top_abs) = splay(arena, root, abs, nav);
    arena.set_offset(top, top_abs);
    top
}

/// Splay toward the new element's place and put `node` above the result.
pub(crate) fn link<K, V, const D: usize, F>(
    tree: &mut Tree<K, V, Splay, D>,
    nav: &mut F,
    node: NodeIndex,
    pos: [i32; D],
    len: [i32; D],
) where
    F: FnMut(&K, &[i32; D]) -> Ordering,
{
    let Tree { arena, root, .. } = tree;
    if D > 0 {
        crate::offset::shift_right_of_path(arena, *root, pos[0], len);
    }
    arena.set_offset(node, pos);
    let Some(r) = *root else {
        *root = Some(node);
        return;
    };

    let t = splay_root(arena, r, nav);
    let t_abs = arena.offset(t);
    if nav(arena.key(t), &t_abs) == Ordering::Less {
        let tl = arena.l(t);
        let tl_abs = tl.map(|c| add(t_abs, arena.offset(c)));
        arena.set_l(node, tl);
        if let Some(abs) = tl_abs {
            reattach(arena, tl, abs, pos);
        }
        arena.set_l(t, None);
        arena.set_r(node, Some(t));
    } else {
        let tr = arena.r(t);
        let tr_abs = tr.map(|c| add(t_abs, arena.offset(c)));
        arena.set_r(node, tr);
        if let Some(abs) = tr_abs {
            reattach(arena, tr, abs, pos);
        }
        arena.set_r(t, None);
        arena.set_l(node, Some(t));
    }
    reattach(arena, Some(t), t_abs, pos);
    *root = Some(node);
}

/// Splay `node` to the root, then join its subtrees under the minimum of the
/// right one, which moves back by `len` along with everything after it.
pub(crate) fn unlink<K, V, const D: usize, F>(
    tree: &mut Tree<K, V, Splay, D>,
    nav: &mut F,
    node: NodeIndex,
    pos: [i32; D],
    len: [i32; D],
) where
    F: FnMut(&K, &[i32; D]) -> Ordering,
{
    let Tree { arena, root, .. } = tree;
    let r = root.expect("unlink from a non-empty tree");
    let t = splay_root(arena, r, nav);
    debug_assert_eq!(t, node, "splay reaches the located node");
    debug_assert_eq!(arena.offset(t), pos);

    let t_abs = arena.offset(t);
    let l = arena.l(t);
    let l_abs = l.map(|c| add(t_abs, arena.offset(c)));
    *root = match arena.r(t) {
        None => {
            if let Some(abs) = l_abs {
                reattach(arena, l, abs, [0; D]);
            }
            l
        }
        Some(rt) => {
            let rt_abs = add(t_abs, arena.offset(rt));
            let (m, m_abs) = splay(arena, rt, rt_abs, &mut |_: &K, _: &[i32; D]| Ordering::Less);
            let m_abs = sub(m_abs, len);
            arena.set_offset(m, m_abs);
            arena.set_l(m, l);
            if let Some(abs) = l_abs {
                reattach(arena, l, abs, m_abs);
            }
            Some(m)
        }
    };
}
