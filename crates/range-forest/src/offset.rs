//! Relative offset bookkeeping shared by every balancing strategy.
//!
//! Each node stores `offset = start(node) - start(parent)`; the root stores
//! its own start. The absolute start of a node is therefore the sum of the
//! offsets on the path from the root. Rotations below rewrite exactly the
//! offsets of the nodes whose parent changes, so absolute starts are
//! invariant under any rotation.
//!
//! ```text
//!       n                c
//!      / \              / \
//!     c   z    →       x   n
//!    / \                  / \
//!   x   b                b   z
//!
//!   c' = n + c     n' = -c     b' = b + c
//! ```

use crate::arena::{Arena, NodeIndex};

#[inline]
pub(crate) fn add<const D: usize>(a: [i32; D], b: [i32; D]) -> [i32; D] {
    std::array::from_fn(|i| a[i] + b[i])
}

#[inline]
pub(crate) fn sub<const D: usize>(a: [i32; D], b: [i32; D]) -> [i32; D] {
    std::array::from_fn(|i| a[i] - b[i])
}

#[inline]
pub(crate) fn neg<const D: usize>(a: [i32; D]) -> [i32; D] {
    std::array::from_fn(|i| -a[i])
}

/// Element-wise checked addition; `None` if any dimension overflows.
pub(crate) fn checked_add<const D: usize>(a: [i32; D], b: [i32; D]) -> Option<[i32; D]> {
    let mut out = [0; D];
    for i in 0..D {
        out[i] = a[i].checked_add(b[i])?;
    }
    Some(out)
}

/// Promote `nl` (left child of `n`) over `n`. The caller re-links the
/// returned top into `n`'s former parent.
pub(crate) fn rotate_right<K, V, M, const D: usize>(
    arena: &mut Arena<K, V, M, D>,
    n: NodeIndex,
    nl: NodeIndex,
) -> NodeIndex {
    let b = arena.r(nl);
    let n_off = arena.offset(n);
    let nl_off = arena.offset(nl);

    arena.set_l(n, b);
    if let Some(b) = b {
        let b_off = arena.offset(b);
        arena.set_offset(b, add(b_off, nl_off));
    }
    arena.set_r(nl, Some(n));
    arena.set_offset(nl, add(n_off, nl_off));
    arena.set_offset(n, neg(nl_off));
    nl
}

/// Promote `nr` (right child of `n`) over `n`.
pub(crate) fn rotate_left<K, V, M, const D: usize>(
    arena: &mut Arena<K, V, M, D>,
    n: NodeIndex,
    nr: NodeIndex,
) -> NodeIndex {
    let b = arena.l(nr);
    let n_off = arena.offset(n);
    let nr_off = arena.offset(nr);

    arena.set_r(n, b);
    if let Some(b) = b {
        let b_off = arena.offset(b);
        arena.set_offset(b, add(b_off, nr_off));
    }
    arena.set_l(nr, Some(n));
    arena.set_offset(nr, add(n_off, nr_off));
    arena.set_offset(n, neg(nr_off));
    nr
}

/// Double rotation: `g = n.l.r` ends up on top with `n.l` and `n` as children.
pub(crate) fn rotate_left_right<K, V, M, const D: usize>(
    arena: &mut Arena<K, V, M, D>,
    n: NodeIndex,
    nl: NodeIndex,
    g: NodeIndex,
) -> NodeIndex {
    let g = rotate_left(arena, nl, g);
    arena.set_l(n, Some(g));
    rotate_right(arena, n, g)
}

/// Double rotation: `g = n.r.l` ends up on top with `n` and `n.r` as children.
pub(crate) fn rotate_right_left<K, V, M, const D: usize>(
    arena: &mut Arena<K, V, M, D>,
    n: NodeIndex,
    nr: NodeIndex,
    g: NodeIndex,
) -> NodeIndex {
    let g = rotate_right(arena, nr, g);
    arena.set_r(n, Some(g));
    rotate_left(arena, n, g)
}

/// Re-parent `child` (whose absolute start is `child_abs`) under a node
/// starting at `parent_abs`.
#[inline]
pub(crate) fn reattach<K, V, M, const D: usize>(
    arena: &mut Arena<K, V, M, D>,
    child: Option<NodeIndex>,
    child_abs: [i32; D],
    parent_abs: [i32; D],
) {
    if let Some(c) = child {
        arena.set_offset(c, sub(child_abs, parent_abs));
    }
}

/// Shift every element starting at or after `threshold` (compared in
/// dimension 0) by `delta`.
///
/// Only the nodes on one root-to-leaf path are touched: a node at or past the
/// threshold takes the delta, which moves its whole subtree, and its left
/// child takes the negated delta so that subtree stays put until the walk
/// descends into it.
pub(crate) fn shift_right_of_path<K, V, M, const D: usize>(
    arena: &mut Arena<K, V, M, D>,
    root: Option<NodeIndex>,
    threshold: i32,
    delta: [i32; D],
) {
    if D == 0 || delta.iter().all(|&d| d == 0) {
        return;
    }
    let Some(root) = root else {
        return;
    };
    let mut curr = Some(root);
    let mut abs = arena.offset(root);
    while let Some(n) = curr {
        if abs[0] >= threshold {
            let l = arena.l(n);
            let n_off = arena.offset(n);
            arena.set_offset(n, add(n_off, delta));
            if let Some(l) = l {
                let l_off = arena.offset(l);
                abs = add(abs, l_off);
                arena.set_offset(l, sub(l_off, delta));
            }
            curr = l;
        } else {
            let r = arena.r(n);
            if let Some(r) = r {
                abs = add(abs, arena.offset(r));
            }
            curr = r;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::AllocationMode;

    type TestArena = Arena<(), (), (), 1>;

    fn node(arena: &mut TestArena, off: i32) -> NodeIndex {
        let i = arena.allocate().unwrap();
        arena.fill(i, (), ());
        arena.set_offset(i, [off]);
        i
    }

    /// Absolute starts of the subtree in order.
    fn starts(arena: &TestArena, root: Option<NodeIndex>, base: i32, out: &mut Vec<i32>) {
        if let Some(n) = root {
            let abs = base + arena.offset(n)[0];
            starts(arena, arena.l(n), abs, out);
            out.push(abs);
            starts(arena, arena.r(n), abs, out);
        }
    }

    /// Three elements of length 5 starting at 0, 5, 10 rooted at the middle one.
    fn small_tree() -> (TestArena, NodeIndex) {
        let mut arena = TestArena::new(0, AllocationMode::DynamicRetainFreelist).unwrap();
        let root = node(&mut arena, 5);
        let a = node(&mut arena, -5);
        let c = node(&mut arena, 5);
        arena.set_l(root, Some(a));
        arena.set_r(root, Some(c));
        (arena, root)
    }

    #[test]
    fn rotations_preserve_absolute_starts() {
        let (mut arena, root) = small_tree();
        let nl = arena.l(root).unwrap();
        let top = rotate_right(&mut arena, root, nl);
        let mut out = Vec::new();
        starts(&arena, Some(top), 0, &mut out);
        assert_eq!(out, vec![0, 5, 10]);
        assert_eq!(arena.offset(top), [0]);

        let nr = arena.r(top).unwrap();
        let top = rotate_left(&mut arena, top, nr);
        let mut out = Vec::new();
        starts(&arena, Some(top), 0, &mut out);
        assert_eq!(out, vec![0, 5, 10]);
        assert_eq!(arena.offset(top), [5]);
    }

    #[test]
    fn shift_moves_only_nodes_past_threshold() {
        let (mut arena, root) = small_tree();
        shift_right_of_path(&mut arena, Some(root), 5, [3]);
        let mut out = Vec::new();
        starts(&arena, Some(root), 0, &mut out);
        assert_eq!(out, vec![0, 8, 13]);

        shift_right_of_path(&mut arena, Some(root), 9, [-2]);
        let mut out = Vec::new();
        starts(&arena, Some(root), 0, &mut out);
        assert_eq!(out, vec![0, 8, 11]);

        shift_right_of_path(&mut arena, Some(root), 0, [1]);
        let mut out = Vec::new();
        starts(&arena, Some(root), 0, &mut out);
        assert_eq!(out, vec![1, 9, 12]);
    }

    #[test]
    fn checked_add_reports_overflow_per_dimension() {
        assert_eq!(checked_add([1, 2], [3, 4]), Some([4, 6]));
        assert_eq!(checked_add([i32::MAX, 0], [1, 0]), None);
        assert_eq!(checked_add::<0>([], []), Some([]));
    }
}
