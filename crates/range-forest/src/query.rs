//! Read-only descents: exact lookup, nearest neighbours and successor starts.
//!
//! None of these restructure the tree. The public entry points first give the
//! strategy a chance to `access` the target (a splay for self-adjusting
//! trees), then run the plain descent on whatever shape results.

use std::cmp::Ordering;

use crate::arena::NodeIndex;
use crate::offset::{add, sub};
use crate::tree::{Found, Nearest, Strategy, Tree};

/// Outcome of [`Tree::locate`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Located<const D: usize> {
    /// Matching node and its absolute start.
    pub found: Option<(NodeIndex, [i32; D])>,
    /// Start of the match's successor, or where a new element would start.
    /// Equals the extent when nothing follows.
    pub next: [i32; D],
}

impl<K, V, S: Strategy, const D: usize> Tree<K, V, S, D> {
    pub(crate) fn locate<F>(&self, nav: &mut F) -> Located<D>
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        let mut next = self.extent;
        let mut curr = self.root;
        let mut abs = [0; D];
        while let Some(n) = curr {
            abs = add(abs, self.arena.offset(n));
            match nav(self.arena.key(n), &abs) {
                Ordering::Less => {
                    next = abs;
                    curr = self.arena.l(n);
                }
                Ordering::Greater => curr = self.arena.r(n),
                Ordering::Equal => {
                    if let Some(r) = self.arena.r(n) {
                        next = self.leftmost_from(r, abs).1;
                    }
                    return Located {
                        found: Some((n, abs)),
                        next,
                    };
                }
            }
        }
        Located { found: None, next }
    }

    /// Leftmost node under `n`, whose parent starts at `parent_abs`.
    fn leftmost_from(&self, n: NodeIndex, parent_abs: [i32; D]) -> (NodeIndex, [i32; D]) {
        let mut curr = n;
        let mut abs = add(parent_abs, self.arena.offset(n));
        while let Some(l) = self.arena.l(curr) {
            abs = add(abs, self.arena.offset(l));
            curr = l;
        }
        (curr, abs)
    }

    /// Start of the first element after one starting at `start`.
    pub(crate) fn successor_start(&self, start: [i32; D]) -> [i32; D] {
        if D == 0 {
            return start;
        }
        let mut best = self.extent;
        let mut curr = self.root;
        let mut abs = [0; D];
        while let Some(n) = curr {
            abs = add(abs, self.arena.offset(n));
            if abs[0] > start[0] {
                best = abs;
                curr = self.arena.l(n);
            } else {
                curr = self.arena.r(n);
            }
        }
        best
    }

    pub(crate) fn found(&self, index: NodeIndex, start: [i32; D]) -> Found<D> {
        Found {
            index,
            start,
            length: sub(self.successor_start(start), start),
        }
    }

    pub(crate) fn nearest_in_place<F>(&self, nav: &mut F, kind: Nearest) -> Option<(NodeIndex, [i32; D])>
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        let or_equal = matches!(kind, Nearest::LessOrEqual | Nearest::GreaterOrEqual);
        let below = matches!(kind, Nearest::Less | Nearest::LessOrEqual);
        let mut best = None;
        let mut curr = self.root;
        let mut abs = [0; D];
        while let Some(n) = curr {
            abs = add(abs, self.arena.offset(n));
            let ord = nav(self.arena.key(n), &abs);
            if ord == Ordering::Equal && or_equal {
                return Some((n, abs));
            }
            // `ord` is the target relative to the node.
            curr = if below {
                if ord == Ordering::Greater {
                    best = Some((n, abs));
                    self.arena.r(n)
                } else {
                    self.arena.l(n)
                }
            } else if ord == Ordering::Less {
                best = Some((n, abs));
                self.arena.l(n)
            } else {
                self.arena.r(n)
            };
        }
        best
    }

    /// Exact lookup.
    pub fn find<F>(&mut self, mut nav: F) -> Option<Found<D>>
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        self.touch(&mut nav);
        let located = self.locate(&mut nav);
        let (index, start) = located.found?;
        Some(Found {
            index,
            start,
            length: sub(located.next, start),
        })
    }

    /// Closest element strictly (or not) below or above the target.
    pub fn nearest<F>(&mut self, mut nav: F, kind: Nearest) -> Option<Found<D>>
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        self.touch(&mut nav);
        let (index, start) = self.nearest_in_place(&mut nav, kind)?;
        Some(self.found(index, start))
    }

    /// The element covering `position` in dimension `side`: the last one
    /// starting at or before it, provided `position` is below the extent.
    pub fn covering(&mut self, position: i32, side: usize) -> Option<Found<D>> {
        if position < 0 || side >= D || position >= self.extent[side] {
            return None;
        }
        self.nearest(|_, start| position.cmp(&start[side]), Nearest::LessOrEqual)
    }

    pub fn first(&self) -> Option<Found<D>> {
        let root = self.root?;
        let (n, abs) = self.leftmost_from(root, [0; D]);
        Some(self.found(n, abs))
    }

    pub fn last(&self) -> Option<Found<D>> {
        let mut curr = self.root?;
        let mut abs = self.arena.offset(curr);
        while let Some(r) = self.arena.r(curr) {
            abs = add(abs, self.arena.offset(r));
            curr = r;
        }
        Some(Found {
            index: curr,
            start: abs,
            length: sub(self.extent, abs),
        })
    }
}
