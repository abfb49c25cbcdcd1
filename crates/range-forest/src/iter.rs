//! In-order traversal.
//!
//! [`Iter`] borrows the tree, so the borrow checker already rules out
//! mutation while it is alive. [`FastCursor`] is detached from the tree and
//! checks the tree's version on every call instead. [`RobustCursor`] keeps
//! only the last position it yielded and finds the next element by query,
//! so it survives mutations between steps.

use crate::arena::{Arena, NodeIndex};
use crate::error::{Error, Result};
use crate::offset::{add, sub};
use crate::tree::{Found, Strategy, Tree};

/// Explicit stack of pending ancestors, each with its absolute start.
#[derive(Clone, Debug, Default)]
struct Walk<const D: usize> {
    stack: Vec<(NodeIndex, [i32; D])>,
}

impl<const D: usize> Walk<D> {
    fn start<K, V, M>(arena: &Arena<K, V, M, D>, root: Option<NodeIndex>) -> Self {
        let mut walk = Self { stack: Vec::new() };
        if let Some(root) = root {
            walk.descend_left(arena, root, arena.offset(root));
        }
        walk
    }

    fn descend_left<K, V, M>(&mut self, arena: &Arena<K, V, M, D>, mut n: NodeIndex, mut abs: [i32; D]) {
        loop {
            self.stack.push((n, abs));
            match arena.l(n) {
                Some(l) => {
                    abs = add(abs, arena.offset(l));
                    n = l;
                }
                None => break,
            }
        }
    }

    fn next<K, V, M>(&mut self, arena: &Arena<K, V, M, D>) -> Option<(NodeIndex, [i32; D])> {
        let (n, abs) = self.stack.pop()?;
        if let Some(r) = arena.r(n) {
            self.descend_left(arena, r, add(abs, arena.offset(r)));
        }
        Some((n, abs))
    }
}

/// One step of a traversal: the element and where the next one begins.
#[derive(Clone, Debug, Default)]
struct Steps<const D: usize> {
    walk: Walk<D>,
    ahead: Option<(NodeIndex, [i32; D])>,
}

impl<const D: usize> Steps<D> {
    fn start<K, V, M>(arena: &Arena<K, V, M, D>, root: Option<NodeIndex>) -> Self {
        let mut walk = Walk::start(arena, root);
        let ahead = walk.next(arena);
        Self { walk, ahead }
    }

    fn next<K, V, M>(&mut self, arena: &Arena<K, V, M, D>, extent: [i32; D]) -> Option<Found<D>> {
        let (index, start) = self.ahead.take()?;
        self.ahead = self.walk.next(arena);
        let end = self.ahead.map_or(extent, |(_, next)| next);
        Some(Found {
            index,
            start,
            length: sub(end, start),
        })
    }
}

/// An element yielded by [`Iter`].
#[derive(Debug)]
pub struct Entry<'a, K, V, const D: usize> {
    pub key: &'a K,
    pub value: &'a V,
    pub start: [i32; D],
    pub length: [i32; D],
}

/// Borrowing in-order iterator.
pub struct Iter<'a, K, V, S: Strategy, const D: usize> {
    tree: &'a Tree<K, V, S, D>,
    steps: Steps<D>,
    remaining: usize,
}

impl<'a, K, V, S: Strategy, const D: usize> Iterator for Iter<'a, K, V, S, D> {
    type Item = Entry<'a, K, V, D>;

    fn next(&mut self) -> Option<Self::Item> {
        let found = self.steps.next(&self.tree.arena, self.tree.extent)?;
        self.remaining -= 1;
        Some(Entry {
            key: self.tree.arena.key(found.index),
            value: self.tree.arena.value(found.index),
            start: found.start,
            length: found.length,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, S: Strategy, const D: usize> ExactSizeIterator for Iter<'_, K, V, S, D> {}

impl<K, V, S: Strategy, const D: usize> Tree<K, V, S, D> {
    pub fn iter(&self) -> Iter<'_, K, V, S, D> {
        Iter {
            tree: self,
            steps: Steps::start(&self.arena, self.root),
            remaining: self.len(),
        }
    }
}

impl<'a, K, V, S: Strategy, const D: usize> IntoIterator for &'a Tree<K, V, S, D> {
    type Item = Entry<'a, K, V, D>;
    type IntoIter = Iter<'a, K, V, S, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Structural cursor that does not borrow the tree.
///
/// Each step is O(1) amortised. The cursor records the tree's version when
/// created or reset; any later change to the tree, including a splay done
/// by a lookup, makes every call fail with [`Error::InvalidState`].
#[derive(Clone, Debug)]
pub struct FastCursor<const D: usize> {
    steps: Steps<D>,
    current: Option<Found<D>>,
    version: u16,
}

impl<const D: usize> FastCursor<D> {
    pub fn new<K, V, S: Strategy>(tree: &Tree<K, V, S, D>) -> Self {
        Self {
            steps: Steps::start(&tree.arena, tree.root),
            current: None,
            version: tree.version,
        }
    }

    fn check<K, V, S: Strategy>(&self, tree: &Tree<K, V, S, D>) -> Result<()> {
        if self.version != tree.version {
            return Err(Error::InvalidState);
        }
        Ok(())
    }

    /// Step to the next element; `Ok(false)` once the traversal is over.
    pub fn move_next<K, V, S: Strategy>(&mut self, tree: &Tree<K, V, S, D>) -> Result<bool> {
        self.check(tree)?;
        self.current = self.steps.next(&tree.arena, tree.extent);
        Ok(self.current.is_some())
    }

    /// The element the cursor is on, `None` before the first step and after the last.
    pub fn current<K, V, S: Strategy>(&self, tree: &Tree<K, V, S, D>) -> Result<Option<Found<D>>> {
        self.check(tree)?;
        Ok(self.current)
    }

    /// Go back to before the first element of the tree as it is now.
    pub fn reset<K, V, S: Strategy>(&mut self, tree: &Tree<K, V, S, D>) {
        *self = Self::new(tree);
    }
}

/// Query-based cursor remembering only the last position it yielded.
///
/// Every step asks the tree for the first element strictly after that
/// position, which costs O(log n) but tolerates inserts and removals made
/// between steps.
#[derive(Clone, Debug)]
pub struct RobustCursor<P> {
    last: Option<P>,
    finished: bool,
}

impl<P> Default for RobustCursor<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> RobustCursor<P> {
    pub fn new() -> Self {
        Self {
            last: None,
            finished: false,
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.finished = false;
    }

    /// The position most recently yielded.
    pub fn last(&self) -> Option<&P> {
        self.last.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance with `seek`, which receives the last position (`None` at the
    /// start) and returns the position and payload of the next element.
    pub fn move_next_with<T, F>(&mut self, seek: F) -> Option<T>
    where
        F: FnOnce(Option<&P>) -> Option<(P, T)>,
    {
        if self.finished {
            return None;
        }
        match seek(self.last.as_ref()) {
            Some((position, item)) => {
                self.last = Some(position);
                Some(item)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}
