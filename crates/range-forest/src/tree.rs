//! The generic engine every facade is built on.
//!
//! `Tree<K, V, S, D>` owns the arena and the tree header (root, count,
//! version, extent). Balancing is delegated to a [`Strategy`]; navigation is
//! supplied by the caller as a closure returning the ordering of the search
//! target relative to a node, given that node's key and absolute start.

use std::cmp::Ordering;
use std::fmt;

use crate::arena::{AllocationMode, Arena, NodeIndex};
use crate::error::{Error, Result};
use crate::offset::{checked_add, sub};

/// Construction options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeOptions {
    /// Number of slots created up front.
    pub capacity: u32,
    pub allocation_mode: AllocationMode,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            capacity: 0,
            allocation_mode: AllocationMode::DynamicRetainFreelist,
        }
    }
}

impl TreeOptions {
    /// A pool of exactly `capacity` slots that never grows.
    pub fn fixed(capacity: u32) -> Self {
        Self {
            capacity,
            allocation_mode: AllocationMode::PreallocatedFixed,
        }
    }

    /// A growable pool pre-sized to `capacity` slots.
    pub fn dynamic(capacity: u32) -> Self {
        Self {
            capacity,
            allocation_mode: AllocationMode::DynamicRetainFreelist,
        }
    }
}

/// What to do when an insert meets an element that compares equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertMode {
    /// Fail and leave the existing element alone.
    Add,
    /// Overwrite the existing value in place, without restructuring.
    Upsert,
}

/// Direction of a nearest-element query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nearest {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

/// A located element: its slot, absolute start and length in every dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Found<const D: usize> {
    pub index: NodeIndex,
    pub start: [i32; D],
    pub length: [i32; D],
}

/// A balancing discipline.
///
/// Implementations receive the whole tree so they can rewrite the root. They
/// must keep the offset invariant intact: after `link` the new node starts at
/// `pos` and everything that started at or after `pos` moved by `len`; after
/// `unlink` everything after the removed element moved back by `len`.
pub trait Strategy: Sized {
    /// Per-node balance metadata.
    type Meta: Copy + Default + fmt::Debug;

    const NAME: &'static str;

    /// Restructure toward the target described by `nav` ahead of a lookup.
    /// Returns `true` when the shape may have changed.
    fn access<K, V, const D: usize, F>(_tree: &mut Tree<K, V, Self, D>, _nav: &mut F) -> bool
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        false
    }

    /// Attach the allocated, still empty `node` so that it starts at `pos`.
    fn link<K, V, const D: usize, F>(
        tree: &mut Tree<K, V, Self, D>,
        nav: &mut F,
        node: NodeIndex,
        pos: [i32; D],
        len: [i32; D],
    ) where
        F: FnMut(&K, &[i32; D]) -> Ordering;

    /// Detach `node`, which `nav` leads to and which starts at `pos`.
    fn unlink<K, V, const D: usize, F>(
        tree: &mut Tree<K, V, Self, D>,
        nav: &mut F,
        node: NodeIndex,
        pos: [i32; D],
        len: [i32; D],
    ) where
        F: FnMut(&K, &[i32; D]) -> Ordering;

    /// Check the discipline's own balance invariant.
    fn check<K, V, const D: usize>(tree: &Tree<K, V, Self, D>) -> std::result::Result<(), String>;
}

/// Strategies with a worst-case height bound, where lookups never restructure.
pub trait HeightBalanced: Strategy {}

pub struct Tree<K, V, S: Strategy, const D: usize> {
    pub(crate) arena: Arena<K, V, S::Meta, D>,
    pub(crate) root: Option<NodeIndex>,
    pub(crate) count: u32,
    pub(crate) version: u16,
    pub(crate) extent: [i32; D],
}

impl<K, V, S: Strategy, const D: usize> Tree<K, V, S, D> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(0, AllocationMode::DynamicRetainFreelist)
                .expect("an empty dynamic arena needs no allocation"),
            root: None,
            count: 0,
            version: 0,
            extent: [0; D],
        }
    }

    pub fn with_options(options: TreeOptions) -> Result<Self> {
        Ok(Self {
            arena: Arena::new(options.capacity, options.allocation_mode)?,
            root: None,
            count: 0,
            version: 0,
            extent: [0; D],
        })
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Sum of all element lengths per dimension.
    pub fn extent(&self) -> [i32; D] {
        self.extent
    }

    /// Structural change counter.
    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn arena(&self) -> &Arena<K, V, S::Meta, D> {
        &self.arena
    }

    /// Pre-size the pool so that `n` more elements fit without growing.
    pub fn ensure_free(&mut self, n: u32) -> Result<()> {
        let free = self.arena.free_count();
        if free < n {
            self.arena.ensure_free(n - free)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        log::trace!("clearing {} tree of {} elements", S::NAME, self.count);
        self.arena.clear();
        self.root = None;
        self.count = 0;
        self.extent = [0; D];
        self.bump();
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Let the strategy restructure toward `nav`, recording any shape change.
    pub(crate) fn touch<F>(&mut self, nav: &mut F)
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        if S::access(self, nav) {
            self.bump();
        }
    }

    pub fn key(&self, idx: NodeIndex) -> &K {
        self.arena.key(idx)
    }

    pub fn value(&self, idx: NodeIndex) -> &V {
        self.arena.value(idx)
    }

    pub fn value_mut(&mut self, idx: NodeIndex) -> &mut V {
        self.arena.value_mut(idx)
    }

    /// Insert `key`/`value` occupying `len` at the place `nav` leads to.
    ///
    /// `nav` receives the key being inserted, then the key and start of the
    /// node being compared. Returns `Ok(false)` when an equal element exists
    /// and `mode` is [`InsertMode::Add`]. Overflow is detected before
    /// anything changes and an allocation failure leaves the tree as it was.
    pub fn insert_with<F>(
        &mut self,
        mut nav: F,
        key: K,
        value: V,
        len: [i32; D],
        mode: InsertMode,
    ) -> Result<bool>
    where
        F: FnMut(&K, &K, &[i32; D]) -> Ordering,
    {
        let extent = checked_add(self.extent, len).ok_or(Error::Overflow)?;
        let count = self.count.checked_add(1).ok_or(Error::Overflow)?;

        let mut nav = |k: &K, start: &[i32; D]| nav(&key, k, start);
        self.touch(&mut nav);
        let located = self.locate(&mut nav);
        if let Some((idx, _)) = located.found {
            return Ok(match mode {
                InsertMode::Add => false,
                InsertMode::Upsert => {
                    *self.arena.value_mut(idx) = value;
                    true
                }
            });
        }

        let node = self.arena.allocate()?;
        S::link(self, &mut nav, node, located.next, len);
        self.arena.fill(node, key, value);
        self.count = count;
        self.extent = extent;
        self.bump();
        Ok(true)
    }

    /// Remove the element `nav` leads to.
    pub fn remove_with<F>(&mut self, mut nav: F) -> Option<(K, V, Found<D>)>
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        self.touch(&mut nav);
        let located = self.locate(&mut nav);
        let (idx, start) = located.found?;
        let length = sub(located.next, start);

        S::unlink(self, &mut nav, idx, start, length);
        self.extent = sub(self.extent, length);
        self.count -= 1;
        self.bump();
        let (key, value) = self.arena.free(idx)?;
        Some((
            key,
            value,
            Found {
                index: idx,
                start,
                length,
            },
        ))
    }

    /// Change the length of the element `nav` leads to; later elements move
    /// by the difference. Returns `Ok(false)` when nothing matches.
    pub fn resize_with<F>(&mut self, mut nav: F, len: [i32; D]) -> Result<bool>
    where
        F: FnMut(&K, &[i32; D]) -> Ordering,
    {
        self.touch(&mut nav);
        let located = self.locate(&mut nav);
        let Some((_, start)) = located.found else {
            return Ok(false);
        };
        let delta = sub(len, sub(located.next, start));
        let extent = checked_add(self.extent, delta).ok_or(Error::Overflow)?;
        if delta.iter().all(|&d| d == 0) {
            return Ok(true);
        }
        if D > 0 {
            crate::offset::shift_right_of_path(&mut self.arena, self.root, located.next[0], delta);
        }
        self.extent = extent;
        self.bump();
        Ok(true)
    }
}

impl<K, V, S: Strategy, const D: usize> Default for Tree<K, V, S, D> {
    fn default() -> Self {
        Self::new()
    }
}
