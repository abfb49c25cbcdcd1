//! Flat node pool with an intrusive free list.
//!
//! Every "pointer" in the trees is an `Option<NodeIndex>` into the pool. A
//! slot keeps its index for as long as it is live; freeing it drops the key
//! and value and threads the slot onto the free list through its `l` link.

use log::{debug, warn};

use crate::error::{Error, Result};

/// Index of a slot in the arena.
pub type NodeIndex = u32;

/// How the arena obtains slots once the free list is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AllocationMode {
    /// All slots are created at construction; allocation fails once they are used up.
    PreallocatedFixed,
    /// The pool doubles when the free list runs dry; freed slots are kept for reuse.
    #[default]
    DynamicRetainFreelist,
    /// Return freed nodes to the system allocator. Array storage cannot do this.
    DynamicDiscard,
}

#[derive(Clone, Debug)]
pub struct Slot<K, V, M, const D: usize> {
    pub(crate) l: Option<NodeIndex>,
    pub(crate) r: Option<NodeIndex>,
    pub(crate) meta: M,
    pub(crate) offset: [i32; D],
    pub(crate) entry: Option<(K, V)>,
}

impl<K, V, M: Default, const D: usize> Slot<K, V, M, D> {
    fn vacant(next: Option<NodeIndex>) -> Self {
        Self {
            l: next,
            r: None,
            meta: M::default(),
            offset: [0; D],
            entry: None,
        }
    }
}

/// Node storage for one tree.
///
/// `M` is the balance metadata of the strategy and `D` the number of offset
/// dimensions carried by each node.
#[derive(Clone, Debug)]
pub struct Arena<K, V, M, const D: usize> {
    slots: Vec<Slot<K, V, M, D>>,
    free: Option<NodeIndex>,
    free_count: u32,
    mode: AllocationMode,
}

impl<K, V, M, const D: usize> Arena<K, V, M, D>
where
    M: Copy + Default,
{
    pub fn new(capacity: u32, mode: AllocationMode) -> Result<Self> {
        if mode == AllocationMode::DynamicDiscard {
            return Err(Error::Unsupported(
                "DynamicDiscard allocation is not available for array storage",
            ));
        }
        let mut arena = Self {
            slots: Vec::new(),
            free: None,
            free_count: 0,
            mode,
        };
        arena.ensure_free(capacity)?;
        Ok(arena)
    }

    pub fn mode(&self) -> AllocationMode {
        self.mode
    }

    /// Total number of slots, live and free.
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn free_count(&self) -> u32 {
        self.free_count
    }

    /// Append `n` trailing slots to the free list.
    pub fn ensure_free(&mut self, n: u32) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        let len = self.slots.len() as u64;
        let new_len = len + u64::from(n);
        if new_len > u64::from(u32::MAX) {
            return Err(Error::OutOfMemory);
        }
        self.slots
            .try_reserve_exact(n as usize)
            .map_err(|_| Error::OutOfMemory)?;

        // New slots are chained in ascending order, ending at the old head.
        let first = len as u32;
        let last = (new_len - 1) as u32;
        for i in first..last {
            self.slots.push(Slot::vacant(Some(i + 1)));
        }
        self.slots.push(Slot::vacant(self.free));
        self.free = Some(first);
        self.free_count += n;
        debug!("arena grew from {len} to {new_len} slots");
        Ok(())
    }

    /// Take a slot off the free list, growing the pool when the mode allows it.
    pub(crate) fn allocate(&mut self) -> Result<NodeIndex> {
        if self.free.is_none() {
            if self.mode == AllocationMode::PreallocatedFixed {
                warn!(
                    "fixed arena exhausted at {} slots",
                    self.slots.len()
                );
                return Err(Error::OutOfMemory);
            }
            let len = self.slots.len() as u32;
            let target = len.saturating_mul(2).max(1);
            if target == len {
                return Err(Error::OutOfMemory);
            }
            self.ensure_free(target - len)?;
        }
        let Some(idx) = self.free else {
            return Err(Error::OutOfMemory);
        };
        let slot = &mut self.slots[idx as usize];
        self.free = slot.l;
        slot.l = None;
        slot.r = None;
        slot.meta = M::default();
        slot.offset = [0; D];
        self.free_count -= 1;
        Ok(idx)
    }

    pub(crate) fn fill(&mut self, idx: NodeIndex, key: K, value: V) {
        self.slots[idx as usize].entry = Some((key, value));
    }

    /// Return a slot to the free list, handing back whatever it held.
    pub(crate) fn free(&mut self, idx: NodeIndex) -> Option<(K, V)> {
        let next = self.free;
        let slot = &mut self.slots[idx as usize];
        let entry = slot.entry.take();
        *slot = Slot::vacant(next);
        self.free = Some(idx);
        self.free_count += 1;
        entry
    }

    /// Free every slot while keeping the pool's size.
    pub(crate) fn clear(&mut self) {
        let len = self.slots.len() as u32;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let i = i as u32;
            *slot = Slot::vacant(if i + 1 < len { Some(i + 1) } else { None });
        }
        self.free = if len > 0 { Some(0) } else { None };
        self.free_count = len;
    }

    /// Walk the free list; used by validation.
    pub(crate) fn free_list_len(&self) -> Option<u32> {
        let mut n = 0u32;
        let mut curr = self.free;
        while let Some(i) = curr {
            n += 1;
            if n > self.capacity() {
                return None;
            }
            curr = self.slots[i as usize].l;
        }
        Some(n)
    }
}

impl<K, V, M, const D: usize> Arena<K, V, M, D> {
    #[inline]
    pub(crate) fn l(&self, i: NodeIndex) -> Option<NodeIndex> {
        self.slots[i as usize].l
    }

    #[inline]
    pub(crate) fn r(&self, i: NodeIndex) -> Option<NodeIndex> {
        self.slots[i as usize].r
    }

    #[inline]
    pub(crate) fn set_l(&mut self, i: NodeIndex, v: Option<NodeIndex>) {
        self.slots[i as usize].l = v;
    }

    #[inline]
    pub(crate) fn set_r(&mut self, i: NodeIndex, v: Option<NodeIndex>) {
        self.slots[i as usize].r = v;
    }

    #[inline]
    pub(crate) fn offset(&self, i: NodeIndex) -> [i32; D] {
        self.slots[i as usize].offset
    }

    #[inline]
    pub(crate) fn set_offset(&mut self, i: NodeIndex, v: [i32; D]) {
        self.slots[i as usize].offset = v;
    }

    #[inline]
    pub(crate) fn meta(&self, i: NodeIndex) -> &M {
        &self.slots[i as usize].meta
    }

    #[inline]
    pub(crate) fn set_meta(&mut self, i: NodeIndex, v: M) {
        self.slots[i as usize].meta = v;
    }

    pub(crate) fn is_live(&self, i: NodeIndex) -> bool {
        self.slots
            .get(i as usize)
            .is_some_and(|slot| slot.entry.is_some())
    }

    #[inline]
    pub(crate) fn key(&self, i: NodeIndex) -> &K {
        let (k, _) = self.slots[i as usize]
            .entry
            .as_ref()
            .expect("linked slot is live");
        k
    }

    #[inline]
    pub(crate) fn value(&self, i: NodeIndex) -> &V {
        let (_, v) = self.slots[i as usize]
            .entry
            .as_ref()
            .expect("linked slot is live");
        v
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, i: NodeIndex) -> &mut V {
        let (_, v) = self.slots[i as usize]
            .entry
            .as_mut()
            .expect("linked slot is live");
        v
    }
}
