use std::cmp::Ordering;

use crate::avl::Avl;
use crate::error::{Error, Result};
use crate::iter::{FastCursor, RobustCursor};
use crate::tree::{Found, HeightBalanced, InsertMode, Nearest, Strategy, Tree, TreeOptions};

use super::{default_comparator, positive, Comparator};

/// A key with the block of ranks it occupies.
#[derive(Debug, PartialEq, Eq)]
pub struct RankEntry<'a, K, V> {
    pub key: &'a K,
    pub value: &'a V,
    /// First rank of the key's block.
    pub rank: i32,
    /// Number of ranks in the block.
    pub count: i32,
}

impl<K, V> Clone for RankEntry<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for RankEntry<'_, K, V> {}

/// Ordered map where each key occupies `count` consecutive ranks.
///
/// Ranks start at 0 and are contiguous: the rank of a key is the sum of the
/// counts of all smaller keys. Rank lookups, inserts and removals are
/// O(log n).
pub struct MultiRankMap<K, V, S = Avl, C = Comparator<K>>
where
    S: Strategy,
    C: Fn(&K, &K) -> Ordering,
{
    tree: Tree<K, V, S, 1>,
    cmp: C,
}

impl<K: Ord, V, S: Strategy> MultiRankMap<K, V, S> {
    pub fn new() -> Self {
        Self::with_comparator(default_comparator::<K>)
    }

    pub fn with_options(options: TreeOptions) -> Result<Self> {
        Self::with_comparator_and_options(default_comparator::<K>, options)
    }
}

impl<K: Ord, V, S: Strategy> Default for MultiRankMap<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, C> MultiRankMap<K, V, S, C>
where
    S: Strategy,
    C: Fn(&K, &K) -> Ordering,
{
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            tree: Tree::new(),
            cmp,
        }
    }

    pub fn with_comparator_and_options(cmp: C, options: TreeOptions) -> Result<Self> {
        Ok(Self {
            tree: Tree::with_options(options)?,
            cmp,
        })
    }

    fn entry(&self, found: Found<1>) -> RankEntry<'_, K, V> {
        RankEntry {
            key: self.tree.key(found.index),
            value: self.tree.value(found.index),
            rank: found.start[0],
            count: found.length[0],
        }
    }

    fn find(&mut self, key: &K) -> Option<Found<1>> {
        let cmp = &self.cmp;
        self.tree.find(|k, _| cmp(key, k))
    }

    /// Add `key` with a block of `count` ranks. `Ok(false)` if present.
    pub fn try_add(&mut self, key: K, value: V, count: i32) -> Result<bool> {
        positive(count, "count must be positive")?;
        let cmp = &self.cmp;
        self.tree
            .insert_with(|new, k, _| cmp(new, k), key, value, [count], InsertMode::Add)
    }

    pub fn add(&mut self, key: K, value: V, count: i32) -> Result<()> {
        if self.try_add(key, value, count)? {
            Ok(())
        } else {
            Err(Error::AlreadyExists)
        }
    }

    /// Remove `key`; every greater key moves down by its count.
    pub fn try_remove(&mut self, key: &K) -> Option<V> {
        let cmp = &self.cmp;
        let (_, value, _) = self.tree.remove_with(|k, _| cmp(key, k))?;
        Some(value)
    }

    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.try_remove(key).ok_or(Error::NotFound)
    }

    pub fn try_get_value(&mut self, key: &K) -> Option<&V> {
        let found = self.find(key)?;
        Some(self.tree.value(found.index))
    }

    pub fn try_set_value(&mut self, key: &K, value: V) -> bool {
        match self.find(key) {
            Some(found) => {
                *self.tree.value_mut(found.index) = value;
                true
            }
            None => false,
        }
    }

    /// Value, first rank and count of `key`.
    pub fn try_get(&mut self, key: &K) -> Option<(&V, i32, i32)> {
        let found = self.find(key)?;
        Some((self.tree.value(found.index), found.start[0], found.length[0]))
    }

    pub fn contains_key(&mut self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// The key whose block contains `rank`.
    pub fn try_get_key_by_rank(&mut self, rank: i32) -> Option<&K> {
        let found = self.tree.covering(rank, 0)?;
        Some(self.tree.key(found.index))
    }

    pub fn get_key_by_rank(&mut self, rank: i32) -> Result<&K> {
        self.try_get_key_by_rank(rank)
            .ok_or(Error::OutOfRange("rank is outside the map"))
    }

    /// Replace the count of `key`. `Ok(false)` when absent.
    pub fn try_set_count(&mut self, key: &K, count: i32) -> Result<bool> {
        positive(count, "count must be positive")?;
        let cmp = &self.cmp;
        self.tree.resize_with(|k, _| cmp(key, k), [count])
    }

    /// Change the count of `key` by `delta` and return the new count. A
    /// count of zero removes the key.
    pub fn adjust_count(&mut self, key: &K, delta: i32) -> Result<i32> {
        let found = self.find(key).ok_or(Error::NotFound)?;
        let count = found.length[0].checked_add(delta).ok_or(Error::Overflow)?;
        match count.cmp(&0) {
            Ordering::Less => Err(Error::OutOfRange("count would become negative")),
            Ordering::Equal => {
                self.try_remove(key);
                Ok(0)
            }
            Ordering::Greater => {
                self.try_set_count(key, count)?;
                Ok(count)
            }
        }
    }

    /// Total number of ranks: the sum of all counts.
    pub fn rank_count(&self) -> i32 {
        self.tree.extent()[0]
    }

    fn nearest(&mut self, key: &K, kind: Nearest) -> Option<RankEntry<'_, K, V>> {
        let cmp = &self.cmp;
        let found = self.tree.nearest(|k, _| cmp(key, k), kind)?;
        Some(self.entry(found))
    }

    pub fn nearest_less(&mut self, key: &K) -> Option<RankEntry<'_, K, V>> {
        self.nearest(key, Nearest::Less)
    }

    pub fn nearest_less_or_equal(&mut self, key: &K) -> Option<RankEntry<'_, K, V>> {
        self.nearest(key, Nearest::LessOrEqual)
    }

    pub fn nearest_greater(&mut self, key: &K) -> Option<RankEntry<'_, K, V>> {
        self.nearest(key, Nearest::Greater)
    }

    pub fn nearest_greater_or_equal(&mut self, key: &K) -> Option<RankEntry<'_, K, V>> {
        self.nearest(key, Nearest::GreaterOrEqual)
    }

    pub fn least(&self) -> Option<RankEntry<'_, K, V>> {
        self.tree.first().map(|found| self.entry(found))
    }

    pub fn greatest(&self) -> Option<RankEntry<'_, K, V>> {
        self.tree.last().map(|found| self.entry(found))
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = RankEntry<'_, K, V>> + '_ {
        self.tree.iter().map(|e| RankEntry {
            key: e.key,
            value: e.value,
            rank: e.start[0],
            count: e.length[0],
        })
    }

    pub fn robust_next(&mut self, cursor: &mut RobustCursor<K>) -> Option<RankEntry<'_, K, V>>
    where
        K: Clone,
    {
        let Self { tree, cmp } = self;
        let found = cursor.move_next_with(|last| {
            let found = match last {
                None => tree.first(),
                Some(last) => tree.nearest(|k, _| cmp(last, k), Nearest::Greater),
            }?;
            Some((tree.key(found.index).clone(), found))
        })?;
        Some(self.entry(found))
    }

    pub fn tree(&self) -> &Tree<K, V, S, 1> {
        &self.tree
    }

    pub fn assert_valid(&self) -> Result<()> {
        self.tree.validate_ordered(&self.cmp)
    }
}

impl<K, V, S, C> MultiRankMap<K, V, S, C>
where
    S: HeightBalanced,
    C: Fn(&K, &K) -> Ordering,
{
    pub fn fast_cursor(&self) -> FastCursor<1> {
        FastCursor::new(&self.tree)
    }

    pub fn fast_next(&self, cursor: &mut FastCursor<1>) -> Result<Option<RankEntry<'_, K, V>>> {
        if !cursor.move_next(&self.tree)? {
            return Ok(None);
        }
        Ok(cursor.current(&self.tree)?.map(|found| self.entry(found)))
    }
}

/// Ordered map where the rank of a key is the number of smaller keys.
pub struct RankMap<K, V, S = Avl, C = Comparator<K>>
where
    S: Strategy,
    C: Fn(&K, &K) -> Ordering,
{
    inner: MultiRankMap<K, V, S, C>,
}

impl<K: Ord, V, S: Strategy> RankMap<K, V, S> {
    pub fn new() -> Self {
        Self {
            inner: MultiRankMap::new(),
        }
    }

    pub fn with_options(options: TreeOptions) -> Result<Self> {
        Ok(Self {
            inner: MultiRankMap::with_options(options)?,
        })
    }
}

impl<K: Ord, V, S: Strategy> Default for RankMap<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, C> RankMap<K, V, S, C>
where
    S: Strategy,
    C: Fn(&K, &K) -> Ordering,
{
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            inner: MultiRankMap::with_comparator(cmp),
        }
    }

    pub fn with_comparator_and_options(cmp: C, options: TreeOptions) -> Result<Self> {
        Ok(Self {
            inner: MultiRankMap::with_comparator_and_options(cmp, options)?,
        })
    }

    pub fn try_add(&mut self, key: K, value: V) -> Result<bool> {
        self.inner.try_add(key, value, 1)
    }

    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        self.inner.add(key, value, 1)
    }

    pub fn try_remove(&mut self, key: &K) -> Option<V> {
        self.inner.try_remove(key)
    }

    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.inner.remove(key)
    }

    pub fn try_get_value(&mut self, key: &K) -> Option<&V> {
        self.inner.try_get_value(key)
    }

    pub fn try_set_value(&mut self, key: &K, value: V) -> bool {
        self.inner.try_set_value(key, value)
    }

    /// Value and rank of `key`.
    pub fn try_get(&mut self, key: &K) -> Option<(&V, i32)> {
        self.inner
            .try_get(key)
            .map(|(value, rank, _)| (value, rank))
    }

    pub fn contains_key(&mut self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn try_get_key_by_rank(&mut self, rank: i32) -> Option<&K> {
        self.inner.try_get_key_by_rank(rank)
    }

    pub fn get_key_by_rank(&mut self, rank: i32) -> Result<&K> {
        self.inner.get_key_by_rank(rank)
    }

    pub fn nearest_less(&mut self, key: &K) -> Option<RankEntry<'_, K, V>> {
        self.inner.nearest_less(key)
    }

    pub fn nearest_less_or_equal(&mut self, key: &K) -> Option<RankEntry<'_, K, V>> {
        self.inner.nearest_less_or_equal(key)
    }

    pub fn nearest_greater(&mut self, key: &K) -> Option<RankEntry<'_, K, V>> {
        self.inner.nearest_greater(key)
    }

    pub fn nearest_greater_or_equal(&mut self, key: &K) -> Option<RankEntry<'_, K, V>> {
        self.inner.nearest_greater_or_equal(key)
    }

    pub fn least(&self) -> Option<RankEntry<'_, K, V>> {
        self.inner.least()
    }

    pub fn greatest(&self) -> Option<RankEntry<'_, K, V>> {
        self.inner.greatest()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = RankEntry<'_, K, V>> + '_ {
        self.inner.iter()
    }

    pub fn robust_next(&mut self, cursor: &mut RobustCursor<K>) -> Option<RankEntry<'_, K, V>>
    where
        K: Clone,
    {
        self.inner.robust_next(cursor)
    }

    pub fn tree(&self) -> &Tree<K, V, S, 1> {
        self.inner.tree()
    }

    pub fn assert_valid(&self) -> Result<()> {
        self.inner.assert_valid()
    }
}

impl<K, V, S, C> RankMap<K, V, S, C>
where
    S: HeightBalanced,
    C: Fn(&K, &K) -> Ordering,
{
    pub fn fast_cursor(&self) -> FastCursor<1> {
        self.inner.fast_cursor()
    }

    pub fn fast_next(&self, cursor: &mut FastCursor<1>) -> Result<Option<RankEntry<'_, K, V>>> {
        self.inner.fast_next(cursor)
    }
}
