use std::cmp::Ordering;

use crate::avl::Avl;
use crate::error::{Error, Result};
use crate::iter::{FastCursor, RobustCursor};
use crate::tree::{HeightBalanced, InsertMode, Nearest, Strategy, Tree, TreeOptions};

use super::{default_comparator, Comparator};

/// Ordered map with a pluggable comparator and balancing strategy.
pub struct OrderedMap<K, V, S = Avl, C = Comparator<K>>
where
    S: Strategy,
    C: Fn(&K, &K) -> Ordering,
{
    tree: Tree<K, V, S, 0>,
    cmp: C,
}

/// Ordered set: an [`OrderedMap`] without values.
pub type OrderedSet<K, S = Avl, C = Comparator<K>> = OrderedMap<K, (), S, C>;

impl<K: Ord, V, S: Strategy> OrderedMap<K, V, S> {
    pub fn new() -> Self {
        Self::with_comparator(default_comparator::<K>)
    }

    pub fn with_options(options: TreeOptions) -> Result<Self> {
        Self::with_comparator_and_options(default_comparator::<K>, options)
    }
}

impl<K: Ord, V, S: Strategy> Default for OrderedMap<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, C> OrderedMap<K, V, S, C>
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

    fn insert(&mut self, key: K, value: V, mode: InsertMode) -> Result<bool> {
        let cmp = &self.cmp;
        self.tree
            .insert_with(|new, k, _| cmp(new, k), key, value, [], mode)
    }

    /// Add `key` unless it is present. `Ok(false)` when it is.
    pub fn try_add(&mut self, key: K, value: V) -> Result<bool> {
        self.insert(key, value, InsertMode::Add)
    }

    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        if self.try_add(key, value)? {
            Ok(())
        } else {
            Err(Error::AlreadyExists)
        }
    }

    /// Insert or overwrite.
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        self.insert(key, value, InsertMode::Upsert).map(|_| ())
    }

    pub fn try_remove(&mut self, key: &K) -> Option<V> {
        let cmp = &self.cmp;
        let (_, value, _) = self.tree.remove_with(|k, _| cmp(key, k))?;
        Some(value)
    }

    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.try_remove(key).ok_or(Error::NotFound)
    }

    pub fn try_get_value(&mut self, key: &K) -> Option<&V> {
        let cmp = &self.cmp;
        let found = self.tree.find(|k, _| cmp(key, k))?;
        Some(self.tree.value(found.index))
    }

    pub fn get_value(&mut self, key: &K) -> Result<&V> {
        self.try_get_value(key).ok_or(Error::NotFound)
    }

    pub fn try_get_value_mut(&mut self, key: &K) -> Option<&mut V> {
        let cmp = &self.cmp;
        let found = self.tree.find(|k, _| cmp(key, k))?;
        Some(self.tree.value_mut(found.index))
    }

    /// Replace the value of an existing key. `false` when absent.
    pub fn try_set_value(&mut self, key: &K, value: V) -> bool {
        match self.try_get_value_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn set_value(&mut self, key: &K, value: V) -> Result<()> {
        if self.try_set_value(key, value) {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    pub fn contains_key(&mut self, key: &K) -> bool {
        self.try_get_value(key).is_some()
    }

    fn nearest(&mut self, key: &K, kind: Nearest) -> Option<(&K, &V)> {
        let cmp = &self.cmp;
        let found = self.tree.nearest(|k, _| cmp(key, k), kind)?;
        Some((self.tree.key(found.index), self.tree.value(found.index)))
    }

    pub fn nearest_less(&mut self, key: &K) -> Option<(&K, &V)> {
        self.nearest(key, Nearest::Less)
    }

    pub fn nearest_less_or_equal(&mut self, key: &K) -> Option<(&K, &V)> {
        self.nearest(key, Nearest::LessOrEqual)
    }

    pub fn nearest_greater(&mut self, key: &K) -> Option<(&K, &V)> {
        self.nearest(key, Nearest::Greater)
    }

    pub fn nearest_greater_or_equal(&mut self, key: &K) -> Option<(&K, &V)> {
        self.nearest(key, Nearest::GreaterOrEqual)
    }

    pub fn least(&self) -> Option<(&K, &V)> {
        let found = self.tree.first()?;
        Some((self.tree.key(found.index), self.tree.value(found.index)))
    }

    pub fn greatest(&self) -> Option<(&K, &V)> {
        let found = self.tree.last()?;
        Some((self.tree.key(found.index), self.tree.value(found.index)))
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

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.tree.iter().map(|e| (e.key, e.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.tree.iter().map(|e| e.key)
    }

    /// Next entry after the cursor's last key, found by query.
    pub fn robust_next(&mut self, cursor: &mut RobustCursor<K>) -> Option<(&K, &V)>
    where
        K: Clone,
    {
        let Self { tree, cmp } = self;
        let index = cursor.move_next_with(|last| {
            let found = match last {
                None => tree.first(),
                Some(last) => tree.nearest(|k, _| cmp(last, k), Nearest::Greater),
            }?;
            Some((tree.key(found.index).clone(), found.index))
        })?;
        Some((self.tree.key(index), self.tree.value(index)))
    }

    /// The engine underneath, for inspection and engine-level cursors.
    pub fn tree(&self) -> &Tree<K, V, S, 0> {
        &self.tree
    }

    pub fn assert_valid(&self) -> Result<()> {
        self.tree.validate_ordered(&self.cmp)
    }
}

impl<K, V, S, C> OrderedMap<K, V, S, C>
where
    S: HeightBalanced,
    C: Fn(&K, &K) -> Ordering,
{
    pub fn fast_cursor(&self) -> FastCursor<0> {
        FastCursor::new(&self.tree)
    }

    /// Step `cursor`; fails with [`Error::InvalidState`] if the map changed
    /// since the cursor was created.
    pub fn fast_next(&self, cursor: &mut FastCursor<0>) -> Result<Option<(&K, &V)>> {
        if !cursor.move_next(&self.tree)? {
            return Ok(None);
        }
        Ok(cursor
            .current(&self.tree)?
            .map(|found| (self.tree.key(found.index), self.tree.value(found.index))))
    }
}
