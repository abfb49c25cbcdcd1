use std::cmp::Ordering;

use crate::avl::Avl;
use crate::error::{Error, Result};
use crate::iter::{FastCursor, RobustCursor};
use crate::tree::{Found, HeightBalanced, InsertMode, Nearest, Strategy, Tree, TreeOptions};

use super::positive;

/// A range and its value.
#[derive(Debug, PartialEq, Eq)]
pub struct RangeEntry<'a, V> {
    pub start: i32,
    pub length: i32,
    pub value: &'a V,
}

impl<V> Clone for RangeEntry<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for RangeEntry<'_, V> {}

impl<V> RangeEntry<'_, V> {
    /// One past the last position of the range.
    pub fn end(&self) -> i32 {
        self.start + self.length
    }
}

/// Contiguous ranges partitioning `[0, extent)`, each carrying a value.
///
/// Ranges are addressed by their start. Inserting, removing or resizing a
/// range moves every later range, in O(log n).
pub struct RangeMap<V, S = Avl>
where
    S: Strategy,
{
    tree: Tree<(), V, S, 1>,
}

/// Ranges without values.
pub type RangeList<S = Avl> = RangeMap<(), S>;

impl<V, S: Strategy> Default for RangeMap<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Navigation toward the range starting exactly at `start`.
fn at(start: i32) -> impl FnMut(&(), &[i32; 1]) -> Ordering {
    move |_, s| start.cmp(&s[0])
}

impl<V, S: Strategy> RangeMap<V, S> {
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    pub fn with_options(options: TreeOptions) -> Result<Self> {
        Ok(Self {
            tree: Tree::with_options(options)?,
        })
    }

    fn entry(&self, found: Found<1>) -> RangeEntry<'_, V> {
        RangeEntry {
            start: found.start[0],
            length: found.length[0],
            value: self.tree.value(found.index),
        }
    }

    /// Insert a range of `length` at `start`, which must be the start of an
    /// existing range (the new one goes in front of it) or the extent.
    ///
    /// `Ok(false)` when `start` falls inside a range.
    pub fn try_insert(&mut self, start: i32, length: i32, value: V) -> Result<bool> {
        positive(length, "length must be positive")?;
        if start < 0 || start > self.extent() {
            return Err(Error::OutOfRange("start is outside the map"));
        }
        if start < self.extent() && self.tree.find(at(start)).is_none() {
            return Ok(false);
        }
        self.tree.insert_with(
            |_, _, s| {
                if start <= s[0] {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            },
            (),
            value,
            [length],
            InsertMode::Add,
        )
    }

    pub fn insert(&mut self, start: i32, length: i32, value: V) -> Result<()> {
        if self.try_insert(start, length, value)? {
            Ok(())
        } else {
            Err(Error::AlreadyExists)
        }
    }

    /// Remove the range starting at `start`; later ranges move back.
    pub fn try_delete(&mut self, start: i32) -> Option<V> {
        let (_, value, _) = self.tree.remove_with(at(start))?;
        Some(value)
    }

    pub fn delete(&mut self, start: i32) -> Result<V> {
        self.try_delete(start).ok_or(Error::NotFound)
    }

    pub fn try_get_value(&mut self, start: i32) -> Option<&V> {
        let found = self.tree.find(at(start))?;
        Some(self.tree.value(found.index))
    }

    pub fn get_value(&mut self, start: i32) -> Result<&V> {
        self.try_get_value(start).ok_or(Error::NotFound)
    }

    pub fn try_get_length(&mut self, start: i32) -> Option<i32> {
        self.tree.find(at(start)).map(|found| found.length[0])
    }

    pub fn get_length(&mut self, start: i32) -> Result<i32> {
        self.try_get_length(start).ok_or(Error::NotFound)
    }

    /// Length and value of the range starting at `start`.
    pub fn try_get(&mut self, start: i32) -> Option<(i32, &V)> {
        let found = self.tree.find(at(start))?;
        Some((found.length[0], self.tree.value(found.index)))
    }

    pub fn try_set_value(&mut self, start: i32, value: V) -> bool {
        match self.tree.find(at(start)) {
            Some(found) => {
                *self.tree.value_mut(found.index) = value;
                true
            }
            None => false,
        }
    }

    pub fn set_value(&mut self, start: i32, value: V) -> Result<()> {
        if self.try_set_value(start, value) {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// Resize the range starting at `start`; later ranges move by the
    /// difference. `Ok(false)` when no range starts there.
    pub fn try_set_length(&mut self, start: i32, length: i32) -> Result<bool> {
        positive(length, "length must be positive")?;
        self.tree.resize_with(at(start), [length])
    }

    pub fn set_length(&mut self, start: i32, length: i32) -> Result<()> {
        if self.try_set_length(start, length)? {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// Change the length of the range at `start` by `delta` and return the
    /// new length. A length of zero removes the range.
    pub fn adjust_length(&mut self, start: i32, delta: i32) -> Result<i32> {
        let found = self.tree.find(at(start)).ok_or(Error::NotFound)?;
        let length = found.length[0].checked_add(delta).ok_or(Error::Overflow)?;
        match length.cmp(&0) {
            Ordering::Less => Err(Error::OutOfRange("length would become negative")),
            Ordering::Equal => {
                self.try_delete(start);
                Ok(0)
            }
            Ordering::Greater => {
                self.try_set_length(start, length)?;
                Ok(length)
            }
        }
    }

    /// The range containing `position`.
    pub fn try_get_containing(&mut self, position: i32) -> Option<RangeEntry<'_, V>> {
        let found = self.tree.covering(position, 0)?;
        Some(self.entry(found))
    }

    fn nearest(&mut self, position: i32, kind: Nearest) -> Option<RangeEntry<'_, V>> {
        let found = self.tree.nearest(at(position), kind)?;
        Some(self.entry(found))
    }

    /// The last range starting before `position`.
    pub fn nearest_less(&mut self, position: i32) -> Option<RangeEntry<'_, V>> {
        self.nearest(position, Nearest::Less)
    }

    pub fn nearest_less_or_equal(&mut self, position: i32) -> Option<RangeEntry<'_, V>> {
        self.nearest(position, Nearest::LessOrEqual)
    }

    /// The first range starting after `position`.
    pub fn nearest_greater(&mut self, position: i32) -> Option<RangeEntry<'_, V>> {
        self.nearest(position, Nearest::Greater)
    }

    pub fn nearest_greater_or_equal(&mut self, position: i32) -> Option<RangeEntry<'_, V>> {
        self.nearest(position, Nearest::GreaterOrEqual)
    }

    pub fn first(&self) -> Option<RangeEntry<'_, V>> {
        self.tree.first().map(|found| self.entry(found))
    }

    pub fn last(&self) -> Option<RangeEntry<'_, V>> {
        self.tree.last().map(|found| self.entry(found))
    }

    /// Sum of all lengths.
    pub fn extent(&self) -> i32 {
        self.tree.extent()[0]
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

    pub fn iter(&self) -> impl Iterator<Item = RangeEntry<'_, V>> + '_ {
        self.tree.iter().map(|e| RangeEntry {
            start: e.start[0],
            length: e.length[0],
            value: e.value,
        })
    }

    pub fn robust_next(&mut self, cursor: &mut RobustCursor<i32>) -> Option<RangeEntry<'_, V>> {
        let tree = &mut self.tree;
        let found = cursor.move_next_with(|last| {
            let found = match last {
                None => tree.first(),
                Some(&last) => tree.nearest(at(last), Nearest::Greater),
            }?;
            Some((found.start[0], found))
        })?;
        Some(self.entry(found))
    }

    pub fn tree(&self) -> &Tree<(), V, S, 1> {
        &self.tree
    }

    pub fn assert_valid(&self) -> Result<()> {
        self.tree.validate()
    }
}

impl<V, S: HeightBalanced> RangeMap<V, S> {
    pub fn fast_cursor(&self) -> FastCursor<1> {
        FastCursor::new(&self.tree)
    }

    pub fn fast_next(&self, cursor: &mut FastCursor<1>) -> Result<Option<RangeEntry<'_, V>>> {
        if !cursor.move_next(&self.tree)? {
            return Ok(None);
        }
        Ok(cursor.current(&self.tree)?.map(|found| self.entry(found)))
    }
}
