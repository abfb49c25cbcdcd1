use std::cmp::Ordering;

use crate::avl::Avl;
use crate::error::{Error, Result};
use crate::iter::{FastCursor, RobustCursor};
use crate::tree::{Found, HeightBalanced, InsertMode, Nearest, Strategy, Tree, TreeOptions};

use super::positive;

/// Which of the two sequences a position refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    X,
    Y,
}

impl Side {
    #[inline]
    fn dim(self) -> usize {
        match self {
            Side::X => 0,
            Side::Y => 1,
        }
    }
}

/// A pair of ranges and their value.
#[derive(Debug, PartialEq, Eq)]
pub struct Range2Entry<'a, V> {
    pub x_start: i32,
    pub x_length: i32,
    pub y_start: i32,
    pub y_length: i32,
    pub value: &'a V,
}

impl<V> Clone for Range2Entry<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Range2Entry<'_, V> {}

impl<V> Range2Entry<'_, V> {
    pub fn start(&self, side: Side) -> i32 {
        match side {
            Side::X => self.x_start,
            Side::Y => self.y_start,
        }
    }

    pub fn length(&self, side: Side) -> i32 {
        match side {
            Side::X => self.x_length,
            Side::Y => self.y_length,
        }
    }
}

/// Elements spanning a range in each of two sequences at once.
///
/// Both sequences are partitioned in the same element order, so an element
/// can be addressed by its start on either side. Changing a length on one
/// side moves every later element on that side only.
pub struct Range2Map<V, S = Avl>
where
    S: Strategy,
{
    tree: Tree<(), V, S, 2>,
}

/// Range pairs without values.
pub type Range2List<S = Avl> = Range2Map<(), S>;

impl<V, S: Strategy> Default for Range2Map<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

fn at(start: i32, side: Side) -> impl FnMut(&(), &[i32; 2]) -> Ordering {
    let d = side.dim();
    move |_, s| start.cmp(&s[d])
}

impl<V, S: Strategy> Range2Map<V, S> {
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    pub fn with_options(options: TreeOptions) -> Result<Self> {
        Ok(Self {
            tree: Tree::with_options(options)?,
        })
    }

    fn entry(&self, found: Found<2>) -> Range2Entry<'_, V> {
        Range2Entry {
            x_start: found.start[0],
            x_length: found.length[0],
            y_start: found.start[1],
            y_length: found.length[1],
            value: self.tree.value(found.index),
        }
    }

    /// Insert an element in front of the one starting at `start` on `side`,
    /// or at the end when `start` is that side's extent.
    ///
    /// `Ok(false)` when `start` falls inside an element.
    pub fn try_insert(
        &mut self,
        start: i32,
        side: Side,
        x_length: i32,
        y_length: i32,
        value: V,
    ) -> Result<bool> {
        positive(x_length, "x length must be positive")?;
        positive(y_length, "y length must be positive")?;
        let extent = self.extent(side);
        if start < 0 || start > extent {
            return Err(Error::OutOfRange("start is outside the map"));
        }
        if start < extent && self.tree.find(at(start, side)).is_none() {
            return Ok(false);
        }
        let d = side.dim();
        self.tree.insert_with(
            |_, _, s| {
                if start <= s[d] {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            },
            (),
            value,
            [x_length, y_length],
            InsertMode::Add,
        )
    }

    pub fn insert(
        &mut self,
        start: i32,
        side: Side,
        x_length: i32,
        y_length: i32,
        value: V,
    ) -> Result<()> {
        if self.try_insert(start, side, x_length, y_length, value)? {
            Ok(())
        } else {
            Err(Error::AlreadyExists)
        }
    }

    pub fn try_delete(&mut self, start: i32, side: Side) -> Option<V> {
        let (_, value, _) = self.tree.remove_with(at(start, side))?;
        Some(value)
    }

    pub fn delete(&mut self, start: i32, side: Side) -> Result<V> {
        self.try_delete(start, side).ok_or(Error::NotFound)
    }

    pub fn try_get(&mut self, start: i32, side: Side) -> Option<Range2Entry<'_, V>> {
        let found = self.tree.find(at(start, side))?;
        Some(self.entry(found))
    }

    pub fn try_get_value(&mut self, start: i32, side: Side) -> Option<&V> {
        let found = self.tree.find(at(start, side))?;
        Some(self.tree.value(found.index))
    }

    pub fn try_set_value(&mut self, start: i32, side: Side, value: V) -> bool {
        match self.tree.find(at(start, side)) {
            Some(found) => {
                *self.tree.value_mut(found.index) = value;
                true
            }
            None => false,
        }
    }

    /// Resize both ranges of the element starting at `start` on `side`.
    pub fn try_set_length(
        &mut self,
        start: i32,
        side: Side,
        x_length: i32,
        y_length: i32,
    ) -> Result<bool> {
        positive(x_length, "x length must be positive")?;
        positive(y_length, "y length must be positive")?;
        self.tree
            .resize_with(at(start, side), [x_length, y_length])
    }

    /// The element whose range on `side` contains `position`.
    pub fn try_get_containing(&mut self, position: i32, side: Side) -> Option<Range2Entry<'_, V>> {
        let found = self.tree.covering(position, side.dim())?;
        Some(self.entry(found))
    }

    fn nearest(&mut self, position: i32, side: Side, kind: Nearest) -> Option<Range2Entry<'_, V>> {
        let found = self.tree.nearest(at(position, side), kind)?;
        Some(self.entry(found))
    }

    pub fn nearest_less(&mut self, position: i32, side: Side) -> Option<Range2Entry<'_, V>> {
        self.nearest(position, side, Nearest::Less)
    }

    pub fn nearest_less_or_equal(&mut self, position: i32, side: Side) -> Option<Range2Entry<'_, V>> {
        self.nearest(position, side, Nearest::LessOrEqual)
    }

    pub fn nearest_greater(&mut self, position: i32, side: Side) -> Option<Range2Entry<'_, V>> {
        self.nearest(position, side, Nearest::Greater)
    }

    pub fn nearest_greater_or_equal(
        &mut self,
        position: i32,
        side: Side,
    ) -> Option<Range2Entry<'_, V>> {
        self.nearest(position, side, Nearest::GreaterOrEqual)
    }

    pub fn first(&self) -> Option<Range2Entry<'_, V>> {
        self.tree.first().map(|found| self.entry(found))
    }

    pub fn last(&self) -> Option<Range2Entry<'_, V>> {
        self.tree.last().map(|found| self.entry(found))
    }

    pub fn extent(&self, side: Side) -> i32 {
        self.tree.extent()[side.dim()]
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

    pub fn iter(&self) -> impl Iterator<Item = Range2Entry<'_, V>> + '_ {
        self.tree.iter().map(|e| Range2Entry {
            x_start: e.start[0],
            x_length: e.length[0],
            y_start: e.start[1],
            y_length: e.length[1],
            value: e.value,
        })
    }

    /// Step a cursor that tracks X starts.
    pub fn robust_next(&mut self, cursor: &mut RobustCursor<i32>) -> Option<Range2Entry<'_, V>> {
        let tree = &mut self.tree;
        let found = cursor.move_next_with(|last| {
            let found = match last {
                None => tree.first(),
                Some(&last) => tree.nearest(at(last, Side::X), Nearest::Greater),
            }?;
            Some((found.start[0], found))
        })?;
        Some(self.entry(found))
    }

    pub fn tree(&self) -> &Tree<(), V, S, 2> {
        &self.tree
    }

    pub fn assert_valid(&self) -> Result<()> {
        self.tree.validate()
    }
}

impl<V, S: HeightBalanced> Range2Map<V, S> {
    pub fn fast_cursor(&self) -> FastCursor<2> {
        FastCursor::new(&self.tree)
    }

    pub fn fast_next(&self, cursor: &mut FastCursor<2>) -> Result<Option<Range2Entry<'_, V>>> {
        if !cursor.move_next(&self.tree)? {
            return Ok(None);
        }
        Ok(cursor.current(&self.tree)?.map(|found| self.entry(found)))
    }
}
