//! Typed maps over the generic [`Tree`](crate::tree::Tree).
//!
//! Lookups take `&mut self` because a splay-backed map restructures itself on
//! every access. `try_*` methods report absence through `bool`/`Option`; the
//! plain forms turn it into an [`Error`](crate::Error).

use std::cmp::Ordering;

mod ordered_map;
mod range2_map;
mod range_map;
mod rank_map;

pub use ordered_map::{OrderedMap, OrderedSet};
pub use range2_map::{Range2Entry, Range2List, Range2Map, Side};
pub use range_map::{RangeEntry, RangeList, RangeMap};
pub use rank_map::{MultiRankMap, RankEntry, RankMap};

/// Comparator used when none is supplied.
pub type Comparator<K> = fn(&K, &K) -> Ordering;

pub(crate) fn default_comparator<K: Ord>(a: &K, b: &K) -> Ordering {
    a.cmp(b)
}

#[inline]
pub(crate) fn positive(n: i32, what: &'static str) -> crate::Result<()> {
    if n <= 0 {
        return Err(crate::Error::OutOfRange(what));
    }
    Ok(())
}
