//! Arena-backed balanced search trees with relative-offset augmentation.
//!
//! One generic engine, [`Tree`], stores nodes in a flat [`Arena`] addressed by
//! `u32` indices. Each node may carry offsets in up to two dimensions, kept
//! relative to its parent, so the absolute start of any element is the sum
//! of offsets along its root path. That makes rank lookups and length
//! changes of variable-length ranges O(log n).
//!
//! Balancing is pluggable through [`Strategy`]:
//!
//! | Strategy | Module | Metadata | Lookups restructure |
//! |----------|--------|----------|---------------------|
//! | [`Avl`] | [`avl`] | balance factor | no |
//! | [`RedBlack`] | [`red_black`] | color | no |
//! | [`Splay`] | [`splay`] | none | yes |
//!
//! The typed maps in [`maps`] cover the common shapes:
//!
//! - [`OrderedMap`] / [`OrderedSet`]: plain ordered map (no offsets).
//! - [`RankMap`] / [`MultiRankMap`]: keys with ranks (a key may span several).
//! - [`RangeMap`] / [`RangeList`]: contiguous ranges addressed by start.
//! - [`Range2Map`] / [`Range2List`]: ranges tracked in two sequences at once.
//!
//! ```
//! use range_forest::{RangeMap, Avl};
//!
//! let mut ranges: RangeMap<&str, Avl> = RangeMap::new();
//! ranges.insert(0, 5, "a").unwrap();
//! ranges.insert(5, 3, "b").unwrap();
//! ranges.set_length(0, 10).unwrap();
//! assert_eq!(ranges.nearest_greater(0).map(|e| e.start), Some(10));
//! assert_eq!(ranges.extent(), 13);
//! ```

pub mod arena;
pub mod avl;
pub mod error;
mod inspect;
pub mod iter;
pub mod maps;
mod offset;
mod query;
pub mod red_black;
pub mod splay;
pub mod tree;

pub use arena::{AllocationMode, Arena, NodeIndex};
pub use avl::Avl;
pub use error::{Error, Result};
pub use iter::{Entry, FastCursor, Iter, RobustCursor};
pub use maps::{
    Comparator, MultiRankMap, OrderedMap, OrderedSet, Range2Entry, Range2List, Range2Map,
    RangeEntry, RangeList, RangeMap, RankEntry, RankMap, Side,
};
pub use red_black::{Color, RedBlack};
pub use splay::Splay;
pub use tree::{Found, HeightBalanced, InsertMode, Nearest, Strategy, Tree, TreeOptions};

pub type AvlMap<K, V> = OrderedMap<K, V, Avl>;
pub type RedBlackMap<K, V> = OrderedMap<K, V, RedBlack>;
pub type SplayMap<K, V> = OrderedMap<K, V, Splay>;
pub type AvlRangeMap<V> = RangeMap<V, Avl>;
pub type RedBlackRangeMap<V> = RangeMap<V, RedBlack>;
pub type SplayRangeMap<V> = RangeMap<V, Splay>;
