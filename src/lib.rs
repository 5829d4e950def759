//! A skiplist is a way of storing elements in such a way that elements can be
//! efficiently accessed, inserted and removed, all in `O(log(n))` on average.
//!
//! Conceptually, a skiplist resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` has references to nodes further down the list,
//! allowing the algorithm to effectively skip ahead. Each `<head>` is an entry
//! slot: the first node of its level.
//!
//! [`SkipMap`] is an ordered map built this way. Its nodes are kept in an arena
//! and link to each other by index, so the map owns every node outright and no
//! `unsafe` code is involved. The height of each node is drawn at random by a
//! [`LevelGenerator`][level_generator::LevelGenerator]; no rebalancing ever
//! takes place.
//!
//! ```
//! use skiplist_map::{SkipMap, SkipMapError};
//!
//! let mut map = SkipMap::new();
//! for (k, v) in [(5, "e"), (1, "a"), (3, "c"), (2, "b"), (4, "d")] {
//!     map.set(k, v)?;
//! }
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
//!
//! assert_eq!(map.remove(&3)?, "c");
//! assert_eq!(map.get(&3), Err(SkipMapError::NotFound));
//! assert_eq!(map.len(), 4);
//! # Ok::<(), SkipMapError>(())
//! ```
//!
//! Iterators borrow the map, so it cannot be modified while one of them is
//! alive. Each call to [`SkipMap::iter`] starts a fresh pass from the smallest
//! key.
//!
//! The ordering function **must** be well-behaved. Specifically, given some
//! ordering function `f(a, b)`, it must satisfy the following properties:
//!
//! - Be well defined: `f(a, b)` should always return the same value
//! - Be anti-symmetric: `f(a, b) == Greater` iff `f(b, a) == Less` and `f(a, b)
//!   == Equal == f(b, a)`.
//! - Be transitive: If `f(a, b) == Greater` and `f(b, c) == Greater` then `f(a,
//!   c) == Greater`.
//!
//! **Failure to satisfy these properties leaves entries unreachable or out of
//! order.**

mod error;
pub mod level_generator;
mod skipmap;
mod skipnode;

pub use error::SkipMapError;
pub use skipmap::{IntoIter, Iter, Keys, Range, SkipMap, Values};
