//! SkipMap stores key-value pairs, with the keys being unique and always
//! sorted.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    mem,
    ops::Bound,
};

use tracing::{debug, trace};

use crate::{
    error::SkipMapError,
    level_generator::{Geometric, LevelGenerator},
    skipnode::{Arena, NodeId, SkipNode, take_slot},
};

type Comparator<K> = Box<dyn Fn(&K, &K) -> Option<Ordering>>;

// ////////////////////////////////////////////////////////////////////////////
// SkipMap
// ////////////////////////////////////////////////////////////////////////////

/// The skipmap provides a way of storing element pairs such that the keys are
/// always sorted whilst at the same time providing an efficient way to access,
/// insert and remove entries.
///
/// Nodes live in an arena and refer to each other by index. The map keeps one
/// entry slot per active level, pointing at the first node of that level; level
/// 0 links every node in ascending key order and each higher level links a
/// random subset of the level below, as decided by the level generator `G`.
///
/// By default keys are ordered with [`PartialOrd::partial_cmp`]. A key which
/// cannot be ordered (such as `f64::NAN`) is rejected with
/// [`SkipMapError::InvalidKey`] instead of corrupting the order.
///
/// A custom comparison function can be given with
/// [`with_comparator`][SkipMap::with_comparator]. It **must** be well-behaved:
///
/// - Be well defined: `f(a, b)` should always return the same value
/// - Be anti-symmetric: `f(a, b) == Greater` iff `f(b, a) == Less` and `f(a, b)
///   == Equal == f(b, a)`.
/// - Be transitive: If `f(a, b) == Greater` and `f(b, c) == Greater` then `f(a,
///   c) == Greater`.
///
/// **Failure to satisfy these properties results in entries that cannot be
/// found again or that are iterated out of order.**
///
/// Note that mutable references to keys are not available at all as this could
/// result in a node being left out of the proper ordering.
pub struct SkipMap<K, V, G = Geometric> {
    arena: Arena<K, V>,
    // entries[i] is the first node at level i. Never empty.
    entries: Vec<Option<NodeId>>,
    len: usize,
    level_generator: G,
    compare: Comparator<K>,
}

/// Outcome of a search: the predecessor of the key at every level (`None`
/// standing for the entry slot), and the node holding the key if present.
struct Trail {
    preds: Vec<Option<NodeId>>,
    found: Option<NodeId>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K, V> SkipMap<K, V>
where
    K: PartialOrd,
{
    /// Create a new skipmap ordered by [`PartialOrd`], with the default
    /// [`Geometric`] level generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let skipmap: SkipMap<i64, String> = SkipMap::new();
    /// assert!(skipmap.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_level_generator(Geometric::default())
    }
}

impl<K, V, G> SkipMap<K, V, G>
where
    K: PartialOrd,
    G: LevelGenerator,
{
    /// Create a new skipmap ordered by [`PartialOrd`], drawing node heights
    /// from `level_generator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::{SkipMap, level_generator::Geometric};
    ///
    /// let generator = Geometric::with_seed(8, 0.25, 42).unwrap();
    /// let mut skipmap = SkipMap::with_level_generator(generator);
    /// skipmap.set(1, "one").unwrap();
    /// assert!(skipmap.height() <= 8);
    /// ```
    #[inline]
    pub fn with_level_generator(level_generator: G) -> Self {
        Self::from_parts(level_generator, Box::new(|a: &K, b: &K| a.partial_cmp(b)))
    }
}

impl<K, V> SkipMap<K, V> {
    /// Create a new skipmap using the provided function in order to determine
    /// the ordering of keys, with the default [`Geometric`] level generator.
    ///
    /// See the [type documentation][SkipMap] for the properties the function
    /// must satisfy.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::with_comparator(|a: &i64, b: &i64| b.cmp(a));
    /// skipmap.extend((0..5).map(|x| (x, x)));
    /// assert_eq!(skipmap.keys().copied().collect::<Vec<_>>(), [4, 3, 2, 1, 0]);
    /// ```
    #[inline]
    pub fn with_comparator<F>(compare: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + 'static,
    {
        Self::with_parts(Geometric::default(), compare)
    }
}

impl<K, V, G> SkipMap<K, V, G>
where
    G: LevelGenerator,
{
    /// Create a new skipmap with both a custom level generator and a custom
    /// comparison function.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::{SkipMap, level_generator::Geometric};
    ///
    /// let generator = Geometric::new(16, 0.5).unwrap();
    /// let mut skipmap = SkipMap::with_parts(generator, |a: &String, b: &String| {
    ///     a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    /// });
    /// skipmap.set("ccc".to_string(), 3).unwrap();
    /// skipmap.set("a".to_string(), 1).unwrap();
    /// assert_eq!(skipmap.first(), Some((&"a".to_string(), &1)));
    /// ```
    #[inline]
    pub fn with_parts<F>(level_generator: G, compare: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + 'static,
    {
        Self::from_parts(
            level_generator,
            Box::new(move |a: &K, b: &K| Some(compare(a, b))),
        )
    }

    fn from_parts(level_generator: G, compare: Comparator<K>) -> Self {
        SkipMap {
            arena: Arena::new(),
            entries: vec![None],
            len: 0,
            level_generator,
            compare,
        }
    }

    /// Associate `value` with `key`.
    ///
    /// If the key was already present, its value is replaced in place and the
    /// previous value is returned; otherwise a new entry is added and `None`
    /// is returned.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::InvalidKey`] if `key` cannot be ordered. The map is
    /// left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    ///
    /// assert_eq!(skipmap.set(1, "Hello"), Ok(None));
    /// assert_eq!(skipmap.set(2, "World"), Ok(None));
    /// assert_eq!(skipmap.set(1, "Goodbye"), Ok(Some("Hello")));
    /// assert_eq!(skipmap.len(), 2);
    /// ```
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>, SkipMapError> {
        let mut trail = self.search(&key)?;
        if let Some(id) = trail.found {
            return Ok(Some(mem::replace(&mut self.arena[id].value, value)));
        }

        let height = self
            .level_generator
            .height()
            .min(self.level_generator.total())
            .max(1);
        if height > self.entries.len() {
            trace!(from = self.entries.len(), to = height, "growing entry slots");
            self.entries.resize(height, None);
            trail.preds.resize(height, None);
        }

        let id = self.arena.alloc(SkipNode::new(key, value, height));
        for (level, &pred) in trail.preds.iter().enumerate().take(height) {
            let next = self.forward(pred, level);
            self.arena[id].links[level] = next;
            self.set_forward(pred, level, Some(id));
        }
        self.len += 1;
        Ok(None)
    }
}

impl<K, V, G> SkipMap<K, V, G> {
    /// Clears the skipmap, removing all entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((0..10).map(|x| (x, x)));
    /// skipmap.clear();
    /// assert!(skipmap.is_empty());
    /// assert_eq!(skipmap.height(), 1);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        trace!(len = self.len, "clearing skipmap");
        self.arena.clear();
        self.entries = vec![None];
        self.len = 0;
    }

    /// Returns the number of entries in the skipmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((0..10).map(|x| (x, x)));
    /// assert_eq!(skipmap.len(), 10);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the skipmap contains no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.is_empty());
    ///
    /// skipmap.set(1, "Rust").unwrap();
    /// assert!(!skipmap.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of levels currently in use.
    ///
    /// This is at least 1, at least the height of every node in the map, and
    /// never more than the level generator's
    /// [`total`][LevelGenerator::total]. Empty top levels are dropped when
    /// entries are removed.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.entries.len()
    }

    /// Provides a reference to the value associated with `key`.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if there is no entry for `key`, and
    /// [`SkipMapError::InvalidKey`] if `key` cannot be ordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::{SkipMap, SkipMapError};
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert_eq!(skipmap.get(&0), Err(SkipMapError::NotFound));
    /// skipmap.extend((0..10).map(|x| (x, x)));
    /// assert_eq!(skipmap.get(&0), Ok(&0));
    /// assert_eq!(skipmap.get(&10), Err(SkipMapError::NotFound));
    /// ```
    #[inline]
    pub fn get(&self, key: &K) -> Result<&V, SkipMapError> {
        let id = self.find(key)?.ok_or(SkipMapError::NotFound)?;
        Ok(&self.arena[id].value)
    }

    /// Provides a mutable reference to the value associated with `key`.
    ///
    /// # Errors
    ///
    /// As for [`get`][SkipMap::get].
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((0..10).map(|x| (x, x)));
    ///
    /// if let Ok(x) = skipmap.get_mut(&0) {
    ///     *x = 100;
    /// }
    /// assert_eq!(skipmap.get(&0), Ok(&100));
    /// assert!(skipmap.get_mut(&10).is_err());
    /// ```
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, SkipMapError> {
        let id = self.find(key)?.ok_or(SkipMapError::NotFound)?;
        Ok(&mut self.arena[id].value)
    }

    /// Returns `true` if the skipmap contains an entry for `key`.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::InvalidKey`] if `key` cannot be ordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((0..10).map(|x| (x, x)));
    /// assert_eq!(skipmap.contains_key(&4), Ok(true));
    /// assert_eq!(skipmap.contains_key(&15), Ok(false));
    /// ```
    #[inline]
    pub fn contains_key(&self, key: &K) -> Result<bool, SkipMapError> {
        Ok(self.find(key)?.is_some())
    }

    /// Removes the entry for `key` and returns its value.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::NotFound`] if there is no entry for `key`, in which case
    /// the map is left unchanged, and [`SkipMapError::InvalidKey`] if `key`
    /// cannot be ordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::{SkipMap, SkipMapError};
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((0..10).map(|x| (x, x)));
    /// assert_eq!(skipmap.remove(&4), Ok(4));
    /// assert_eq!(skipmap.remove(&4), Err(SkipMapError::NotFound));
    /// assert_eq!(skipmap.len(), 9);
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<V, SkipMapError> {
        let trail = self.search(key)?;
        let id = trail.found.ok_or(SkipMapError::NotFound)?;
        Ok(self.unlink(id, &trail.preds).value)
    }

    /// Provides a reference to the entry with the smallest key, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.first().is_none());
    ///
    /// skipmap.set(2, "World").unwrap();
    /// skipmap.set(1, "Hello").unwrap();
    /// assert_eq!(skipmap.first(), Some((&1, &"Hello")));
    /// ```
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.entries[0].map(|id| self.pair(id))
    }

    /// Provides a reference to the entry with the largest key, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.last().is_none());
    ///
    /// skipmap.set(2, "World").unwrap();
    /// skipmap.set(1, "Hello").unwrap();
    /// assert_eq!(skipmap.last(), Some((&2, &"World")));
    /// ```
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.last_id().map(|id| self.pair(id))
    }

    /// Removes the entry with the smallest key and returns it, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.set(1, "Hello").unwrap();
    /// skipmap.set(2, "World").unwrap();
    ///
    /// assert_eq!(skipmap.pop_first(), Some((1, "Hello")));
    /// assert_eq!(skipmap.pop_first(), Some((2, "World")));
    /// assert!(skipmap.pop_first().is_none());
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let id = self.entries[0]?;
        // The first node is first at every level it reaches.
        let preds = vec![None; self.arena[id].height()];
        Some(self.unlink(id, &preds).into_inner())
    }

    /// Removes the entry with the largest key and returns it, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.set(1, "Hello").unwrap();
    /// skipmap.set(2, "World").unwrap();
    ///
    /// assert_eq!(skipmap.pop_last(), Some((2, "World")));
    /// assert_eq!(skipmap.pop_last(), Some((1, "Hello")));
    /// assert!(skipmap.pop_last().is_none());
    /// ```
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let last = self.last_id()?;
        let mut preds = vec![None; self.entries.len()];
        let mut current = None;
        for level in (0..self.entries.len()).rev() {
            while let Some(next) = self.forward(current, level) {
                if next == last {
                    break;
                }
                current = Some(next);
            }
            preds[level] = current;
        }
        Some(self.unlink(last, &preds).into_inner())
    }

    /// Creates an iterator over the entries of the skipmap, in ascending key
    /// order.
    ///
    /// The iterator borrows the map, so the map cannot be modified while the
    /// iterator is alive. Call `iter` again to start a new pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((0..10).map(|x| (x, x)));
    /// for (k, v) in skipmap.iter() {
    ///     println!("Key: {}, Value: {}", k, v);
    /// }
    /// ```
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: &self.arena,
            next: self.entries[0],
            remaining: self.len,
        }
    }

    /// Creates an iterator over the keys of the skipmap, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend([(3, 'c'), (1, 'a'), (2, 'b')]);
    /// assert_eq!(skipmap.keys().collect::<Vec<_>>(), [&1, &2, &3]);
    /// ```
    #[inline]
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Creates an iterator over the values of the skipmap, in ascending order
    /// of their keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend([(3, 'c'), (1, 'a'), (2, 'b')]);
    /// assert_eq!(skipmap.values().collect::<String>(), "abc");
    /// ```
    #[inline]
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Calls `f` on every entry, in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((1..=4).map(|x| (x, x * 10)));
    ///
    /// let mut total = 0;
    /// skipmap.for_each(|k, v| total += k * v);
    /// assert_eq!(total, 300);
    /// ```
    #[inline]
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self {
            f(key, value);
        }
    }

    /// Constructs an iterator over the entries whose keys lie between `min` and
    /// `max`, in ascending key order. An `Unbounded` bound is treated as
    /// infinite, so `range(Unbounded, Unbounded)` yields the whole collection.
    ///
    /// # Errors
    ///
    /// [`SkipMapError::InvalidKey`] if either bound cannot be ordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use skiplist_map::SkipMap;
    /// use std::ops::Bound::{Excluded, Included, Unbounded};
    ///
    /// let mut skipmap = SkipMap::new();
    /// skipmap.extend((0..10).map(|x| (x, x)));
    ///
    /// let keys: Vec<_> = skipmap
    ///     .range(Included(&3), Excluded(&7))
    ///     .unwrap()
    ///     .map(|(k, _)| *k)
    ///     .collect();
    /// assert_eq!(keys, [3, 4, 5, 6]);
    /// assert_eq!(skipmap.range(Excluded(&4), Unbounded).unwrap().next(), Some((&5, &5)));
    /// ```
    pub fn range<'a>(
        &'a self,
        min: Bound<&K>,
        max: Bound<&'a K>,
    ) -> Result<Range<'a, K, V>, SkipMapError> {
        if let Bound::Included(bound) | Bound::Excluded(bound) = max {
            self.validate(bound)?;
        }
        let next = match min {
            Bound::Unbounded => self.entries[0],
            Bound::Included(bound) => self.descend(bound, |_, _| {})?,
            Bound::Excluded(bound) => {
                let candidate = self.descend(bound, |_, _| {})?;
                match self.matching(candidate, bound)? {
                    Some(id) => self.arena[id].links[0],
                    None => candidate,
                }
            }
        };
        Ok(Range {
            arena: &self.arena,
            next,
            max,
            compare: &*self.compare,
        })
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl<K, V, G> SkipMap<K, V, G> {
    /// Compare two keys, rejecting pairs the comparator cannot order.
    fn compare(&self, a: &K, b: &K) -> Result<Ordering, SkipMapError> {
        (self.compare)(a, b).ok_or_else(|| {
            debug!("comparator could not order key against a stored key");
            SkipMapError::InvalidKey
        })
    }

    /// A key is usable only if it is ordered equal to itself.
    fn validate(&self, key: &K) -> Result<(), SkipMapError> {
        match (self.compare)(key, key) {
            Some(Ordering::Equal) => Ok(()),
            _ => {
                debug!("rejecting key with no place in the ordering");
                Err(SkipMapError::InvalidKey)
            }
        }
    }

    /// The node following `pred` at `level`, where `None` stands for the entry
    /// slot.
    #[inline]
    fn forward(&self, pred: Option<NodeId>, level: usize) -> Option<NodeId> {
        match pred {
            None => self.entries[level],
            Some(id) => self.arena[id].links[level],
        }
    }

    #[inline]
    fn set_forward(&mut self, pred: Option<NodeId>, level: usize, target: Option<NodeId>) {
        match pred {
            None => self.entries[level] = target,
            Some(id) => self.arena[id].links[level] = target,
        }
    }

    /// Walks from the highest level down to level 0, advancing across nodes
    /// whose key is strictly less than `key`. `record` is called with the last
    /// node stepped over at each level. Returns the first node at level 0 whose
    /// key is not less than `key`.
    fn descend<F>(&self, key: &K, mut record: F) -> Result<Option<NodeId>, SkipMapError>
    where
        F: FnMut(usize, Option<NodeId>),
    {
        self.validate(key)?;
        let mut current = None;
        for level in (0..self.entries.len()).rev() {
            while let Some(next) = self.forward(current, level) {
                if self.compare(&self.arena[next].key, key)? == Ordering::Less {
                    current = Some(next);
                } else {
                    break;
                }
            }
            record(level, current);
        }
        Ok(self.forward(current, 0))
    }

    /// `candidate` if it holds `key`.
    fn matching(
        &self,
        candidate: Option<NodeId>,
        key: &K,
    ) -> Result<Option<NodeId>, SkipMapError> {
        let Some(id) = candidate else {
            return Ok(None);
        };
        Ok((self.compare(&self.arena[id].key, key)? == Ordering::Equal).then_some(id))
    }

    fn find(&self, key: &K) -> Result<Option<NodeId>, SkipMapError> {
        let candidate = self.descend(key, |_, _| {})?;
        self.matching(candidate, key)
    }

    fn search(&self, key: &K) -> Result<Trail, SkipMapError> {
        let mut preds = vec![None; self.entries.len()];
        let candidate = self.descend(key, |level, pred| preds[level] = pred)?;
        Ok(Trail {
            found: self.matching(candidate, key)?,
            preds,
        })
    }

    fn last_id(&self) -> Option<NodeId> {
        let mut current = None;
        for level in (0..self.entries.len()).rev() {
            while let Some(next) = self.forward(current, level) {
                current = Some(next);
            }
        }
        current
    }

    fn pair(&self, id: NodeId) -> (&K, &V) {
        let node = &self.arena[id];
        (&node.key, &node.value)
    }

    /// Splices `id` out of every level it occupies and releases it. `preds`
    /// holds its predecessor at each of those levels.
    fn unlink(&mut self, id: NodeId, preds: &[Option<NodeId>]) -> SkipNode<K, V> {
        let node = self.arena.release(id);
        for (level, &next) in node.links.iter().enumerate() {
            self.set_forward(preds[level], level, next);
        }
        self.len -= 1;

        let before = self.entries.len();
        while self.entries.len() > 1 && matches!(self.entries.last(), Some(None)) {
            self.entries.pop();
        }
        if self.entries.len() != before {
            trace!(from = before, to = self.entries.len(), "trimming empty levels");
        }
        node
    }

    /// Checks the integrity of the skipmap.
    #[cfg(test)]
    fn check(&self) {
        assert!(!self.entries.is_empty());
        if self.entries.len() > 1 {
            assert!(self.entries[self.entries.len() - 1].is_some());
        }

        let mut bottom = Vec::new();
        let mut node = self.entries[0];
        while let Some(id) = node {
            if let Some(&prev) = bottom.last() {
                assert_eq!(
                    (self.compare)(&self.arena[prev].key, &self.arena[id].key),
                    Some(Ordering::Less)
                );
            }
            assert!(self.arena[id].height() <= self.entries.len());
            bottom.push(id);
            node = self.arena[id].links[0];
        }
        assert_eq!(bottom.len(), self.len);
        assert_eq!(self.arena.live(), self.len);

        // Each level must link exactly the nodes tall enough to reach it, in
        // the same order as level 0.
        for level in 1..self.entries.len() {
            let mut linked = Vec::new();
            let mut node = self.entries[level];
            while let Some(id) = node {
                linked.push(id);
                node = self.arena[id].links[level];
            }
            let expected: Vec<_> = bottom
                .iter()
                .copied()
                .filter(|&id| self.arena[id].height() > level)
                .collect();
            assert_eq!(linked, expected);
        }
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<K: PartialOrd, V> Default for SkipMap<K, V> {
    #[inline]
    fn default() -> SkipMap<K, V> {
        SkipMap::new()
    }
}

/// This implementation of `PartialEq` only checks that the *entries* are
/// equal; it does not check for equivalence of other features (such as the
/// ordering function and the node heights). Furthermore, this uses `K`'s
/// implementation of `PartialEq` and *does not* use the owning skipmap's
/// comparison function.
impl<K, V, AG, BG> PartialEq<SkipMap<K, V, BG>> for SkipMap<K, V, AG>
where
    K: PartialEq,
    V: PartialEq,
{
    #[inline]
    fn eq(&self, other: &SkipMap<K, V, BG>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, G> Eq for SkipMap<K, V, G> {}

impl<K: Hash, V: Hash, G> Hash for SkipMap<K, V, G> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for elt in self {
            elt.hash(state);
        }
    }
}

/// # Panics
///
/// Panics if one of the keys cannot be ordered. Use
/// [`set`][SkipMap::set] to handle such keys gracefully.
impl<K, V, G> Extend<(K, V)> for SkipMap<K, V, G>
where
    G: LevelGenerator,
{
    #[inline]
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        for (key, value) in iterable {
            if let Err(err) = self.set(key, value) {
                panic!("cannot extend skipmap: {err}");
            }
        }
    }
}

impl<K: PartialOrd, V> FromIterator<(K, V)> for SkipMap<K, V> {
    #[inline]
    fn from_iter<I>(iter: I) -> SkipMap<K, V>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut skipmap = SkipMap::new();
        skipmap.extend(iter);
        skipmap
    }
}

impl<K, V, G> fmt::Debug for SkipMap<K, V, G>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;

        for (i, (k, v)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "({k:?}, {v:?})")?;
        }
        write!(f, "]")
    }
}

impl<K, V, G> fmt::Display for SkipMap<K, V, G>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;

        for (i, (k, v)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "({k}, {v})")?;
        }
        write!(f, "]")
    }
}

impl<K, V, G> IntoIterator for SkipMap<K, V, G> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let SkipMap {
            arena,
            entries,
            len,
            ..
        } = self;
        IntoIter {
            slots: arena.into_slots(),
            next: entries[0],
            remaining: len,
        }
    }
}

impl<'a, K, V, G> IntoIterator for &'a SkipMap<K, V, G> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ///////////////////////////////////////////////
// Extra structs
// ///////////////////////////////////////////////

/// An iterator over the entries of a [`SkipMap`], in ascending key order.
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let node = &arena[self.next?];
        self.next = node.links[0];
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An owning iterator over the entries of a [`SkipMap`], in ascending key
/// order.
pub struct IntoIter<K, V> {
    slots: Vec<Option<SkipNode<K, V>>>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = take_slot(&mut self.slots, self.next?);
        self.next = node.links[0];
        self.remaining -= 1;
        Some(node.into_inner())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Iterator over a [`SkipMap`]'s keys.
pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|x| x.0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over a [`SkipMap`]'s values.
pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|x| x.1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// An iterator over a sub-range of a [`SkipMap`]'s entries, created by
/// [`SkipMap::range`].
pub struct Range<'a, K, V> {
    arena: &'a Arena<K, V>,
    next: Option<NodeId>,
    max: Bound<&'a K>,
    compare: &'a dyn Fn(&K, &K) -> Option<Ordering>,
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let node = &arena[self.next?];
        let within = match self.max {
            Bound::Unbounded => true,
            Bound::Included(max) => matches!(
                (self.compare)(&node.key, max),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Bound::Excluded(max) => (self.compare)(&node.key, max) == Some(Ordering::Less),
        };
        if within {
            self.next = node.links[0];
            Some((&node.key, &node.value))
        } else {
            self.next = None;
            None
        }
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
