use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::mem;

use crate::chain::Chain;
use crate::cursor::EntryCursor;
use crate::entry::EntryRef;
use crate::error::MapError;
use crate::iter::{IntoIter, Iter, IterMut};
use crate::slot::Slot;
use crate::views::{KeysView, ValuesView};

const DEFAULT_CAPACITY: usize = 16;
const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// A single-writer, open-addressed hash map with in-band collision chaining.
///
/// Every slot in the backing table is either empty, holds one entry directly, or — once a second
/// key lands on the same index — owns a small [`Chain`] of entries that share it. Growth doubles
/// the table and re-homes every live entry once occupancy crosses `capacity * load_factor`. There
/// is no internal synchronization: `Map` is `Send`/`Sync` exactly when `K`, `V`, and `S` are, the
/// same way `std::collections::HashMap` is, and concurrent access from multiple threads must be
/// arranged by the caller.
pub struct Map<K, V, S = RandomState> {
    slots: Vec<Slot<K, V>>,
    occupied: usize,
    load_factor: f64,
    max_size: usize,
    hash_builder: S,
}

impl<K, V> Map<K, V, RandomState> {
    /// Creates an empty map with a small default capacity and a load factor of `0.75`.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty map sized to hold at least `capacity` entries before its first growth,
    /// using a load factor of `0.75`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_load(capacity, DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty map sized to hold at least `capacity` entries before its first growth, at
    /// the given load factor.
    ///
    /// # Panics
    /// Panics if `load_factor` is not in `(0, 1]`, or if `capacity` cannot be honored. Use
    /// [`Map::try_with_capacity_and_load`] to handle this without panicking.
    pub fn with_capacity_and_load(capacity: usize, load_factor: f64) -> Self {
        Self::try_with_capacity_and_load(capacity, load_factor)
            .expect("invalid map configuration")
    }

    /// Fallible version of [`Map::with_capacity_and_load`].
    pub fn try_with_capacity_and_load(capacity: usize, load_factor: f64) -> Result<Self, MapError> {
        Self::try_with_capacity_and_load_and_hasher(capacity, load_factor, RandomState::default())
    }
}

impl<K, V> Default for Map<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Map<K, V, S> {
    /// Creates an empty map using a custom [`BuildHasher`], with the default capacity and load
    /// factor.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_load_and_hasher(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, hash_builder)
    }

    /// Creates an empty map using a custom [`BuildHasher`], capacity, and load factor.
    ///
    /// # Panics
    /// Panics if `load_factor` is not in `(0, 1]`, or if `capacity` cannot be honored.
    pub fn with_capacity_and_load_and_hasher(capacity: usize, load_factor: f64, hash_builder: S) -> Self {
        Self::try_with_capacity_and_load_and_hasher(capacity, load_factor, hash_builder)
            .expect("invalid map configuration")
    }

    /// Fallible version of [`Map::with_capacity_and_load_and_hasher`].
    pub fn try_with_capacity_and_load_and_hasher(
        capacity: usize,
        load_factor: f64,
        hash_builder: S,
    ) -> Result<Self, MapError> {
        if !(load_factor > 0.0 && load_factor <= 1.0) {
            return Err(MapError::InvalidLoadFactor(load_factor));
        }
        if capacity > usize::MAX / 2 {
            return Err(MapError::InvalidCapacity(capacity));
        }
        let wanted = (capacity as f64 / load_factor).ceil();
        if !wanted.is_finite() || wanted > usize::MAX as f64 {
            return Err(MapError::InvalidCapacity(capacity));
        }
        let pow2_capacity = (wanted as usize).max(1).next_power_of_two();
        let max_size = Self::compute_max_size(pow2_capacity, load_factor);
        Ok(Map {
            slots: (0..pow2_capacity).map(|_| Slot::Empty).collect(),
            occupied: 0,
            load_factor,
            max_size,
            hash_builder,
        })
    }

    fn compute_max_size(capacity: usize, load_factor: f64) -> usize {
        let by_load_factor = (capacity as f64 * load_factor) as usize;
        (capacity - 1).min(by_load_factor)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Current table size. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Removes every entry without shrinking the table.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.occupied = 0;
    }

    /// Number of slots currently acting as a chain root, i.e. that hold a [`Slot::Chained`] at
    /// all. A chain root stays one even after shrinking to a single live pair — it only collapses
    /// back to [`Slot::Empty`] once every entry sharing the index has been removed.
    ///
    /// A diagnostic, not a performance-critical path: useful for judging hash quality and
    /// load-factor tuning.
    pub fn colliding_buckets(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Chained(_)))
            .count()
    }

    /// Cost estimator in machine words: the table itself, plus two header words per chain root,
    /// plus the pairs each chain owns. Not an exact byte count.
    pub fn memory_words(&self) -> usize {
        let mut words = self.slots.len() + 2;
        for slot in &self.slots {
            if let Slot::Chained(chain) = slot {
                words += chain.len() + 2;
            }
        }
        words
    }

    pub fn keys_view(&mut self) -> KeysView<'_, K, V, S> {
        KeysView::new(self)
    }

    pub fn values_view(&mut self) -> ValuesView<'_, K, V, S> {
        ValuesView::new(self)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.slots)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.slots)
    }

    /// Alias for [`Map::iter`].
    pub fn entries(&self) -> Iter<'_, K, V> {
        self.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.iter_mut().map(|(_, v)| v)
    }

    /// A cursor over every live entry that supports removing the entry it just yielded.
    pub fn cursor_mut(&mut self) -> EntryCursor<'_, K, V> {
        EntryCursor::new(&mut self.slots, &mut self.occupied)
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = self.cursor_mut();
        while let Some((k, v)) = cursor.next() {
            if !f(k, v) {
                cursor.remove_last();
            }
        }
    }

    #[cfg(debug_assertions)]
    fn debug_check_invariants(&self) {
        if !self.capacity().is_power_of_two() {
            tracing::error!("flathash map corruption: capacity is not a power of two");
            panic!("{}", MapError::Corruption("capacity must be a power of two"));
        }
        if self.max_size >= self.capacity() {
            tracing::error!("flathash map corruption: max_size >= capacity");
            panic!("{}", MapError::Corruption("max_size must stay below capacity"));
        }
    }

    #[cfg(not(debug_assertions))]
    fn debug_check_invariants(&self) {}
}

impl<K, V, S> Map<K, V, S>
where
    S: BuildHasher,
{
    fn hash_key<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        let mut hasher = self.hash_builder.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Bit-mixing finalizer spreading hash bits across lower-order positions before masking,
    /// so consecutive or low-entropy hashes do not all collapse onto the same few slots.
    fn mix(hash: u64) -> u64 {
        let mut h = hash;
        h ^= h >> 20 ^ h >> 12;
        h ^= h >> 7 ^ h >> 4;
        h
    }

    fn index_for<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        let mixed = Self::mix(self.hash_key(key));
        (mixed & (self.capacity() as u64 - 1)) as usize
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Linear scan over every live value. Unlike key lookup, there is no index to consult.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index_for(key);
        match &self.slots[idx] {
            Slot::Empty => None,
            Slot::Direct(k, v) => {
                if k.borrow() == key {
                    Some(v)
                } else {
                    None
                }
            }
            Slot::Chained(chain) => chain.get(key),
        }
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index_for(key);
        match &mut self.slots[idx] {
            Slot::Empty => None,
            Slot::Direct(k, v) => {
                if k.borrow() == key {
                    Some(v)
                } else {
                    None
                }
            }
            Slot::Chained(chain) => chain.get_mut(key),
        }
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index_for(key);
        match &self.slots[idx] {
            Slot::Empty => None,
            Slot::Direct(k, v) => {
                if k.borrow() == key {
                    Some((k, v))
                } else {
                    None
                }
            }
            Slot::Chained(chain) => chain.iter().find(|(k, _)| k.borrow() == key).map(|(k, v)| (k, v)),
        }
    }
}

impl<K, V, S> Map<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn ensure_room_for_insert(&mut self) {
        if self.occupied + 1 > self.max_size {
            self.rehash(self.capacity() * 2);
        }
    }

    fn rehash(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity.is_power_of_two());
        tracing::debug!(
            old_capacity = self.capacity(),
            new_capacity,
            occupied = self.occupied,
            "rehashing flathash map"
        );
        let old_slots = mem::take(&mut self.slots);
        self.slots = (0..new_capacity).map(|_| Slot::Empty).collect();
        self.max_size = Self::compute_max_size(new_capacity, self.load_factor);
        self.occupied = 0;
        for slot in old_slots {
            match slot {
                Slot::Empty => {}
                Slot::Direct(k, v) => self.insert_during_rehash(k, v),
                Slot::Chained(chain) => {
                    for (k, v) in chain.into_pairs() {
                        self.insert_during_rehash(k, v);
                    }
                }
            }
        }
        self.debug_check_invariants();
    }

    fn insert_during_rehash(&mut self, key: K, value: V) {
        let idx = self.index_for(&key);
        match mem::replace(&mut self.slots[idx], Slot::Empty) {
            Slot::Empty => self.slots[idx] = Slot::Direct(key, value),
            Slot::Direct(old_k, old_v) => {
                let mut chain = Chain::new();
                chain.push(old_k, old_v);
                chain.push(key, value);
                self.slots[idx] = Slot::Chained(chain);
            }
            Slot::Chained(mut chain) => {
                chain.push(key, value);
                self.slots[idx] = Slot::Chained(chain);
            }
        }
        self.occupied += 1;
    }

    /// Inserts `key`/`value`, returning the previous value if `key` was already present.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.contains_key(&key) {
            let idx = self.index_for(&key);
            return match &mut self.slots[idx] {
                Slot::Direct(_, v) => Some(mem::replace(v, value)),
                Slot::Chained(chain) => chain.put(key, value),
                Slot::Empty => unreachable!("contains_key said present"),
            };
        }
        self.ensure_room_for_insert();
        let idx = self.index_for(&key);
        match mem::replace(&mut self.slots[idx], Slot::Empty) {
            Slot::Empty => self.slots[idx] = Slot::Direct(key, value),
            Slot::Direct(old_k, old_v) => {
                let mut chain = Chain::new();
                chain.push(old_k, old_v);
                chain.push(key, value);
                self.slots[idx] = Slot::Chained(chain);
            }
            Slot::Chained(mut chain) => {
                chain.push(key, value);
                self.slots[idx] = Slot::Chained(chain);
            }
        }
        self.occupied += 1;
        None
    }

    /// Alias for [`Map::put`], matching `std::collections::HashMap` naming.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.put(key, value)
    }

    /// Inserts every pair from `iter`, overwriting any existing keys.
    pub fn put_all<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }

    /// Builds a new map with every value replaced by `f(key, value)`. Keys are cloned into the
    /// result so the two maps own independent entries; capacity and load factor are preserved.
    pub fn collect_values<R, F>(&self, f: F) -> Map<K, R, S>
    where
        K: Clone,
        S: BuildHasher + Clone,
        F: Fn(&K, &V) -> R,
    {
        let mut out = Map {
            slots: (0..self.capacity()).map(|_| Slot::Empty).collect(),
            occupied: 0,
            load_factor: self.load_factor,
            max_size: self.max_size,
            hash_builder: self.hash_builder.clone(),
        };
        for (k, v) in self.iter() {
            out.put(k.clone(), f(k, v));
        }
        out
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index_for(key);
        let is_direct_match = matches!(&self.slots[idx], Slot::Direct(k, _) if k.borrow() == key);
        if is_direct_match {
            return match mem::replace(&mut self.slots[idx], Slot::Empty) {
                Slot::Direct(_, v) => {
                    self.occupied -= 1;
                    Some(v)
                }
                _ => unreachable!("slot just matched as Direct"),
            };
        }
        if let Slot::Chained(chain) = &mut self.slots[idx] {
            let removed = chain.remove(key);
            if removed.is_some() {
                self.occupied -= 1;
            }
            if chain.is_empty() {
                self.slots[idx] = Slot::Empty;
            }
            return removed;
        }
        None
    }

    /// Returns a mutable reference to the value for `key`, inserting `f()` first if absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        if !self.contains_key(&key) {
            self.ensure_room_for_insert();
            let idx = self.index_for(&key);
            match mem::replace(&mut self.slots[idx], Slot::Empty) {
                Slot::Empty => self.slots[idx] = Slot::Direct(key, f()),
                Slot::Direct(old_k, old_v) => {
                    let mut chain = Chain::new();
                    chain.push(old_k, old_v);
                    chain.push(key, f());
                    self.slots[idx] = Slot::Chained(chain);
                }
                Slot::Chained(mut chain) => {
                    chain.push(key, f());
                    self.slots[idx] = Slot::Chained(chain);
                }
            }
            self.occupied += 1;
            return match &mut self.slots[idx] {
                Slot::Direct(_, v) => v,
                Slot::Chained(chain) => chain.last_mut(),
                Slot::Empty => unreachable!("just inserted"),
            };
        }
        let idx = self.index_for(&key);
        match &mut self.slots[idx] {
            Slot::Direct(_, v) => v,
            Slot::Chained(chain) => chain.get_mut(&key).expect("contains_key said present"),
            Slot::Empty => unreachable!("contains_key said present"),
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting `default` first if absent.
    pub fn get_or_insert(&mut self, key: K, default: V) -> &mut V {
        self.get_or_insert_with(key, || default)
    }

    /// Replaces the value for `key` with `f(old_or_default)`, returning a reference to the
    /// result. `default` is only evaluated if `key` is absent.
    pub fn update_value_with<D, F>(&mut self, key: K, default: D, f: F) -> &V
    where
        D: FnOnce() -> V,
        F: FnOnce(V) -> V,
    {
        if self.contains_key(&key) {
            let idx = self.index_for(&key);
            match &mut self.slots[idx] {
                Slot::Chained(chain) => {
                    chain.update(&key, f);
                }
                Slot::Direct(_, _) => {
                    if let Slot::Direct(k, v) = mem::replace(&mut self.slots[idx], Slot::Empty) {
                        self.slots[idx] = Slot::Direct(k, f(v));
                    }
                }
                Slot::Empty => unreachable!("contains_key said present"),
            }
            return match &self.slots[idx] {
                Slot::Direct(_, v) => v,
                Slot::Chained(chain) => chain.get(&key).expect("just updated"),
                Slot::Empty => unreachable!("just updated"),
            };
        }
        self.ensure_room_for_insert();
        let idx = self.index_for(&key);
        let value = f(default());
        match mem::replace(&mut self.slots[idx], Slot::Empty) {
            Slot::Empty => self.slots[idx] = Slot::Direct(key, value),
            Slot::Direct(old_k, old_v) => {
                let mut chain = Chain::new();
                chain.push(old_k, old_v);
                chain.push(key, value);
                self.slots[idx] = Slot::Chained(chain);
            }
            Slot::Chained(mut chain) => {
                chain.push(key, value);
                self.slots[idx] = Slot::Chained(chain);
            }
        }
        self.occupied += 1;
        match &self.slots[idx] {
            Slot::Direct(_, v) => v,
            Slot::Chained(chain) => chain.last(),
            Slot::Empty => unreachable!("just inserted"),
        }
    }

    /// A cursor-like handle for the standard get-or-insert / and-modify idiom. See [`EntryRef`].
    pub fn entry(&mut self, key: K) -> EntryRef<'_, K, V, S> {
        EntryRef::new(self, key)
    }
}

impl<K, V, S: Default> Map<K, V, S> {
    /// Builds a map by zipping parallel `keys` and `values` iterables together, one `put` per
    /// pair.
    pub fn with_keys_values<I, J>(keys: I, values: J) -> Self
    where
        K: Hash + Eq,
        S: BuildHasher,
        I: IntoIterator<Item = K>,
        J: IntoIterator<Item = V>,
    {
        let mut map = Map::with_hasher(S::default());
        for (k, v) in keys.into_iter().zip(values) {
            map.put(k, v);
        }
        map
    }
}

impl<K, V, S> Map<K, V, S> {
    /// Runs `f` once per live key.
    pub fn for_each_key<F: FnMut(&K)>(&self, mut f: F) {
        for k in self.keys() {
            f(k);
        }
    }

    /// Runs `f` once per live value.
    pub fn for_each_value<F: FnMut(&V)>(&self, mut f: F) {
        for v in self.values() {
            f(v);
        }
    }

    /// Runs `f` once per live entry.
    pub fn for_each_entry<F: FnMut(&K, &V)>(&self, mut f: F) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    /// Runs `f` once per live entry, with a mutable reference to the value.
    pub fn for_each_entry_mut<F: FnMut(&K, &mut V)>(&mut self, mut f: F) {
        for (k, v) in self.iter_mut() {
            f(k, v);
        }
    }

    /// Runs `f` once per live entry alongside a running index (iteration order, not insertion
    /// order).
    pub fn for_each_with_index<F: FnMut(usize, &K, &V)>(&self, mut f: F) {
        for (i, (k, v)) in self.iter().enumerate() {
            f(i, k, v);
        }
    }
}

impl<K, V, S> fmt::Debug for Map<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S: Clone> Clone for Map<K, V, S>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Map {
            slots: self.slots.clone(),
            occupied: self.occupied,
            load_factor: self.load_factor,
            max_size: self.max_size,
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Map<K, V, RandomState>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut map = Map::with_capacity(lower.max(1));
        map.put_all(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for Map<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

/// Builds a fresh map by copying every entry from `other` through its public iterator.
///
/// There is no raw-table clone shortcut even when `other` shares this exact type: going through
/// `iter()` unconditionally means a copy never depends on internal layout, at the cost of
/// re-hashing every key.
impl<K, V, S> From<&Map<K, V, S>> for Map<K, V, RandomState>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn from(other: &Map<K, V, S>) -> Self {
        let mut map = Map::with_capacity_and_load(other.len().max(1), other.load_factor);
        for (k, v) in other.iter() {
            map.put(k.clone(), v.clone());
        }
        map
    }
}

impl<K, V, S> IntoIterator for Map<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.slots)
    }
}

impl<'a, K, V, S> IntoIterator for &'a Map<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut Map<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
