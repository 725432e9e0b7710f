use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

use crate::Map;

/// A live facade over a map's keys.
///
/// Unlike [`Map::keys`] (a plain borrowing iterator), a view keeps its map borrowed mutably so
/// `retain_all`/`remove`/`clear` can act on the underlying map through it. There is no
/// `add`/`add_all`: a key set can never legally support inserting a key without a value to pair it
/// with, so those calls are simply absent from the API rather than a method that always errors.
pub struct KeysView<'a, K, V, S> {
    map: &'a mut Map<K, V, S>,
}

impl<'a, K, V, S> KeysView<'a, K, V, S> {
    pub(crate) fn new(map: &'a mut Map<K, V, S>) -> Self {
        KeysView { map }
    }
}

impl<'a, K, V, S> KeysView<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    /// Keeps only the keys for which `keep` returns `true`. Returns whether anything was removed.
    pub fn retain_all<F>(&mut self, keep: F) -> bool
    where
        F: Fn(&K) -> bool,
    {
        let before = self.map.len();
        self.map.retain(|k, _| keep(k));
        self.map.len() != before
    }
}

/// Serializes as an independent snapshot `Vec` of the current keys, never as a back-reference to
/// the owning map.
#[cfg(feature = "serialize")]
impl<'a, K, V, S> serde::Serialize for KeysView<'a, K, V, S>
where
    K: serde::Serialize + Hash + Eq,
    S: BuildHasher,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for k in self.iter() {
            seq.serialize_element(k)?;
        }
        seq.end()
    }
}

/// A live facade over a map's values. See [`KeysView`] for the rationale.
pub struct ValuesView<'a, K, V, S> {
    map: &'a mut Map<K, V, S>,
}

impl<'a, K, V, S> ValuesView<'a, K, V, S> {
    pub(crate) fn new(map: &'a mut Map<K, V, S>) -> Self {
        ValuesView { map }
    }
}

impl<'a, K, V, S> ValuesView<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Linear scan: unlike key lookup there is no index to consult for values.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.map.values_mut()
    }

    /// Keeps only the values for which `keep` returns `true`. Returns whether anything was
    /// removed.
    pub fn retain_all<F>(&mut self, keep: F) -> bool
    where
        F: Fn(&V) -> bool,
    {
        let before = self.map.len();
        self.map.retain(|_, v| keep(v));
        self.map.len() != before
    }
}

/// Serializes as an independent snapshot `Vec` of the current values, never as a back-reference to
/// the owning map.
#[cfg(feature = "serialize")]
impl<'a, K, V, S> serde::Serialize for ValuesView<'a, K, V, S>
where
    K: Hash + Eq,
    V: serde::Serialize,
    S: BuildHasher,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for v in self.iter() {
            seq.serialize_element(v)?;
        }
        seq.end()
    }
}
