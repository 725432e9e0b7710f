use std::hash::{BuildHasher, Hash};

use crate::Map;

/// A view into a single key's slot, obtained from [`Map::entry`].
///
/// `EntryRef` borrows the map for exactly as long as it is alive and is consumed by
/// `or_insert`/`or_insert_with`, the same get-or-insert-then-mutate idiom
/// `std::collections::HashMap`'s own `Entry` API uses.
pub struct EntryRef<'a, K, V, S> {
    map: &'a mut Map<K, V, S>,
    key: K,
}

impl<'a, K, V, S> EntryRef<'a, K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a mut Map<K, V, S>, key: K) -> Self {
        EntryRef { map, key }
    }

    /// The key this entry was created for.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Ensures a value is present, inserting `default` if it was not, and returns a mutable
    /// reference to it either way.
    pub fn or_insert(self, default: V) -> &'a mut V {
        self.or_insert_with(|| default)
    }

    /// Like [`EntryRef::or_insert`], but only computes the default value if one is needed.
    pub fn or_insert_with<F>(self, f: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        let EntryRef { map, key } = self;
        map.get_or_insert_with(key, f)
    }

    /// Runs `f` against the existing value, if any, then returns `self` so a subsequent
    /// `or_insert`/`or_insert_with` can still supply a fallback.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        let EntryRef { map, key } = self;
        if let Some(v) = map.get_mut(&key) {
            f(v);
        }
        EntryRef { map, key }
    }
}
