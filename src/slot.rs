use crate::chain::Chain;

/// One cell of the map's backing table.
///
/// A slot is either empty, holds one entry directly, or owns a [`Chain`] of entries that all hash
/// to this index. Modeling the three states as an enum discriminant rather than a sentinel value
/// means matching on `Slot` is exhaustive: "forgot to handle the chained case" is a compile error,
/// and no code path can mistake a collision marker for a real key.
#[derive(Debug, Clone)]
pub(crate) enum Slot<K, V> {
    Empty,
    Direct(K, V),
    Chained(Chain<K, V>),
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Slot::Empty
    }
}
