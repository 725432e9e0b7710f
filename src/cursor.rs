use crate::slot::Slot;
use std::mem;

/// Tracks which slot (and, if inside a chain, which position within it) produced the most
/// recently yielded pair, so [`EntryCursor::remove_last`] knows what to compact.
enum LastYield {
    Direct(usize),
    Chain(usize, usize),
}

/// A streaming, mutation-aware traversal over every live entry in a map.
///
/// Walking it in lock-step with `next()`/`remove_last()` lets a caller delete the entry it just
/// visited without restarting the scan. It is not a [`std::iter::Iterator`] on purpose — removal
/// needs a second call borrowing the same state `next()` just produced, which the `Iterator`
/// trait has no room for.
pub struct EntryCursor<'a, K, V> {
    slots: &'a mut [Slot<K, V>],
    occupied: &'a mut usize,
    count: usize,
    position: usize,
    chain_position: usize,
    last: Option<LastYield>,
}

impl<'a, K, V> EntryCursor<'a, K, V> {
    pub(crate) fn new(slots: &'a mut [Slot<K, V>], occupied: &'a mut usize) -> Self {
        EntryCursor {
            slots,
            occupied,
            count: 0,
            position: 0,
            chain_position: 0,
            last: None,
        }
    }

    /// Number of entries already yielded by this cursor.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Advances to the next live entry, if any.
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        loop {
            if self.chain_position != 0 {
                let idx = self.position;
                let Slot::Chained(chain) = &mut self.slots[idx] else {
                    self.chain_position = 0;
                    self.position += 1;
                    continue;
                };
                if self.chain_position >= chain.len() {
                    self.chain_position = 0;
                    self.position += 1;
                    continue;
                }
                let pos = self.chain_position;
                self.chain_position += 1;
                if self.chain_position >= chain.len() {
                    self.chain_position = 0;
                    self.position += 1;
                }
                self.count += 1;
                self.last = Some(LastYield::Chain(idx, pos));
                let (k, v) = chain.pair_mut(pos);
                return Some((k, v));
            }

            if self.position >= self.slots.len() {
                return None;
            }

            match &mut self.slots[self.position] {
                Slot::Empty => {
                    self.position += 1;
                    continue;
                }
                Slot::Direct(_, _) => {
                    let idx = self.position;
                    self.position += 1;
                    self.count += 1;
                    self.last = Some(LastYield::Direct(idx));
                    let Slot::Direct(k, v) = &mut self.slots[idx] else {
                        unreachable!("slot just matched as Direct")
                    };
                    return Some((k, v));
                }
                Slot::Chained(chain) => {
                    if chain.is_empty() {
                        self.position += 1;
                        continue;
                    }
                    let idx = self.position;
                    self.chain_position = if chain.len() > 1 { 1 } else { 0 };
                    if self.chain_position == 0 {
                        self.position += 1;
                    }
                    self.count += 1;
                    self.last = Some(LastYield::Chain(idx, 0));
                    let Slot::Chained(chain) = &mut self.slots[idx] else {
                        unreachable!("slot just matched as Chained")
                    };
                    let (k, v) = chain.pair_mut(0);
                    return Some((k, v));
                }
            }
        }
    }

    /// Removes the entry produced by the most recent [`EntryCursor::next`] call, if any, and
    /// rewinds the cursor so the entry compaction swaps into its place is not skipped.
    ///
    /// Calling this without a preceding `next()`, or twice in a row, is a no-op that returns
    /// `None` rather than a misuse error: the cursor holds the map by exclusive borrow, so there
    /// is no concurrent-mutation hazard for it to detect in the first place.
    pub fn remove_last(&mut self) -> Option<V> {
        match self.last.take()? {
            LastYield::Direct(idx) => match mem::replace(&mut self.slots[idx], Slot::Empty) {
                Slot::Direct(_, v) => {
                    *self.occupied -= 1;
                    self.count -= 1;
                    Some(v)
                }
                other => {
                    self.slots[idx] = other;
                    None
                }
            },
            LastYield::Chain(idx, pos) => {
                let still_inside = self.position == idx;
                let Slot::Chained(chain) = &mut self.slots[idx] else {
                    return None;
                };
                let removed = chain.remove_at(pos)?;
                *self.occupied -= 1;
                self.count -= 1;
                // Only rewind if `next()` has not yet left this slot: otherwise `chain_position`
                // belongs to whatever slot `self.position` now points at, and stamping it with
                // `pos` here would make that unrelated slot look mid-chain.
                if still_inside {
                    self.chain_position = pos;
                }
                if chain.is_empty() {
                    self.slots[idx] = Slot::Empty;
                }
                Some(removed)
            }
        }
    }
}
