//! End-to-end scenarios exercising the map as a whole, one test per concrete scenario in the
//! design notes rather than a mechanical grid of encode/decode round trips.

use flathash::Map;

#[test]
fn scenario_1_small_insert_triggers_one_growth() {
    // A capacity hint of 4 at load factor 0.75 rounds up to a table of 8 slots with
    // max_size = min(7, floor(8 * 0.75)) = 6, so the 7th distinct insert must grow the table.
    let mut map = Map::with_capacity_and_load(4, 0.75);
    let initial_capacity = map.capacity();
    assert_eq!(initial_capacity, 8);
    for i in 1..=7 {
        map.put(i, format!("v{i}"));
    }
    assert_eq!(map.len(), 7);
    assert!(map.capacity() > initial_capacity);
    assert!(map.capacity() >= 16);
    for i in 1..=7 {
        assert_eq!(map.get(&i), Some(&format!("v{i}")));
    }
}

#[test]
fn scenario_2_option_typed_key_and_value_admit_none() {
    let mut map: Map<Option<i32>, Option<&str>> = Map::new();
    map.put(None, Some("a"));
    map.put(Some(1), None);

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&None), Some(&Some("a")));
    assert_eq!(map.get(&Some(1)), Some(&None));
    assert!(map.contains_key(&None));
    assert!(map.contains_key(&Some(1)));
}

#[test]
fn scenario_3_colliding_keys_form_one_chain_and_compact_on_removal() {
    // A hasher that always returns 0 forces every key onto the same slot regardless of capacity.
    #[derive(Default, Clone)]
    struct ZeroHasher;
    impl std::hash::Hasher for ZeroHasher {
        fn finish(&self) -> u64 {
            0
        }
        fn write(&mut self, _bytes: &[u8]) {}
    }
    #[derive(Default, Clone)]
    struct ZeroHasherBuilder;
    impl std::hash::BuildHasher for ZeroHasherBuilder {
        type Hasher = ZeroHasher;
        fn build_hasher(&self) -> ZeroHasher {
            ZeroHasher
        }
    }

    let mut map = Map::with_capacity_and_load_and_hasher(128, 0.75, ZeroHasherBuilder);
    for i in 0..100 {
        map.put(i, i * 10);
    }
    assert_eq!(map.len(), 100);
    assert_eq!(map.colliding_buckets(), 1);
    for i in 0..100 {
        assert_eq!(map.get(&i), Some(&(i * 10)));
    }

    // Remove a non-tail entry; the remaining 99 keys must all still be retrievable, meaning the
    // tail was compacted into the vacated slot rather than losing an entry.
    assert_eq!(map.remove(&17), Some(170));
    assert_eq!(map.len(), 99);
    for i in 0..100 {
        if i == 17 {
            assert_eq!(map.get(&i), None);
        } else {
            assert_eq!(map.get(&i), Some(&(i * 10)));
        }
    }
}

#[test]
fn scenario_4_remove_every_other_entry_through_cursor() {
    let mut map = Map::with_capacity_and_load(8, 0.75);
    for i in 0..64 {
        map.put(i, i);
    }
    assert_eq!(map.len(), 64);

    let mut seen = std::collections::HashSet::new();
    let mut cursor = map.cursor_mut();
    let mut n = 0usize;
    while let Some((k, _)) = cursor.next() {
        assert!(seen.insert(*k), "key {k} was yielded more than once");
        if n % 2 == 0 {
            cursor.remove_last();
        }
        n += 1;
    }
    assert_eq!(n, 64, "every live entry should be yielded exactly once");
    assert_eq!(map.len(), 32);
}

#[cfg(feature = "serialize")]
#[test]
fn scenario_5_serialize_round_trips_a_ten_entry_map() {
    let mut map: Map<String, i32> = Map::new();
    for i in 0..10 {
        map.put(format!("key-{i}"), i);
    }
    let bytes = flathash::to_bytes(&map).unwrap();
    let restored: Map<String, i32> = flathash::from_bytes(&bytes).unwrap();

    assert_eq!(restored.len(), map.len());
    let mut original_keys: Vec<_> = map.keys().cloned().collect();
    let mut restored_keys: Vec<_> = restored.keys().cloned().collect();
    original_keys.sort();
    restored_keys.sort();
    assert_eq!(original_keys, restored_keys);
    for (k, v) in map.iter() {
        assert_eq!(restored.get(k.as_str()), Some(v));
    }
}

#[test]
fn scenario_6_keys_view_retain_all() {
    let mut map: Map<i32, &str> = Map::new();
    map.put(1, "one");
    map.put(2, "two");
    map.put(3, "three");
    map.put(4, "four");
    map.put(5, "five");

    let keep = [1, 3, 5];
    let changed = map.keys_view().retain_all(|k| keep.contains(k));

    assert!(changed);
    assert_eq!(map.len(), 3);
    for k in keep {
        assert!(map.contains_key(&k));
    }
    for k in [2, 4] {
        assert!(!map.contains_key(&k));
    }
}
