//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Property tests: the skip list must agree with a `BTreeMap` oracle under
//! arbitrary interleavings of inserts and removes.

use proptest::prelude::*;
use std::collections::BTreeMap;
use wiremux::skiplist::SkipList;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A narrow key space so inserts, duplicates and removes collide often.
    prop_oneof![
        (0..64u16, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (0..64u16).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn matches_btreemap_oracle(ops in proptest::collection::vec(op_strategy(), 0..256)) {
        let mut list: SkipList<u16, u32> = SkipList::new();
        let mut oracle: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let inserted = list.insert(key, value);
                    // Duplicate keys are a no-op, matching try_insert.
                    prop_assert_eq!(inserted, !oracle.contains_key(&key));
                    oracle.entry(key).or_insert(value);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(list.remove(&key), oracle.remove(&key));
                }
            }

            prop_assert_eq!(list.len(), oracle.len());
            prop_assert_eq!(list.is_empty(), oracle.is_empty());
            prop_assert_eq!(
                list.front(),
                oracle.first_key_value()
            );
        }

        // Iteration yields every surviving pair in ascending key order.
        let listed: Vec<(u16, u32)> = list.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u32)> = oracle.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(listed, expected);
    }

    #[test]
    fn lookups_agree_with_membership(
        present in proptest::collection::btree_set(0..128u16, 0..64),
        probes in proptest::collection::vec(0..128u16, 0..64),
    ) {
        let mut list: SkipList<u16, u16> = SkipList::new();
        for &key in &present {
            list.insert(key, key.wrapping_mul(3));
        }

        for key in probes {
            if present.contains(&key) {
                prop_assert_eq!(list.get(&key), Some(&(key.wrapping_mul(3))));
            } else {
                prop_assert_eq!(list.get(&key), None);
            }
        }
    }

    #[test]
    fn capped_height_preserves_order(keys in proptest::collection::btree_set(any::<u64>(), 0..128)) {
        // A tiny max level forces long same-level runs.
        let mut list: SkipList<u64, ()> = SkipList::with_max_level(2);
        for &key in &keys {
            list.insert(key, ());
        }

        let listed: Vec<u64> = list.iter().map(|(k, _)| *k).collect();
        let expected: Vec<u64> = keys.into_iter().collect();
        prop_assert_eq!(listed, expected);
    }
}
