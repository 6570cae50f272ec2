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

//! A probabilistically balanced ordered map.
//!
//! [`SkipList`] keeps its entries in ascending key order using randomized
//! forward pointers instead of tree rebalancing. Insert, lookup, and removal
//! are expected `O(log n)`, and ascending iteration advances in amortized
//! `O(1)` per entry, which makes it a good fit for "visit everything due by
//! now, then stop" scans such as the multiplexer's expiry sweep.
//!
//! The implementation is 100% safe Rust: nodes live in an index-addressed
//! arena with a free list, rather than behind raw pointers.

use rand::Rng;

/// Probability that a node is promoted one level higher.
const LEVEL_PROBABILITY: f64 = 0.5;

/// Default cap on node height.
const DEFAULT_MAX_LEVEL: usize = 16;

/// Sentinel arena index meaning "no node".
const NIL: usize = usize::MAX;

/// Sentinel arena index naming the head tower.
const HEAD: usize = usize::MAX - 1;

/// One entry in the list: a key, its value, and one forward pointer per
/// level the node participates in (`forward.len()` is the node's height + 1).
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    forward: Vec<usize>,
}

/// An ordered map backed by a skip list.
///
/// Entries are kept in strictly ascending key order. Inserting a key that is
/// already present is a no-op: the stored value is not overwritten. Callers
/// that need several values per key store an aggregate (for example a `Vec`)
/// as the value.
///
/// # Example
///
/// ```rust
/// use wiremux::skiplist::SkipList;
///
/// let mut list = SkipList::new();
/// list.insert(3, "three");
/// list.insert(1, "one");
/// list.insert(2, "two");
///
/// let keys: Vec<i32> = list.iter().map(|(k, _)| *k).collect();
/// assert_eq!(keys, vec![1, 2, 3]);
///
/// assert_eq!(list.remove(&2), Some("two"));
/// assert_eq!(list.get(&2), None);
/// ```
#[derive(Debug)]
pub struct SkipList<K, V> {
    /// Forward pointers of the head sentinel, one per possible level.
    head: Vec<usize>,
    /// Node arena. `None` slots are free and tracked in `free`.
    nodes: Vec<Option<Node<K, V>>>,
    /// Indices of vacated arena slots, reused before the arena grows.
    free: Vec<usize>,
    /// Highest level that currently has at least one node.
    level: usize,
    /// Number of live entries.
    len: usize,
    /// Cap on node height.
    max_level: usize,
}

impl<K: Ord, V> SkipList<K, V> {
    /// Creates an empty skip list with the default maximum level of 16.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_level(DEFAULT_MAX_LEVEL)
    }

    /// Creates an empty skip list with a custom maximum level.
    ///
    /// The maximum level caps node height; `16` is comfortable for millions
    /// of entries. Small values degrade toward a linked list.
    #[must_use]
    pub fn with_max_level(max_level: usize) -> Self {
        Self {
            head: vec![NIL; max_level + 1],
            nodes: Vec::new(),
            free: Vec::new(),
            level: 0,
            len: 0,
            max_level,
        }
    }

    /// Returns the number of entries in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a key/value pair, keeping ascending key order.
    ///
    /// If an entry with an equal key already exists the call is a no-op and
    /// the existing value is left untouched. Returns `true` if the entry was
    /// inserted, `false` if the key was already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let mut update = vec![HEAD; self.max_level + 1];
        let target = self.descend(&key, Some(&mut update));

        if target != NIL && self.node(target).key == key {
            return false;
        }

        let height = self.random_height();
        if height > self.level {
            // update[] is prefilled with HEAD, so the new levels already
            // splice off the sentinel.
            self.level = height;
        }

        let idx = self.alloc(Node {
            key,
            value,
            forward: vec![NIL; height + 1],
        });
        for lvl in 0..=height {
            let next = self.forward_of(update[lvl], lvl);
            self.node_mut(idx).forward[lvl] = next;
            self.set_forward(update[lvl], lvl, idx);
        }
        self.len += 1;
        true
    }

    /// Returns a reference to the value stored under `key`, if present.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let target = self.descend(key, None);
        if target != NIL && self.node(target).key == *key {
            Some(&self.node(target).value)
        } else {
            None
        }
    }

    /// Returns a mutable reference to the value stored under `key`, if
    /// present.
    #[must_use]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let target = self.descend(key, None);
        if target != NIL && self.node(target).key == *key {
            Some(&mut self.node_mut(target).value)
        } else {
            None
        }
    }

    /// Returns the entry with the smallest key, if any.
    #[must_use]
    pub fn front(&self) -> Option<(&K, &V)> {
        if self.head[0] == NIL {
            None
        } else {
            let node = self.node(self.head[0]);
            Some((&node.key, &node.value))
        }
    }

    /// Removes the entry stored under `key` and returns its value.
    ///
    /// Removing an absent key is a no-op returning `None`.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut update = vec![HEAD; self.max_level + 1];
        let target = self.descend(key, Some(&mut update));

        if target == NIL || self.node(target).key != *key {
            return None;
        }

        for lvl in 0..=self.level {
            if self.forward_of(update[lvl], lvl) != target {
                // Levels above the node's height never point at it.
                break;
            }
            let next = self.node(target).forward[lvl];
            self.set_forward(update[lvl], lvl, next);
        }

        // Shrink the active level until the head's top level is populated.
        while self.level > 0 && self.head[self.level] == NIL {
            self.level -= 1;
        }

        self.len -= 1;
        let node = self.nodes[target].take()?;
        self.free.push(target);
        Some(node.value)
    }

    /// Returns a lazy ascending iterator over the entries.
    ///
    /// The iterator walks level-0 pointers in strictly ascending key order.
    /// It is a single, non-restartable pass: breaking out of a `for` loop
    /// abandons the remaining entries, and a fresh call to `iter` starts
    /// over from the smallest key.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            next: self.head[0],
        }
    }

    /// Walks from the highest active level down to level 0, at each level
    /// advancing while the next key is still less than `key`. Records the
    /// last node visited per level into `update` when provided, and returns
    /// the level-0 successor (the first node with key >= `key`, or `NIL`).
    fn descend(&self, key: &K, mut update: Option<&mut Vec<usize>>) -> usize {
        let mut at = HEAD;
        for lvl in (0..=self.level).rev() {
            loop {
                let next = self.forward_of(at, lvl);
                if next != NIL && self.node(next).key < *key {
                    at = next;
                } else {
                    break;
                }
            }
            if let Some(update) = update.as_deref_mut() {
                update[lvl] = at;
            }
        }
        self.forward_of(at, 0)
    }

    /// Flips a fair coin until it comes up tails, capped at `max_level`.
    fn random_height(&self) -> usize {
        let mut rng = rand::thread_rng();
        let mut height = 0;
        while height < self.max_level && rng.gen_bool(LEVEL_PROBABILITY) {
            height += 1;
        }
        height
    }

    fn forward_of(&self, at: usize, lvl: usize) -> usize {
        if at == HEAD {
            self.head[lvl]
        } else {
            self.node(at).forward[lvl]
        }
    }

    fn set_forward(&mut self, at: usize, lvl: usize, to: usize) {
        if at == HEAD {
            self.head[lvl] = to;
        } else {
            self.node_mut(at).forward[lvl] = to;
        }
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        self.nodes[idx]
            .as_ref()
            .expect("skip pointer targets a vacant arena slot")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        self.nodes[idx]
            .as_mut()
            .expect("skip pointer targets a vacant arena slot")
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ascending iterator over a [`SkipList`], created by [`SkipList::iter`].
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    list: &'a SkipList<K, V>,
    next: usize,
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NIL {
            return None;
        }
        let node = self.list.node(self.next);
        self.next = node.forward[0];
        Some((&node.key, &node.value))
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a SkipList<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
