// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::BTreeMap;

use super::Store;

/// A store backed by an ordered map from bucket index to weight.
///
/// Memory is proportional to the number of populated buckets regardless of
/// how far apart their indices sit, which suits streams whose active
/// buckets are few but widely separated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseStore {
    buckets: BTreeMap<i32, f64>,
    weight: f64,
}

impl SparseStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for SparseStore {
    fn add(&mut self, index: i32, weight: f64) {
        if weight <= 0.0 {
            return;
        }
        *self.buckets.entry(index).or_insert(0.0) += weight;
        self.weight += weight;
    }

    fn total_weight(&self) -> f64 {
        self.weight
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn min_index(&self) -> Option<i32> {
        self.buckets.keys().next().copied()
    }

    fn max_index(&self) -> Option<i32> {
        self.buckets.keys().next_back().copied()
    }

    fn bins_asc(&self) -> Vec<(i32, f64)> {
        self.buckets.iter().map(|(&i, &w)| (i, w)).collect()
    }

    fn merge(&mut self, other: &Self) {
        for (&index, &weight) in &other.buckets {
            self.add(index, weight);
        }
    }

    fn collapse_lowest(&mut self, n: usize) {
        if self.buckets.len() <= 1 || n == 0 {
            return;
        }
        let n = n.min(self.buckets.len() - 1);

        let lowest: Vec<i32> = self.buckets.keys().take(n).copied().collect();
        let mut collapsed = 0.0;
        for index in lowest {
            collapsed += self.buckets.remove(&index).expect("key was just listed");
        }
        let (_, target) = self.buckets.iter_mut().next().expect("at least one bucket survives");
        *target += collapsed;
    }

    fn collapse_highest(&mut self, n: usize) {
        if self.buckets.len() <= 1 || n == 0 {
            return;
        }
        let n = n.min(self.buckets.len() - 1);

        let highest: Vec<i32> = self.buckets.keys().rev().take(n).copied().collect();
        let mut collapsed = 0.0;
        for index in highest {
            collapsed += self.buckets.remove(&index).expect("key was just listed");
        }
        let (_, target) = self.buckets.iter_mut().next_back().expect("at least one bucket survives");
        *target += collapsed;
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.weight = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let mut store = SparseStore::new();
        store.add(100, 1.0);
        store.add(100, 2.5);
        store.add(-100, 1.0);

        assert_eq!(store.total_weight(), 4.5);
        assert_eq!(store.len(), 2);
        assert_eq!(store.bins_asc(), vec![(-100, 1.0), (100, 3.5)]);
    }

    #[test]
    fn test_widely_scattered_indices() {
        let mut store = SparseStore::new();
        store.add(i32::MIN + 1, 1.0);
        store.add(0, 1.0);
        store.add(i32::MAX - 1, 1.0);

        assert_eq!(store.len(), 3);
        assert_eq!(store.min_index(), Some(i32::MIN + 1));
        assert_eq!(store.max_index(), Some(i32::MAX - 1));
    }

    #[test]
    fn test_merge() {
        let mut left = SparseStore::new();
        left.add(0, 1.0);
        left.add(5, 1.0);

        let mut right = SparseStore::new();
        right.add(5, 1.0);
        right.add(10, 1.0);

        left.merge(&right);

        assert_eq!(left.total_weight(), 4.0);
        assert_eq!(left.bins_asc(), vec![(0, 1.0), (5, 2.0), (10, 1.0)]);
    }

    #[test]
    fn test_collapse_lowest_folds_into_survivor() {
        let mut store = SparseStore::new();
        store.add(1, 1.0);
        store.add(10, 2.0);
        store.add(100, 4.0);
        store.add(1000, 8.0);

        store.collapse_lowest(2);

        assert_eq!(store.len(), 2);
        assert_eq!(store.bins_asc(), vec![(100, 7.0), (1000, 8.0)]);
        assert_eq!(store.total_weight(), 15.0);
    }

    #[test]
    fn test_collapse_highest_folds_into_survivor() {
        let mut store = SparseStore::new();
        store.add(1, 1.0);
        store.add(10, 2.0);
        store.add(100, 4.0);
        store.add(1000, 8.0);

        store.collapse_highest(3);

        assert_eq!(store.len(), 1);
        assert_eq!(store.bins_asc(), vec![(1, 15.0)]);
    }

    #[test]
    fn test_collapse_saturates_at_one_bucket() {
        let mut store = SparseStore::new();
        store.add(1, 1.0);

        store.collapse_lowest(5);
        store.collapse_highest(5);

        assert_eq!(store.len(), 1);
        assert_eq!(store.total_weight(), 1.0);
    }

    #[test]
    fn test_clear() {
        let mut store = SparseStore::new();
        store.add(7, 3.0);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.total_weight(), 0.0);
    }
}
