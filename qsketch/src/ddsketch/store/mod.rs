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

//! Bucket stores.
//!
//! A store maps bucket indices to positive weights. [`DenseStore`] backs
//! the mapping with a contiguous array keyed by offset from a base index
//! and suits streams whose active bucket range is narrow; [`SparseStore`]
//! uses an ordered map and suits streams whose buckets are few but widely
//! scattered.
//!
//! Stores hold no policy: the sketch controller decides when to collapse
//! and which end to fold, and the stores provide the collapse primitives.

mod dense;
mod sparse;

pub use self::dense::DenseStore;
pub use self::sparse::SparseStore;

/// Storage for bucketed weights.
///
/// Invariants common to all implementations:
///
/// - no zero-weight bucket is ever reported or retained;
/// - `total_weight` equals the sum of all bucket weights exactly, and
///   collapsing preserves it bit-for-bit (weights move, nothing is
///   re-added);
/// - `collapse_lowest(n)` folds the `n` lowest-indexed populated buckets
///   into the next populated bucket above them, shrinking `len` by `n`
///   (`n` saturates at `len - 1`); `collapse_highest` is symmetric.
pub trait Store: Clone + Default + Send + Sync {
    /// Adds weight to the bucket at the given index.
    ///
    /// Non-positive weights are ignored; the caller validates them.
    fn add(&mut self, index: i32, weight: f64);

    /// Returns the total weight across all buckets.
    fn total_weight(&self) -> f64;

    /// Returns the number of populated buckets.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no weight.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the lowest populated index, or `None` if empty.
    fn min_index(&self) -> Option<i32>;

    /// Returns the highest populated index, or `None` if empty.
    fn max_index(&self) -> Option<i32>;

    /// Returns the populated buckets in ascending index order.
    ///
    /// The result iterates both ways; callers wanting descending order
    /// reverse it.
    fn bins_asc(&self) -> Vec<(i32, f64)>;

    /// Merges another store into this one, summing shared buckets.
    fn merge(&mut self, other: &Self);

    /// Collapses the `n` lowest-indexed populated buckets into the next
    /// populated bucket above them.
    fn collapse_lowest(&mut self, n: usize);

    /// Collapses the `n` highest-indexed populated buckets into the next
    /// populated bucket below them.
    fn collapse_highest(&mut self, n: usize);

    /// Removes all buckets.
    fn clear(&mut self);
}
