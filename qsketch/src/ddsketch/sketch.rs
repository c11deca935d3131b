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

use super::mapping::IndexMapping;
use super::mapping::LogarithmicMapping;
use super::store::DenseStore;
use super::store::Store;
use crate::error::Error;

/// Which end of the value range to fold when the bucket cap is exceeded.
///
/// Folding an end degrades accuracy only in that region; the opposite tail
/// keeps its full guarantee, and min/max stay exact regardless.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum CollapseStrategy {
    /// Fold the lowest values. Protects high quantiles; the default for
    /// latency-style data where p95/p99 matter most.
    #[default]
    Low = 0,
    /// Fold the highest values. Protects low quantiles.
    High = 1,
    /// Alternate between both ends. For streams whose interesting tail is
    /// unknown up front.
    BothEnds = 2,
    /// Never fold; the cap is not enforced.
    None = 3,
}

impl CollapseStrategy {
    pub(crate) fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CollapseStrategy::Low),
            1 => Some(CollapseStrategy::High),
            2 => Some(CollapseStrategy::BothEnds),
            3 => Some(CollapseStrategy::None),
            _ => None,
        }
    }
}

/// A fast, fully-mergeable quantile sketch with relative-error guarantees.
///
/// Every returned quantile `v` satisfies `|v - v*| <= alpha * |v*|` against
/// the true quantile `v*`, for values outside any collapsed region. The
/// sketch tracks positive and negative values in separate stores, counts
/// near-zero values in a dedicated zero bucket, and keeps exact min, max,
/// sum and total weight.
///
/// The controller is monomorphized over its mapping and store types, so
/// the per-insert path contains no dynamic dispatch.
///
/// # Example
///
/// ```
/// use qsketch::ddsketch::DDSketch;
///
/// let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
/// for i in 1..=100 {
///     sketch.insert(i as f64).unwrap();
/// }
///
/// let median = sketch.quantile(0.5).unwrap();
/// assert!(median >= 49.0 && median <= 53.0);
/// ```
#[derive(Clone, Debug)]
pub struct DDSketch<M: IndexMapping = LogarithmicMapping, S: Store = DenseStore> {
    pub(super) mapping: M,
    pub(super) positive: S,
    pub(super) negative: S,
    pub(super) zero_weight: f64,
    pub(super) weight: f64,
    pub(super) sum: f64,
    pub(super) min: f64,
    pub(super) max: f64,
    pub(super) max_buckets: Option<usize>,
    pub(super) collapse: CollapseStrategy,
    /// BothEnds alternation cursor: `true` folds the low end next.
    pub(super) collapse_low_next: bool,
}

impl DDSketch<LogarithmicMapping, DenseStore> {
    /// Creates an unbounded sketch with a logarithmic mapping, dense
    /// stores, and the default low-collapse strategy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the relative accuracy is not in (0, 1).
    pub fn with_relative_accuracy(relative_accuracy: f64) -> Result<Self, Error> {
        let mapping = LogarithmicMapping::new(relative_accuracy)?;
        Self::new(mapping, None, CollapseStrategy::Low)
    }
}

impl<M: IndexMapping, S: Store> DDSketch<M, S> {
    /// Creates a sketch from a mapping, an optional bucket cap, and a
    /// collapse strategy.
    ///
    /// The cap bounds the combined number of populated buckets across the
    /// positive and negative stores; exceeding it triggers the collapse
    /// strategy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the cap is zero.
    pub fn new(mapping: M, max_buckets: Option<usize>, collapse: CollapseStrategy) -> Result<Self, Error> {
        if max_buckets == Some(0) {
            return Err(Error::config("bucket cap must be positive when set"));
        }
        Ok(Self {
            mapping,
            positive: S::default(),
            negative: S::default(),
            zero_weight: 0.0,
            weight: 0.0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            max_buckets,
            collapse,
            collapse_low_next: true,
        })
    }

    /// Inserts a value with weight 1.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for non-finite values or magnitudes beyond the
    /// mapping's indexable range.
    pub fn insert(&mut self, value: f64) -> Result<(), Error> {
        self.insert_weighted(value, 1.0)
    }

    /// Inserts a value with the given weight.
    ///
    /// A zero weight is a no-op. All validation happens before any state is
    /// touched, so a failed insert leaves the sketch unchanged.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for non-finite values, non-finite or negative
    /// weights, or magnitudes beyond the mapping's indexable range.
    pub fn insert_weighted(&mut self, value: f64, weight: f64) -> Result<(), Error> {
        if !value.is_finite() {
            return Err(Error::out_of_range("value must be finite").with_context("value", value));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::out_of_range("weight must be finite and non-negative").with_context("weight", weight));
        }
        if weight == 0.0 {
            return Ok(());
        }

        let magnitude = value.abs();
        if magnitude > self.mapping.max_indexable_value() {
            return Err(Error::out_of_range("value magnitude exceeds the indexable range")
                .with_context("value", value)
                .with_context("max_indexable", self.mapping.max_indexable_value()));
        }

        if magnitude < self.mapping.min_indexable_value() {
            self.zero_weight += weight;
        } else if value > 0.0 {
            self.positive.add(self.mapping.index(value), weight);
        } else {
            self.negative.add(self.mapping.index(-value), weight);
        }

        self.weight += weight;
        self.sum += value * weight;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        self.enforce_bucket_cap();
        Ok(())
    }

    /// Returns the approximate value at quantile `q`.
    ///
    /// `q = 0` returns the exact minimum and `q = 1` the exact maximum;
    /// everything in between carries the relative-accuracy guarantee
    /// outside collapsed regions. The result is clamped to `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns `EmptySketch` if nothing was inserted, `OutOfRange` if `q`
    /// is outside `[0, 1]`.
    pub fn quantile(&self, q: f64) -> Result<f64, Error> {
        if !(0.0..=1.0).contains(&q) {
            return Err(Error::out_of_range("quantile must be in [0, 1]").with_context("q", q));
        }
        if self.weight == 0.0 {
            return Err(Error::empty_sketch("quantile"));
        }
        if q == 0.0 {
            return Ok(self.min);
        }
        if q == 1.0 {
            return Ok(self.max);
        }

        let target = q * self.weight;
        let mut cumulative = 0.0;

        // Walk the value range upward: most negative buckets first, which
        // in the negative store means descending index order.
        for (index, weight) in self.negative.bins_asc().into_iter().rev() {
            cumulative += weight;
            if cumulative > target {
                return Ok(self.clamp(-self.mapping.value(index)));
            }
        }

        cumulative += self.zero_weight;
        if cumulative > target {
            return Ok(self.clamp(0.0));
        }

        for (index, weight) in self.positive.bins_asc() {
            cumulative += weight;
            if cumulative > target {
                return Ok(self.clamp(self.mapping.value(index)));
            }
        }

        // Accumulated rounding can leave the target unreached by a hair.
        Ok(self.max)
    }

    /// Merges another sketch into this one.
    ///
    /// Merging is commutative and associative; with unbounded caps, a
    /// merged sketch answers exactly like one built by replaying both
    /// streams. The compatibility check precedes all mutation, so a failed
    /// merge leaves both sketches untouched.
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleSketch` if the mappings differ.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.mapping != other.mapping {
            return Err(Error::incompatible("sketches use different index mappings")
                .with_context("left_accuracy", self.mapping.relative_accuracy())
                .with_context("right_accuracy", other.mapping.relative_accuracy()));
        }

        self.positive.merge(&other.positive);
        self.negative.merge(&other.negative);
        self.zero_weight += other.zero_weight;
        self.weight += other.weight;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);

        self.enforce_bucket_cap();
        Ok(())
    }

    /// Returns `true` if the sketch holds no weight.
    pub fn is_empty(&self) -> bool {
        self.weight == 0.0
    }

    /// Returns the total inserted weight.
    pub fn count(&self) -> f64 {
        self.weight
    }

    /// Returns the weighted sum of all inserted values.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Returns the exact minimum inserted value.
    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    /// Returns the exact maximum inserted value.
    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    /// Returns the weight counted in the zero bucket.
    pub fn zero_weight(&self) -> f64 {
        self.zero_weight
    }

    /// Returns the relative accuracy guarantee.
    pub fn relative_accuracy(&self) -> f64 {
        self.mapping.relative_accuracy()
    }

    /// Returns the combined number of populated buckets.
    pub fn num_buckets(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// Returns a reference to the index mapping.
    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Returns the configured bucket cap.
    pub fn max_buckets(&self) -> Option<usize> {
        self.max_buckets
    }

    /// Returns the configured collapse strategy.
    pub fn collapse_strategy(&self) -> CollapseStrategy {
        self.collapse
    }

    /// Clears the sketch, keeping its configuration.
    pub fn clear(&mut self) {
        self.positive.clear();
        self.negative.clear();
        self.zero_weight = 0.0;
        self.weight = 0.0;
        self.sum = 0.0;
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
        self.collapse_low_next = true;
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Folds buckets until the combined store size is back under the cap.
    ///
    /// Each round folds from the end picked by the strategy; a round that
    /// cannot fold anything (both stores down to a single bucket) stops the
    /// loop, so a cap below the number of occupied sign regions is
    /// approached as closely as possible rather than spinning.
    fn enforce_bucket_cap(&mut self) {
        let Some(cap) = self.max_buckets else {
            return;
        };
        if self.collapse == CollapseStrategy::None {
            return;
        }

        loop {
            let size = self.positive.len() + self.negative.len();
            if size <= cap {
                return;
            }
            let excess = size - cap;

            let folded = match self.collapse {
                CollapseStrategy::Low => self.fold_low_end(excess),
                CollapseStrategy::High => self.fold_high_end(excess),
                CollapseStrategy::BothEnds => {
                    let fold_low = self.collapse_low_next;
                    self.collapse_low_next = !fold_low;
                    if fold_low {
                        self.fold_low_end(1)
                    } else {
                        self.fold_high_end(1)
                    }
                }
                CollapseStrategy::None => 0,
            };
            if folded == 0 {
                return;
            }
        }
    }

    /// Folds up to `n` buckets off the low-value end. The lowest values
    /// live in the negative store at its highest indices.
    fn fold_low_end(&mut self, n: usize) -> usize {
        if self.negative.len() > 1 {
            let folded = n.min(self.negative.len() - 1);
            self.negative.collapse_highest(folded);
            folded
        } else if self.positive.len() > 1 {
            let folded = n.min(self.positive.len() - 1);
            self.positive.collapse_lowest(folded);
            folded
        } else {
            0
        }
    }

    /// Folds up to `n` buckets off the high-value end.
    fn fold_high_end(&mut self, n: usize) -> usize {
        if self.positive.len() > 1 {
            let folded = n.min(self.positive.len() - 1);
            self.positive.collapse_highest(folded);
            folded
        } else if self.negative.len() > 1 {
            let folded = n.min(self.negative.len() - 1);
            self.negative.collapse_lowest(folded);
            folded
        } else {
            0
        }
    }

}
