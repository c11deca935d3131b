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

//! Exact logarithmic index mapping.

use super::check_relative_accuracy;
use super::IndexMapping;
use super::MappingKind;
use crate::error::Error;

/// Logarithmic index mapping: `index(x) = ceil(log_gamma(x))`.
///
/// Bucket `i` covers `(gamma^(i-1), gamma^i]`, exactly `gamma` wide, so this
/// mapping reaches the accuracy target with the fewest buckets of the three
/// variants at the cost of one `ln` per indexed value. `gamma` is
/// `(1 + alpha)^2`, the widest bucket whose geometric mean representative
/// stays inside the two-sided band `[x / (1 + alpha), x * (1 + alpha)]`
/// for every value `x` in the bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct LogarithmicMapping {
    gamma: f64,
    /// Precomputed `1 / ln(gamma)`.
    multiplier: f64,
    relative_accuracy: f64,
    min_indexable_value: f64,
    max_indexable_value: f64,
}

impl LogarithmicMapping {
    /// Creates a logarithmic mapping with the given relative accuracy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the accuracy is not in (0, 1).
    pub fn new(relative_accuracy: f64) -> Result<Self, Error> {
        check_relative_accuracy(relative_accuracy)?;

        let gamma = (1.0 + relative_accuracy) * (1.0 + relative_accuracy);
        let multiplier = 1.0 / gamma.ln();

        // The indexable range is pinned by i32 index overflow on one side
        // and by the f64 range on the other.
        let min_indexable_value = f64::MIN_POSITIVE.max(gamma.powf(i32::MIN as f64 + 1.0));
        let max_indexable_value = gamma.powf(i32::MAX as f64 - 1.0).min(f64::MAX / gamma);

        Ok(Self {
            gamma,
            multiplier,
            relative_accuracy,
            min_indexable_value,
            max_indexable_value,
        })
    }
}

impl IndexMapping for LogarithmicMapping {
    const KIND: MappingKind = MappingKind::Logarithmic;

    fn from_relative_accuracy(relative_accuracy: f64) -> Result<Self, Error> {
        Self::new(relative_accuracy)
    }

    fn index(&self, value: f64) -> i32 {
        (value.ln() * self.multiplier).ceil() as i32
    }

    fn lower_bound(&self, index: i32) -> f64 {
        self.gamma.powf(index as f64 - 1.0)
    }

    fn relative_accuracy(&self) -> f64 {
        self.relative_accuracy
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn min_indexable_value(&self) -> f64 {
        self.min_indexable_value
    }

    fn max_indexable_value(&self) -> f64 {
        self.max_indexable_value
    }
}
