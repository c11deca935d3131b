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

//! Linearly interpolated index mapping.

use super::check_relative_accuracy;
use super::decompose;
use super::recompose;
use super::IndexMapping;
use super::MappingKind;
use crate::error::Error;

/// Index mapping that interpolates `log2` linearly between powers of two.
///
/// For `x = 2^e * (1 + s)` with `s` in `[0, 1)`, the approximate logarithm
/// is `l(x) = e + s`, read straight off the IEEE-754 representation with no
/// transcendental call.
///
/// A bucket of width `h` in `l`-space spans a value ratio of at most
/// `1 + h` (tight at octave starts). Buckets are sized `h = ln(gamma)`
/// with `gamma = (1 + alpha)^2`, keeping the worst-case ratio
/// `1 + ln(gamma)` strictly below `gamma`, so the lower-bound-times-
/// `(1 + alpha)` representative stays inside the two-sided band with
/// margin. The interpolation distortion is absorbed by the shrunken
/// effective base, at ~1.44x the bucket density of the logarithmic
/// mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearInterpolationMapping {
    gamma: f64,
    /// Index units per `l`-unit: `1 / ln(gamma)`.
    multiplier: f64,
    relative_accuracy: f64,
    min_indexable_value: f64,
    max_indexable_value: f64,
}

impl LinearInterpolationMapping {
    /// Creates a linearly interpolated mapping with the given relative
    /// accuracy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the accuracy is not in (0, 1).
    pub fn new(relative_accuracy: f64) -> Result<Self, Error> {
        check_relative_accuracy(relative_accuracy)?;

        let gamma = (1.0 + relative_accuracy) * (1.0 + relative_accuracy);
        let multiplier = 1.0 / gamma.ln();

        let min_indexable_value =
            f64::MIN_POSITIVE.max(approximate_inverse((i32::MIN as f64 + 1.0) / multiplier));
        let max_indexable_value =
            approximate_inverse((i32::MAX as f64 - 1.0) / multiplier).min(f64::MAX / gamma);

        Ok(Self {
            gamma,
            multiplier,
            relative_accuracy,
            min_indexable_value,
            max_indexable_value,
        })
    }
}

/// Piecewise-linear `log2` approximation.
#[inline]
fn approximate_log(value: f64) -> f64 {
    let (exponent, significand) = decompose(value);
    exponent as f64 + significand
}

/// Exact functional inverse of [`approximate_log`].
#[inline]
fn approximate_inverse(value: f64) -> f64 {
    let exponent = value.floor();
    recompose(exponent, value - exponent)
}

impl IndexMapping for LinearInterpolationMapping {
    const KIND: MappingKind = MappingKind::LinearInterpolation;

    fn from_relative_accuracy(relative_accuracy: f64) -> Result<Self, Error> {
        Self::new(relative_accuracy)
    }

    fn index(&self, value: f64) -> i32 {
        (approximate_log(value) * self.multiplier).ceil() as i32
    }

    fn lower_bound(&self, index: i32) -> f64 {
        approximate_inverse((index as f64 - 1.0) / self.multiplier)
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
