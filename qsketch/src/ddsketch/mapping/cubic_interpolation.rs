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

//! Cubically interpolated index mapping.

use super::check_relative_accuracy;
use super::decompose;
use super::recompose;
use super::IndexMapping;
use super::MappingKind;
use crate::error::Error;

// Minimax cubic fit of log2(1 + s) on [0, 1). A + B + C = 1 keeps the
// approximation continuous across octave boundaries.
const A: f64 = 6.0 / 35.0;
const B: f64 = -3.0 / 5.0;
const C: f64 = 10.0 / 7.0;

/// Index mapping that interpolates `log2` with a cubic polynomial.
///
/// For `x = 2^e * (1 + s)`, the approximate logarithm is
/// `l(x) = e + A*s^3 + B*s^2 + C*s`. The slope of the approximation
/// against the natural logarithm bottoms out at `10/7` (at `s = 0` and
/// `s = 2/3`), so buckets sized `(10/7) * ln(gamma)` in `l`-space keep
/// the worst-case bucket value ratio at `gamma = (1 + alpha)^2`, the
/// widest ratio the two-sided band representative tolerates. That costs
/// only ~1% more buckets than the exact logarithmic mapping, still
/// without a transcendental call per insert.
#[derive(Clone, Debug, PartialEq)]
pub struct CubicInterpolationMapping {
    gamma: f64,
    /// Index units per `l`-unit: `7 / (10 * ln(gamma))`.
    multiplier: f64,
    relative_accuracy: f64,
    min_indexable_value: f64,
    max_indexable_value: f64,
}

impl CubicInterpolationMapping {
    /// Creates a cubically interpolated mapping with the given relative
    /// accuracy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if the accuracy is not in (0, 1).
    pub fn new(relative_accuracy: f64) -> Result<Self, Error> {
        check_relative_accuracy(relative_accuracy)?;

        let gamma = (1.0 + relative_accuracy) * (1.0 + relative_accuracy);
        let multiplier = 7.0 / (10.0 * gamma.ln());

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

/// Cubic `log2` approximation.
#[inline]
fn approximate_log(value: f64) -> f64 {
    let (exponent, s) = decompose(value);
    exponent as f64 + ((A * s + B) * s + C) * s
}

/// Inverse of [`approximate_log`], solving the cubic with Cardano's
/// formula. The cubic's discriminant is negative over the whole octave, so
/// there is a single real root and the formula needs no branch selection.
#[inline]
fn approximate_inverse(value: f64) -> f64 {
    let exponent = value.floor();
    let frac = value - exponent;

    let d0 = B * B - 3.0 * A * C;
    let d1 = 2.0 * B * B * B - 9.0 * A * B * C - 27.0 * A * A * frac;
    let p = ((d1 - (d1 * d1 - 4.0 * d0 * d0 * d0).sqrt()) / 2.0).cbrt();
    let significand = -(B + p + d0 / p) / (3.0 * A);

    recompose(exponent, significand)
}

impl IndexMapping for CubicInterpolationMapping {
    const KIND: MappingKind = MappingKind::CubicInterpolation;

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
