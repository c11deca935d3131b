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

use super::chebyshev;
use super::inverter;
use super::solver;
use super::INVERTER_EPSILON;
use super::MAX_K;
use super::MIN_K;
use super::SOLVER_EPSILON;
use super::SOLVER_MAX_ITERATIONS;
use crate::error::Error;

/// A fixed-size quantile summary built from power sums.
///
/// The sketch keeps the first `k` weighted power sums of the stream,
/// `sum_i w_i * x_i^j` for `j = 0 .. k-1`, in `O(k)` space, together with
/// exact min and max. Quantile queries reconstruct the density of maximum
/// entropy consistent with those moments and invert its CDF.
///
/// With log mode on, the sketch additionally accumulates the power sums of
/// `ln x`, which condition the reconstruction far better when the data
/// spans many orders of magnitude. Log moments require strictly positive
/// samples: the first non-positive sample disables them for the rest of
/// the sketch's life and queries fall back to the raw moments.
///
/// Note that `power_sums[0]` is the total weight and `power_sums[1]` the
/// weighted sum, so the summary statistics ride along with the moments.
///
/// # Example
///
/// ```
/// use qsketch::moments::MomentSketch;
///
/// let mut sketch = MomentSketch::new(10).unwrap();
/// for i in 1..=1000 {
///     sketch.insert(i as f64).unwrap();
/// }
///
/// let median = sketch.quantile(0.5).unwrap();
/// assert!(median > 400.0 && median < 600.0);
/// ```
#[derive(Clone, Debug)]
pub struct MomentSketch {
    pub(super) k: usize,
    pub(super) power_sums: Vec<f64>,
    pub(super) log_sums: Vec<f64>,
    /// Whether log moments were requested at construction.
    pub(super) log_mode: bool,
    /// Whether log moments are still maintainable; cleared permanently by
    /// the first non-positive sample.
    pub(super) logs_enabled: bool,
    pub(super) min: f64,
    pub(super) max: f64,
    pub(super) log_min: f64,
    pub(super) log_max: f64,
}

impl MomentSketch {
    /// Creates a sketch tracking `k` moments, without log moments.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` unless `MIN_K <= k <= MAX_K`.
    pub fn new(k: usize) -> Result<Self, Error> {
        Self::with_config(k, false)
    }

    /// Creates a sketch tracking `k` moments of the values and of their
    /// logarithms.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` unless `MIN_K <= k <= MAX_K`.
    pub fn with_log_mode(k: usize) -> Result<Self, Error> {
        Self::with_config(k, true)
    }

    fn with_config(k: usize, log_mode: bool) -> Result<Self, Error> {
        if !(MIN_K..=MAX_K).contains(&k) {
            return Err(Error::config(format!("k must be in [{MIN_K}, {MAX_K}]")).with_context("k", k));
        }
        Ok(Self {
            k,
            power_sums: vec![0.0; k],
            log_sums: vec![0.0; k],
            log_mode,
            logs_enabled: log_mode,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            log_min: f64::INFINITY,
            log_max: f64::NEG_INFINITY,
        })
    }

    /// Inserts a value with weight 1.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for non-finite values.
    pub fn insert(&mut self, value: f64) -> Result<(), Error> {
        self.insert_weighted(value, 1.0)
    }

    /// Inserts a value with the given weight.
    ///
    /// A zero weight is a no-op. Validation precedes mutation, so a failed
    /// insert leaves the sketch unchanged.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for non-finite values or non-finite or
    /// negative weights.
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

        let mut term = weight;
        for slot in self.power_sums.iter_mut() {
            *slot += term;
            term *= value;
        }

        if self.logs_enabled {
            if value > 0.0 {
                let log_value = value.ln();
                let mut term = weight;
                for slot in self.log_sums.iter_mut() {
                    *slot += term;
                    term *= log_value;
                }
                self.log_min = self.log_min.min(log_value);
                self.log_max = self.log_max.max(log_value);
            } else {
                self.logs_enabled = false;
            }
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        Ok(())
    }

    /// Merges another sketch into this one by component-wise summation of
    /// the moment vectors.
    ///
    /// Log moments survive only if both sides still maintain them. The
    /// compatibility check precedes all mutation.
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleSketch` if the moment counts differ.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.k != other.k {
            return Err(Error::incompatible("sketches track different moment counts")
                .with_context("left_k", self.k)
                .with_context("right_k", other.k));
        }

        for (slot, term) in self.power_sums.iter_mut().zip(other.power_sums.iter()) {
            *slot += term;
        }
        for (slot, term) in self.log_sums.iter_mut().zip(other.log_sums.iter()) {
            *slot += term;
        }
        self.logs_enabled = self.logs_enabled && other.logs_enabled;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.log_min = self.log_min.min(other.log_min);
        self.log_max = self.log_max.max(other.log_max);
        Ok(())
    }

    /// Returns the approximate value at quantile `q`.
    ///
    /// `q = 0` returns the exact minimum and `q = 1` the exact maximum.
    /// Interior quantiles reconstruct the maximum-entropy density over
    /// `[min, max]` (or `[log min, log max]` when log moments are live)
    /// and invert its CDF; the result is clamped to `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns `EmptySketch` if nothing was inserted, `OutOfRange` if `q`
    /// is outside `[0, 1]`, and `NonConvergence` if the solver fails after
    /// dropping back to its smallest moment count.
    pub fn quantile(&self, q: f64) -> Result<f64, Error> {
        if !(0.0..=1.0).contains(&q) {
            return Err(Error::out_of_range("quantile must be in [0, 1]").with_context("q", q));
        }
        if self.is_empty() {
            return Err(Error::empty_sketch("quantile"));
        }
        if q == 0.0 || self.min == self.max {
            return Ok(self.min);
        }
        if q == 1.0 {
            return Ok(self.max);
        }

        let use_logs = self.logs_enabled && self.log_min < self.log_max;
        let (sums, low, high) = if use_logs {
            (&self.log_sums, self.log_min, self.log_max)
        } else {
            (&self.power_sums, self.min, self.max)
        };

        let moments = chebyshev::chebyshev_moments(sums, low, high);
        let solution = solver::solve(&moments, SOLVER_EPSILON, SOLVER_MAX_ITERATIONS)?;
        let y = inverter::invert_cdf(&solution, q, INVERTER_EPSILON);

        let mut value = low + (y + 1.0) * (high - low) / 2.0;
        if use_logs {
            value = value.exp();
        }
        Ok(value.clamp(self.min, self.max))
    }

    /// Returns `true` if the sketch holds no weight.
    pub fn is_empty(&self) -> bool {
        self.power_sums[0] == 0.0
    }

    /// Returns the total inserted weight.
    pub fn count(&self) -> f64 {
        self.power_sums[0]
    }

    /// Returns the weighted sum of all inserted values.
    pub fn sum(&self) -> f64 {
        self.power_sums[1]
    }

    /// Returns the exact minimum inserted value.
    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    /// Returns the exact maximum inserted value.
    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    /// Returns the number of tracked moments.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns `true` if log moments were requested at construction.
    pub fn log_mode(&self) -> bool {
        self.log_mode
    }

    /// Returns `true` if log moments are still maintainable.
    pub fn logs_enabled(&self) -> bool {
        self.logs_enabled
    }

    /// Clears the sketch, keeping its configuration.
    pub fn clear(&mut self) {
        self.power_sums.fill(0.0);
        self.log_sums.fill(0.0);
        self.logs_enabled = self.log_mode;
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
        self.log_min = f64::INFINITY;
        self.log_max = f64::NEG_INFINITY;
    }
}
