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

//! Moment sketch: quantiles from power sums.
//!
//! The sketch summarizes a stream by its first `k` weighted power sums
//! (and optionally the power sums of the log-transformed values) plus
//! exact min and max. Merging is component-wise vector addition, making
//! this the cheapest possible summary to ship between shards: `O(k)`
//! space and `O(k)` merge.
//!
//! Queries reconstruct the density of maximum entropy subject to the
//! moment constraints (Newton iteration on the convex dual, conditioned
//! by a Chebyshev-polynomial basis over the observed support) and then
//! invert its CDF for the requested quantile.
//!
//! # Usage
//!
//! ```rust
//! # use qsketch::moments::MomentSketch;
//! let mut sketch = MomentSketch::with_log_mode(10).unwrap();
//! for i in 1..=100 {
//!     sketch.insert(i as f64).unwrap();
//! }
//! let p99 = sketch.quantile(0.99).unwrap();
//! assert!(p99 > 90.0);
//! ```

mod chebyshev;
mod inverter;
mod quadrature;
mod serialization;
mod sketch;
mod solver;

pub use self::sketch::MomentSketch;

/// Minimum number of tracked moments.
pub const MIN_K: usize = 4;
/// Maximum number of tracked moments.
pub const MAX_K: usize = 20;
/// Convergence threshold on the dual gradient's infinity norm.
pub const SOLVER_EPSILON: f64 = 1e-9;
/// Newton iteration budget per fallback level.
pub const SOLVER_MAX_ITERATIONS: usize = 200;
/// Tolerance on the inverted CDF residual.
pub const INVERTER_EPSILON: f64 = 1e-6;
