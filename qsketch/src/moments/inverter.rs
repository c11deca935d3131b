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

//! Quantile extraction from a reconstructed density.

use super::solver::MaxEntropySolution;

const MAX_ITERATIONS: usize = 200;

/// Solves `F(y) = q * mass` for `y` on `[-1, 1]`.
///
/// Newton steps from the density are taken whenever they stay inside the
/// current bracket and the density is informative; otherwise the step
/// falls back to bisection, so the iteration cannot escape or stall.
pub(crate) fn invert_cdf(solution: &MaxEntropySolution, q: f64, epsilon: f64) -> f64 {
    let mass = solution.mass();
    let target = q * mass;

    let mut low = -1.0f64;
    let mut high = 1.0f64;
    // The CDF of the uniform start point doubles as a reasonable guess.
    let mut y = 2.0 * q - 1.0;

    for _ in 0..MAX_ITERATIONS {
        let cumulative = solution.cdf(y);
        let residual = cumulative - target;

        if residual.abs() <= epsilon * mass {
            return y;
        }
        if residual > 0.0 {
            high = y;
        } else {
            low = y;
        }

        let density = solution.density(y);
        let newton = y - residual / density;
        y = if density > 0.0 && newton > low && newton < high {
            newton
        } else {
            (low + high) / 2.0
        };

        if high - low < f64::EPSILON {
            return y;
        }
    }

    y
}
