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

//! Maximum-entropy density reconstruction from Chebyshev moments.
//!
//! Given moments `d_j = E[T_j(y)]` on `[-1, 1]`, the maximum-entropy
//! density matching them has the form `f(y) = exp(sum_j lambda_j T_j(y))`.
//! The multipliers minimize the convex dual
//!
//! ```text
//! G(lambda) = integral exp(sum_j lambda_j T_j(y)) dy - sum_j lambda_j d_j
//! ```
//!
//! whose gradient is the moment mismatch and whose Hessian is the Gram
//! matrix of the basis under `f`, so damped Newton converges globally.
//! When Newton fails to converge, the solver retries with the highest
//! moments dropped, one at a time, down to two moments.

use super::chebyshev;
use super::quadrature::GaussLegendre;
use crate::error::Error;

/// A solved maximum-entropy density on `[-1, 1]`.
#[derive(Clone, Debug)]
pub(crate) struct MaxEntropySolution {
    lambda: Vec<f64>,
    rule: GaussLegendre,
    mass: f64,
}

impl MaxEntropySolution {
    /// Evaluates the reconstructed density at `y`.
    pub fn density(&self, y: f64) -> f64 {
        let mut basis = vec![0.0; self.lambda.len()];
        chebyshev::evaluate(y, &mut basis);
        let exponent: f64 = self
            .lambda
            .iter()
            .zip(basis.iter())
            .map(|(l, t)| l * t)
            .sum();
        exponent.exp()
    }

    /// Integrates the density over `[-1, y]` by mapping the solver's
    /// quadrature rule onto the subinterval.
    pub fn cdf(&self, y: f64) -> f64 {
        if y <= -1.0 {
            return 0.0;
        }
        let half_width = (y.min(1.0) + 1.0) / 2.0;
        let total: f64 = self
            .rule
            .nodes
            .iter()
            .zip(self.rule.weights.iter())
            .map(|(&t, &w)| w * self.density(-1.0 + half_width * (t + 1.0)))
            .sum();
        total * half_width
    }

    /// Total mass `integral of f over [-1, 1]`.
    pub fn mass(&self) -> f64 {
        self.mass
    }
}

/// Solves for the maximum-entropy density matching the given Chebyshev
/// moments, dropping the highest moments one at a time on failure.
///
/// # Errors
///
/// Returns `NonConvergence` once the fallback is exhausted at two moments.
pub(crate) fn solve(
    moments: &[f64],
    epsilon: f64,
    max_iterations: usize,
) -> Result<MaxEntropySolution, Error> {
    let mut k = moments.len();
    while k >= 2 {
        let prefix = &moments[..k];
        if prefix.iter().all(|m| m.is_finite()) {
            if let Some(solution) = solve_with_k(prefix, epsilon, max_iterations) {
                return Ok(solution);
            }
        }
        k -= 1;
    }
    Err(Error::non_convergence("maximum-entropy solve failed at every moment count")
        .with_context("moments", moments.len()))
}

fn solve_with_k(moments: &[f64], epsilon: f64, max_iterations: usize) -> Option<MaxEntropySolution> {
    let k = moments.len();
    let order = (8 * k).max(32);
    let rule = GaussLegendre::new(order);

    let basis: Vec<Vec<f64>> = rule
        .nodes
        .iter()
        .map(|&y| {
            let mut row = vec![0.0; k];
            chebyshev::evaluate(y, &mut row);
            row
        })
        .collect();

    // lambda_0 = ln(1/2) starts from the uniform density of unit mass,
    // which satisfies the zeroth constraint exactly.
    let mut lambda = vec![0.0; k];
    lambda[0] = 0.5f64.ln();

    let objective = |lambda: &[f64]| -> f64 {
        let mut total = 0.0;
        for (row, &w) in basis.iter().zip(rule.weights.iter()) {
            let exponent: f64 = lambda.iter().zip(row.iter()).map(|(l, t)| l * t).sum();
            total += w * exponent.exp();
        }
        total - lambda.iter().zip(moments.iter()).map(|(l, d)| l * d).sum::<f64>()
    };

    let mut gradient = vec![0.0; k];
    let mut converged_mass = None;
    for _ in 0..max_iterations {
        // Quadrature-weighted density at the nodes.
        let density: Vec<f64> = basis
            .iter()
            .zip(rule.weights.iter())
            .map(|(row, &w)| {
                let exponent: f64 = lambda.iter().zip(row.iter()).map(|(l, t)| l * t).sum();
                w * exponent.exp()
            })
            .collect();
        if density.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let mass: f64 = density.iter().sum();

        for (j, slot) in gradient.iter_mut().enumerate() {
            *slot = density
                .iter()
                .zip(basis.iter())
                .map(|(f, row)| f * row[j])
                .sum::<f64>()
                - moments[j];
        }
        let gradient_norm = gradient.iter().fold(0.0f64, |acc, g| acc.max(g.abs()));
        if gradient_norm < epsilon {
            converged_mass = Some(mass);
            break;
        }

        let mut hessian = vec![vec![0.0; k]; k];
        for i in 0..k {
            for j in i..k {
                let entry: f64 = density
                    .iter()
                    .zip(basis.iter())
                    .map(|(f, row)| f * row[i] * row[j])
                    .sum();
                hessian[i][j] = entry;
                hessian[j][i] = entry;
            }
        }

        // Newton direction, with a ridge retry when the Gram matrix loses
        // positive definiteness to rounding.
        let negated: Vec<f64> = gradient.iter().map(|g| -g).collect();
        let mut direction = None;
        let mut ridge = 0.0;
        for _ in 0..6 {
            let mut damped = hessian.clone();
            for (i, row) in damped.iter_mut().enumerate() {
                row[i] += ridge;
            }
            if let Some(delta) = cholesky_solve(damped, &negated) {
                direction = Some(delta);
                break;
            }
            ridge = if ridge == 0.0 { 1e-10 * mass.max(1.0) } else { ridge * 100.0 };
        }
        let delta = direction?;

        // Armijo backtracking keeps the damped step a strict descent.
        let current = mass - lambda.iter().zip(moments.iter()).map(|(l, d)| l * d).sum::<f64>();
        let slope: f64 = gradient.iter().zip(delta.iter()).map(|(g, d)| g * d).sum();
        let mut step = 1.0;
        let mut accepted = false;
        for _ in 0..40 {
            let trial: Vec<f64> = lambda
                .iter()
                .zip(delta.iter())
                .map(|(l, d)| l + step * d)
                .collect();
            let value = objective(&trial);
            if value.is_finite() && value <= current + 1e-4 * step * slope {
                lambda = trial;
                accepted = true;
                break;
            }
            step *= 0.5;
        }
        if !accepted {
            return None;
        }
    }

    let mass = converged_mass?;
    Some(MaxEntropySolution { lambda, rule, mass })
}

/// Solves `A x = b` for a symmetric positive-definite `A`, consuming the
/// matrix as scratch space. Returns `None` if the factorization breaks
/// down.
fn cholesky_solve(mut a: Vec<Vec<f64>>, b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for p in 0..j {
                sum -= a[i][p] * a[j][p];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                a[i][i] = sum.sqrt();
            } else {
                a[i][j] = sum / a[j][j];
            }
        }
    }

    // Forward substitution: L y = b.
    let mut x = b.to_vec();
    for i in 0..n {
        for j in 0..i {
            x[i] = x[i] - a[i][j] * x[j];
        }
        x[i] /= a[i][i];
    }
    // Back substitution: L^T x = y.
    for i in (0..n).rev() {
        for j in i + 1..n {
            x[i] = x[i] - a[j][i] * x[j];
        }
        x[i] /= a[i][i];
    }
    Some(x)
}
