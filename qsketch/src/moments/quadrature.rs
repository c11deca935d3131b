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

//! Gauss-Legendre quadrature on `[-1, 1]`.

use std::f64::consts::PI;

/// Nodes and weights of a Gauss-Legendre rule on `[-1, 1]`.
#[derive(Clone, Debug)]
pub(crate) struct GaussLegendre {
    pub nodes: Vec<f64>,
    pub weights: Vec<f64>,
}

impl GaussLegendre {
    /// Computes the rule of the given order.
    ///
    /// Each node is a root of the Legendre polynomial `P_order`, located by
    /// Newton iteration from the Chebyshev-angle initial guess; roots come
    /// in symmetric pairs so only half are iterated.
    pub fn new(order: usize) -> Self {
        debug_assert!(order >= 2);
        let mut nodes = vec![0.0; order];
        let mut weights = vec![0.0; order];

        let half = order.div_ceil(2);
        for i in 0..half {
            let mut x = (PI * (i as f64 + 0.75) / (order as f64 + 0.5)).cos();
            let mut derivative = 0.0;
            for _ in 0..100 {
                let (p, dp) = legendre_with_derivative(order, x);
                derivative = dp;
                let dx = p / dp;
                x -= dx;
                if dx.abs() < 1e-15 {
                    break;
                }
            }
            let w = 2.0 / ((1.0 - x * x) * derivative * derivative);
            nodes[i] = -x;
            weights[i] = w;
            nodes[order - 1 - i] = x;
            weights[order - 1 - i] = w;
        }

        Self { nodes, weights }
    }

    /// Integrates `f` over `[-1, 1]`.
    #[cfg(test)]
    pub fn integrate(&self, f: impl Fn(f64) -> f64) -> f64 {
        self.nodes
            .iter()
            .zip(self.weights.iter())
            .map(|(&x, &w)| w * f(x))
            .sum()
    }
}

/// Evaluates `(P_n(x), P_n'(x))` by the three-term recurrence.
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut previous = 1.0;
    let mut current = x;
    for j in 2..=n {
        let j = j as f64;
        let next = ((2.0 * j - 1.0) * x * current - (j - 1.0) * previous) / j;
        previous = current;
        current = next;
    }
    // Valid away from x = +/-1; Gauss nodes are interior.
    let derivative = n as f64 * (x * current - previous) / (x * x - 1.0);
    (current, derivative)
}
