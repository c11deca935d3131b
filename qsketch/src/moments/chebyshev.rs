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

//! Chebyshev polynomials of the first kind.
//!
//! The solver works in the Chebyshev basis on `[-1, 1]` rather than raw
//! powers: the Gram matrix of `T_j` under the reconstructed density stays
//! far better conditioned than the Hilbert-like matrix the monomial basis
//! produces, which is what keeps Newton stable at higher moment counts.

/// Evaluates `T_0(y) .. T_{k-1}(y)` into `out` by the three-term
/// recurrence `T_{j+1} = 2y T_j - T_{j-1}`.
pub(crate) fn evaluate(y: f64, out: &mut [f64]) {
    if out.is_empty() {
        return;
    }
    out[0] = 1.0;
    if out.len() > 1 {
        out[1] = y;
    }
    for j in 2..out.len() {
        out[j] = 2.0 * y * out[j - 1] - out[j - 2];
    }
}

/// Returns the monomial coefficients of `T_0 .. T_{k-1}`:
/// `coefficients[j][p]` is the coefficient of `y^p` in `T_j`.
///
/// The entries grow like `2^(j-1)` but stay exactly representable in f64
/// for the supported moment counts.
pub(crate) fn monomial_coefficients(k: usize) -> Vec<Vec<f64>> {
    let mut coefficients = vec![vec![0.0; k]; k];
    coefficients[0][0] = 1.0;
    if k > 1 {
        coefficients[1][1] = 1.0;
    }
    for j in 2..k {
        for p in 0..k {
            let mut c = -coefficients[j - 2][p];
            if p > 0 {
                c += 2.0 * coefficients[j - 1][p - 1];
            }
            coefficients[j][p] = c;
        }
    }
    coefficients
}

/// Converts raw power sums over `[a, b]` into the normalized Chebyshev
/// moments `E[T_j(y)]` for `y = (2x - (a + b)) / (b - a)`.
///
/// The affine shift happens on the *moments* via the binomial expansion of
/// `(c1 x + c0)^p`, so the accumulator can keep raw power sums and defer
/// all basis work to query time.
pub(crate) fn chebyshev_moments(power_sums: &[f64], a: f64, b: f64) -> Vec<f64> {
    let k = power_sums.len();
    debug_assert!(k >= 1 && power_sums[0] > 0.0 && b > a);

    let total = power_sums[0];
    let raw: Vec<f64> = power_sums.iter().map(|s| s / total).collect();

    let c1 = 2.0 / (b - a);
    let c0 = -(a + b) / (b - a);
    let mut scaled = vec![0.0; k];
    for (p, slot) in scaled.iter_mut().enumerate() {
        let mut nu = 0.0;
        let mut binomial = 1.0;
        for i in 0..=p {
            nu += binomial * c1.powi(i as i32) * c0.powi((p - i) as i32) * raw[i];
            binomial = binomial * (p - i) as f64 / (i + 1) as f64;
        }
        *slot = nu;
    }

    let coefficients = monomial_coefficients(k);
    (0..k)
        .map(|j| (0..=j).map(|p| coefficients[j][p] * scaled[p]).sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_matches_closed_forms() {
        let mut values = [0.0; 5];
        for y in [-1.0, -0.3, 0.0, 0.5, 1.0] {
            evaluate(y, &mut values);
            assert_eq!(values[0], 1.0);
            assert_eq!(values[1], y);
            assert!((values[2] - (2.0 * y * y - 1.0)).abs() < 1e-14);
            assert!((values[3] - (4.0 * y * y * y - 3.0 * y)).abs() < 1e-13);
            assert!((values[4] - (8.0 * y.powi(4) - 8.0 * y * y + 1.0)).abs() < 1e-13);
        }
    }

    #[test]
    fn test_evaluate_bounded_on_unit_interval() {
        let mut values = [0.0; 20];
        let mut y = -1.0;
        while y <= 1.0 {
            evaluate(y, &mut values);
            for (j, v) in values.iter().enumerate() {
                assert!(v.abs() <= 1.0 + 1e-12, "|T_{j}({y})| = {v} exceeds 1");
            }
            y += 0.01;
        }
    }

    #[test]
    fn test_monomial_coefficients_match_recurrence() {
        let coefficients = monomial_coefficients(6);
        // T_4 = 8y^4 - 8y^2 + 1
        assert_eq!(coefficients[4][0], 1.0);
        assert_eq!(coefficients[4][2], -8.0);
        assert_eq!(coefficients[4][4], 8.0);
        // T_5 = 16y^5 - 20y^3 + 5y
        assert_eq!(coefficients[5][1], 5.0);
        assert_eq!(coefficients[5][3], -20.0);
        assert_eq!(coefficients[5][5], 16.0);
    }

    #[test]
    fn test_chebyshev_moments_of_point_mass() {
        // A unit mass at x maps to T_j(y(x)) exactly.
        let x: f64 = 3.0;
        let (a, b): (f64, f64) = (1.0, 5.0); // y = 0
        let k = 6;
        let power_sums: Vec<f64> = (0..k).map(|j| x.powi(j as i32)).collect();

        let moments = chebyshev_moments(&power_sums, a, b);
        let mut expected = vec![0.0; k];
        evaluate(0.0, &mut expected);
        for j in 0..k {
            assert!(
                (moments[j] - expected[j]).abs() < 1e-10,
                "moment {j}: {} vs {}",
                moments[j],
                expected[j]
            );
        }
    }

    #[test]
    fn test_chebyshev_moments_of_two_point_masses() {
        // Masses at the interval endpoints: y = -1 and y = 1, so
        // E[T_j] = (T_j(-1) + T_j(1)) / 2 = ((-1)^j + 1) / 2.
        let (a, b): (f64, f64) = (2.0, 4.0);
        let k = 8;
        let power_sums: Vec<f64> = (0..k)
            .map(|j| a.powi(j as i32) + b.powi(j as i32))
            .collect();

        let moments = chebyshev_moments(&power_sums, a, b);
        for (j, m) in moments.iter().enumerate() {
            let expected = if j % 2 == 0 { 1.0 } else { 0.0 };
            assert!(
                (m - expected).abs() < 1e-9,
                "moment {j}: {m} vs {expected}"
            );
        }
    }
}
