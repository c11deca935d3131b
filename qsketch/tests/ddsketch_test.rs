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

use qsketch::ddsketch::CollapseStrategy;
use qsketch::ddsketch::CubicInterpolationMapping;
use qsketch::ddsketch::DDSketch;
use qsketch::ddsketch::DenseStore;
use qsketch::ddsketch::IndexMapping;
use qsketch::ddsketch::LinearInterpolationMapping;
use qsketch::ddsketch::LogarithmicMapping;
use qsketch::ddsketch::SparseStore;
use qsketch::error::ErrorKind;

fn assert_relative(actual: f64, expected: f64, alpha: f64) {
    let bound = alpha * expected.abs() + 1e-12;
    assert!(
        (actual - expected).abs() <= bound,
        "expected {expected} +/- {bound}, got {actual}"
    );
}

#[test]
fn test_one_to_one_thousand() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    for i in 1..=1000 {
        sketch.insert(i as f64).unwrap();
    }

    assert_eq!(sketch.count(), 1000.0);
    assert_eq!(sketch.min(), Some(1.0));
    assert_eq!(sketch.max(), Some(1000.0));

    let median = sketch.quantile(0.5).unwrap();
    assert!((495.0..=505.0).contains(&median), "median {median}");
    let p99 = sketch.quantile(0.99).unwrap();
    assert!((980.0..=1000.0).contains(&p99), "p99 {p99}");
}

#[test]
fn test_mixed_signs_uniform_weights() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    for value in [-100.0, -10.0, -1.0, 0.0, 1.0, 10.0, 100.0] {
        sketch.insert(value).unwrap();
    }

    assert_eq!(sketch.quantile(0.0).unwrap(), -100.0);
    assert_eq!(sketch.quantile(0.5).unwrap(), 0.0);
    assert_eq!(sketch.quantile(1.0).unwrap(), 100.0);
    assert_eq!(sketch.count(), 7.0);
    assert_eq!(sketch.sum(), 0.0);
}

#[test]
fn test_accuracy_bound_across_mappings() {
    let alpha = 0.015;

    let logarithmic = LogarithmicMapping::new(alpha).unwrap();
    let linear = LinearInterpolationMapping::new(alpha).unwrap();
    let cubic = CubicInterpolationMapping::new(alpha).unwrap();

    fn run<M: IndexMapping>(mapping: M, alpha: f64) {
        let mut sketch: DDSketch<M, DenseStore> =
            DDSketch::new(mapping, None, CollapseStrategy::None).unwrap();
        for i in 1..=2000 {
            sketch.insert(i as f64 * 0.25).unwrap();
        }

        for q in [0.05, 0.25, 0.5, 0.75, 0.95, 0.999] {
            let estimated = sketch.quantile(q).unwrap();
            // The scan crosses inside the bucket holding the sample of
            // rank floor(q * n) + 1, so the two-sided band applies
            // against that sample.
            let expected = ((q * 2000.0).floor() + 1.0) * 0.25;
            let lower = expected / (1.0 + alpha) * (1.0 - 1e-12);
            let upper = expected * (1.0 + alpha) * (1.0 + 1e-12);
            assert!(
                estimated >= lower && estimated <= upper,
                "q {q}: expected [{lower}, {upper}], got {estimated}"
            );
        }
    }

    run(logarithmic, alpha);
    run(linear, alpha);
    run(cubic, alpha);
}

#[test]
fn test_weight_conservation() {
    let mut sketch = DDSketch::with_relative_accuracy(0.02).unwrap();
    let mut expected = 0.0;
    for i in 0..1000 {
        let weight = 0.25 + (i % 7) as f64;
        let value = (i as f64) - 500.0;
        sketch.insert_weighted(value, weight).unwrap();
        expected += weight;
    }

    assert!((sketch.count() - expected).abs() < 1e-9);
}

#[test]
fn test_min_max_are_exact() {
    let mut sketch = DDSketch::with_relative_accuracy(0.05).unwrap();
    let values = [3.7, -0.002, 91.5, -88.1, 0.0, 12.0];
    for value in values {
        sketch.insert(value).unwrap();
    }

    assert_eq!(sketch.min(), Some(-88.1));
    assert_eq!(sketch.max(), Some(91.5));
    assert_eq!(sketch.quantile(0.0).unwrap(), -88.1);
    assert_eq!(sketch.quantile(1.0).unwrap(), 91.5);
}

#[test]
fn test_quantiles_clamped_into_observed_range() {
    let mut sketch = DDSketch::with_relative_accuracy(0.05).unwrap();
    sketch.insert(100.0).unwrap();

    for q in [0.0, 0.001, 0.5, 0.999, 1.0] {
        assert_eq!(sketch.quantile(q).unwrap(), 100.0);
    }
}

#[test]
fn test_error_kinds() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();

    assert_eq!(sketch.quantile(0.5).unwrap_err().kind(), ErrorKind::EmptySketch);
    sketch.insert(1.0).unwrap();
    assert_eq!(sketch.quantile(2.0).unwrap_err().kind(), ErrorKind::OutOfRange);
    assert_eq!(sketch.insert(f64::INFINITY).unwrap_err().kind(), ErrorKind::OutOfRange);
    assert_eq!(
        DDSketch::with_relative_accuracy(1.5).unwrap_err().kind(),
        ErrorKind::ConfigInvalid
    );
}

#[test]
fn test_sparse_and_dense_answer_alike() {
    let mapping = LogarithmicMapping::new(0.01).unwrap();
    let mut dense: DDSketch<_, DenseStore> =
        DDSketch::new(mapping.clone(), None, CollapseStrategy::None).unwrap();
    let mut sparse: DDSketch<_, SparseStore> =
        DDSketch::new(mapping, None, CollapseStrategy::None).unwrap();

    for i in 0..5000 {
        let value = ((i * 2654435761u64) % 100_000) as f64 / 10.0 - 3000.0;
        dense.insert(value).unwrap();
        sparse.insert(value).unwrap();
    }

    assert_eq!(dense.count(), sparse.count());
    assert_eq!(dense.zero_weight(), sparse.zero_weight());
    for q in [0.01, 0.1, 0.5, 0.9, 0.99] {
        assert_eq!(
            dense.quantile(q).unwrap(),
            sparse.quantile(q).unwrap(),
            "stores disagree at q = {q}"
        );
    }
}

#[test]
fn test_tiny_magnitudes_count_as_zero() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    sketch.insert(0.0).unwrap();
    sketch.insert(f64::MIN_POSITIVE / 4.0).unwrap();
    sketch.insert(-f64::MIN_POSITIVE / 4.0).unwrap();
    sketch.insert(5.0).unwrap();

    assert_eq!(sketch.zero_weight(), 3.0);
    assert_eq!(sketch.count(), 4.0);
    // The exact extremes still reflect the tiny values.
    assert_eq!(sketch.min(), Some(-f64::MIN_POSITIVE / 4.0));
    assert_relative(sketch.quantile(0.5).unwrap(), 0.0, 0.01);
}

#[test]
fn test_weighted_quantiles() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    // 90% of the weight at 10, 10% at 1000.
    sketch.insert_weighted(10.0, 9.0).unwrap();
    sketch.insert_weighted(1000.0, 1.0).unwrap();

    assert_relative(sketch.quantile(0.5).unwrap(), 10.0, 0.01);
    assert_relative(sketch.quantile(0.89).unwrap(), 10.0, 0.01);
    assert_relative(sketch.quantile(0.95).unwrap(), 1000.0, 0.01);
}
