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
use qsketch::ddsketch::LogarithmicMapping;
use qsketch::ddsketch::SparseStore;
use qsketch::error::ErrorKind;

#[test]
fn test_roundtrip_preserves_every_field() {
    let mapping = LogarithmicMapping::new(0.01).unwrap();
    let mut sketch: DDSketch<_, DenseStore> =
        DDSketch::new(mapping, Some(512), CollapseStrategy::BothEnds).unwrap();
    for i in 1..=200 {
        sketch.insert(i as f64).unwrap();
        sketch.insert(-(i as f64) / 3.0).unwrap();
    }
    sketch.insert(0.0).unwrap();
    sketch.insert_weighted(7.0, 2.5).unwrap();

    let bytes = sketch.serialize();
    let decoded = DDSketch::<LogarithmicMapping, DenseStore>::deserialize(&bytes).unwrap();

    assert_eq!(decoded.count(), sketch.count());
    assert_eq!(decoded.sum(), sketch.sum());
    assert_eq!(decoded.min(), sketch.min());
    assert_eq!(decoded.max(), sketch.max());
    assert_eq!(decoded.zero_weight(), sketch.zero_weight());
    assert_eq!(decoded.num_buckets(), sketch.num_buckets());
    assert_eq!(decoded.max_buckets(), sketch.max_buckets());
    assert_eq!(decoded.collapse_strategy(), sketch.collapse_strategy());
    assert_eq!(decoded.relative_accuracy(), sketch.relative_accuracy());
    for q in [0.0, 0.01, 0.25, 0.5, 0.75, 0.99, 1.0] {
        assert_eq!(decoded.quantile(q).unwrap(), sketch.quantile(q).unwrap());
    }
}

#[test]
fn test_roundtrip_empty() {
    let sketch = DDSketch::with_relative_accuracy(0.03).unwrap();
    let bytes = sketch.serialize();
    let decoded = DDSketch::<LogarithmicMapping, DenseStore>::deserialize(&bytes).unwrap();

    assert!(decoded.is_empty());
    assert_eq!(decoded.count(), 0.0);
    assert_eq!(decoded.relative_accuracy(), 0.03);
    assert_eq!(decoded.max_buckets(), None);
}

#[test]
fn test_roundtrip_across_store_types() {
    // The wire format carries bucket lists, not store internals, so a
    // sketch serialized from a sparse store decodes into a dense one.
    let mapping = LogarithmicMapping::new(0.02).unwrap();
    let mut sparse: DDSketch<_, SparseStore> =
        DDSketch::new(mapping, None, CollapseStrategy::None).unwrap();
    for i in 1..=500 {
        sparse.insert(i as f64 * 17.0).unwrap();
    }

    let bytes = sparse.serialize();
    let dense = DDSketch::<LogarithmicMapping, DenseStore>::deserialize(&bytes).unwrap();

    assert_eq!(dense.count(), sparse.count());
    for q in [0.1, 0.5, 0.9] {
        assert_eq!(dense.quantile(q).unwrap(), sparse.quantile(q).unwrap());
    }
}

#[test]
fn test_roundtrip_after_collapse() {
    let mapping = LogarithmicMapping::new(0.02).unwrap();
    let mut sketch: DDSketch<_, DenseStore> =
        DDSketch::new(mapping, Some(16), CollapseStrategy::Low).unwrap();
    for i in 1..=10_000 {
        sketch.insert(i as f64).unwrap();
    }

    let bytes = sketch.serialize();
    let decoded = DDSketch::<LogarithmicMapping, DenseStore>::deserialize(&bytes).unwrap();

    assert_eq!(decoded.count(), sketch.count());
    assert_eq!(decoded.num_buckets(), sketch.num_buckets());
    assert_eq!(decoded.quantile(0.99).unwrap(), sketch.quantile(0.99).unwrap());
}

#[test]
fn test_truncated_input_fails() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    sketch.insert(1.0).unwrap();
    let bytes = sketch.serialize();

    for len in 0..bytes.len() {
        let result = DDSketch::<LogarithmicMapping, DenseStore>::deserialize(&bytes[..len]);
        assert!(result.is_err(), "truncation at {len} bytes must fail");
    }
}

#[test]
fn test_wrong_family_fails() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    sketch.insert(1.0).unwrap();
    let mut bytes = sketch.serialize();
    bytes[2] = 0x7F;

    let error = DDSketch::<LogarithmicMapping, DenseStore>::deserialize(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MalformedDeserializeData);
}

#[test]
fn test_mapping_kind_mismatch_fails() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    sketch.insert(1.0).unwrap();
    let bytes = sketch.serialize();

    let error = DDSketch::<CubicInterpolationMapping, DenseStore>::deserialize(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MalformedDeserializeData);
}

#[test]
fn test_corrupt_gamma_fails() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    sketch.insert(1.0).unwrap();
    let mut bytes = sketch.serialize();
    // The gamma field sits after the six header bytes and alpha.
    bytes[14..22].copy_from_slice(&2.5f64.to_le_bytes());

    let error = DDSketch::<LogarithmicMapping, DenseStore>::deserialize(&bytes).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MalformedDeserializeData);
}
