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

//! Binary serialization for [`DDSketch`].
//!
//! Layout: a four-byte preamble (`preamble_ints`, `serial_version`,
//! `family_id`, `flags`), the mapping parameters, the optional bucket cap,
//! and, for non-empty sketches, the scalar summaries followed by both
//! stores as `(len, [(index, weight)])` lists. Every field of the sketch
//! state round-trips exactly.

use super::mapping::IndexMapping;
use super::mapping::MappingKind;
use super::sketch::CollapseStrategy;
use super::sketch::DDSketch;
use super::store::Store;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;

pub(crate) const DDSKETCH_FAMILY_ID: u8 = 21;
pub(crate) const SERIAL_VERSION: u8 = 1;
pub(crate) const PREAMBLE_INTS: u8 = 1;

pub(crate) const FLAG_EMPTY: u8 = 1;
pub(crate) const FLAG_HAS_CAP: u8 = 2;
pub(crate) const FLAG_COLLAPSE_LOW_NEXT: u8 = 4;

impl<M: IndexMapping, S: Store> DDSketch<M, S> {
    /// Serializes the sketch to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let positive = self.positive.bins_asc();
        let negative = self.negative.bins_asc();
        let is_empty = self.is_empty();

        let size = 22
            + self.max_buckets.map_or(0, |_| 8)
            + if is_empty { 0 } else { 48 + 12 * (positive.len() + negative.len()) };
        let mut bytes = SketchBytes::with_capacity(size);

        let flags = (if is_empty { FLAG_EMPTY } else { 0 })
            | (if self.max_buckets.is_some() { FLAG_HAS_CAP } else { 0 })
            | (if self.collapse_low_next { FLAG_COLLAPSE_LOW_NEXT } else { 0 });

        bytes.write_u8(PREAMBLE_INTS);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(DDSKETCH_FAMILY_ID);
        bytes.write_u8(flags);
        bytes.write_u8(M::KIND as u8);
        bytes.write_u8(self.collapse as u8);
        bytes.write_f64_le(self.mapping.relative_accuracy());
        bytes.write_f64_le(self.mapping.gamma());

        if let Some(cap) = self.max_buckets {
            bytes.write_u64_le(cap as u64);
        }

        if is_empty {
            return bytes.into_bytes();
        }

        bytes.write_f64_le(self.zero_weight);
        bytes.write_f64_le(self.weight);
        bytes.write_f64_le(self.sum);
        bytes.write_f64_le(self.min);
        bytes.write_f64_le(self.max);

        for bins in [&positive, &negative] {
            bytes.write_u32_le(bins.len() as u32);
            for &(index, bin_weight) in bins.iter() {
                bytes.write_i32_le(index);
                bytes.write_f64_le(bin_weight);
            }
        }

        bytes.into_bytes()
    }

    /// Deserializes a sketch from bytes.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDeserializeData` if the input is truncated, the
    /// family or version is wrong, the mapping kind does not match `M`, or
    /// any field fails validation.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = SketchSlice::new(bytes);

        let preamble_ints = cursor.read_u8().map_err(make_error("preamble_ints"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let mapping_kind = cursor.read_u8().map_err(make_error("mapping_kind"))?;
        let collapse = cursor.read_u8().map_err(make_error("collapse_strategy"))?;
        let relative_accuracy = cursor.read_f64_le().map_err(make_error("relative_accuracy"))?;
        let gamma = cursor.read_f64_le().map_err(make_error("gamma"))?;

        if family_id != DDSKETCH_FAMILY_ID {
            return Err(Error::invalid_family(DDSKETCH_FAMILY_ID, family_id, "DDSketch"));
        }
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(SERIAL_VERSION, serial_version));
        }
        if preamble_ints != PREAMBLE_INTS {
            return Err(Error::deserial(format!(
                "invalid preamble ints: expected {PREAMBLE_INTS}, got {preamble_ints}"
            )));
        }
        let kind = MappingKind::from_u8(mapping_kind)
            .ok_or_else(|| Error::deserial(format!("unknown mapping kind: {mapping_kind}")))?;
        if kind != M::KIND {
            return Err(Error::deserial("mapping kind does not match the sketch type")
                .with_context("expected", format!("{:?}", M::KIND))
                .with_context("actual", format!("{kind:?}")));
        }
        let collapse = CollapseStrategy::from_u8(collapse)
            .ok_or_else(|| Error::deserial(format!("unknown collapse strategy: {collapse}")))?;

        let mapping = M::from_relative_accuracy(relative_accuracy)
            .map_err(|e| Error::deserial("invalid relative accuracy").set_source(e))?;
        if (mapping.gamma() - gamma).abs() > gamma.abs() * 1e-12 {
            return Err(Error::deserial("gamma does not match the relative accuracy")
                .with_context("expected", mapping.gamma())
                .with_context("actual", gamma));
        }

        let max_buckets = if flags & FLAG_HAS_CAP != 0 {
            let cap = cursor.read_u64_le().map_err(make_error("max_buckets"))?;
            Some(cap as usize)
        } else {
            None
        };

        let mut sketch = DDSketch::<M, S>::new(mapping, max_buckets, collapse)
            .map_err(|e| Error::deserial("invalid sketch configuration").set_source(e))?;

        if flags & FLAG_EMPTY != 0 {
            return Ok(sketch);
        }

        let zero_weight = cursor.read_f64_le().map_err(make_error("zero_weight"))?;
        let weight = cursor.read_f64_le().map_err(make_error("weight"))?;
        let sum = cursor.read_f64_le().map_err(make_error("sum"))?;
        let min = cursor.read_f64_le().map_err(make_error("min"))?;
        let max = cursor.read_f64_le().map_err(make_error("max"))?;

        if !zero_weight.is_finite() || zero_weight < 0.0 {
            return Err(Error::deserial("zero weight must be finite and non-negative"));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(Error::deserial("total weight must be finite and positive"));
        }
        if !sum.is_finite() || !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::deserial("summary statistics are inconsistent"));
        }

        for negative_store in [false, true] {
            let len = cursor.read_u32_le().map_err(make_error("store_len"))?;
            for _ in 0..len {
                let index = cursor.read_i32_le().map_err(make_error("bin_index"))?;
                let bin_weight = cursor.read_f64_le().map_err(make_error("bin_weight"))?;
                if !bin_weight.is_finite() || bin_weight <= 0.0 {
                    return Err(Error::deserial("bucket weight must be finite and positive")
                        .with_context("index", index)
                        .with_context("weight", bin_weight));
                }
                if negative_store {
                    sketch.negative.add(index, bin_weight);
                } else {
                    sketch.positive.add(index, bin_weight);
                }
            }
        }

        sketch.zero_weight = zero_weight;
        sketch.weight = weight;
        sketch.sum = sum;
        sketch.min = min;
        sketch.max = max;
        sketch.collapse_low_next = flags & FLAG_COLLAPSE_LOW_NEXT != 0;

        Ok(sketch)
    }
}
