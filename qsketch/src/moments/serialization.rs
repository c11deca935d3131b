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

//! Binary serialization for [`MomentSketch`].

use super::sketch::MomentSketch;
use super::MAX_K;
use super::MIN_K;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;

pub(crate) const MOMENTS_FAMILY_ID: u8 = 22;
pub(crate) const SERIAL_VERSION: u8 = 1;
pub(crate) const PREAMBLE_INTS: u8 = 1;

pub(crate) const FLAG_EMPTY: u8 = 1;
pub(crate) const FLAG_LOG_MODE: u8 = 2;
pub(crate) const FLAG_LOGS_ENABLED: u8 = 4;

impl MomentSketch {
    /// Serializes the sketch to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let size = 6 + if is_empty { 0 } else { 32 + 16 * self.k };
        let mut bytes = SketchBytes::with_capacity(size);

        let flags = (if is_empty { FLAG_EMPTY } else { 0 })
            | (if self.log_mode { FLAG_LOG_MODE } else { 0 })
            | (if self.logs_enabled { FLAG_LOGS_ENABLED } else { 0 });

        bytes.write_u8(PREAMBLE_INTS);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(MOMENTS_FAMILY_ID);
        bytes.write_u8(flags);
        bytes.write_u8(self.k as u8);
        bytes.write_u8(0);

        if is_empty {
            return bytes.into_bytes();
        }

        bytes.write_f64_le(self.min);
        bytes.write_f64_le(self.max);
        bytes.write_f64_le(self.log_min);
        bytes.write_f64_le(self.log_max);
        for &sum in &self.power_sums {
            bytes.write_f64_le(sum);
        }
        for &sum in &self.log_sums {
            bytes.write_f64_le(sum);
        }

        bytes.into_bytes()
    }

    /// Deserializes a sketch from bytes.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDeserializeData` if the input is truncated or any
    /// field fails validation.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |_| Error::insufficient_data(tag)
        }

        let mut cursor = SketchSlice::new(bytes);

        let preamble_ints = cursor.read_u8().map_err(make_error("preamble_ints"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let k = cursor.read_u8().map_err(make_error("k"))? as usize;
        let _unused = cursor.read_u8().map_err(make_error("unused"))?;

        if family_id != MOMENTS_FAMILY_ID {
            return Err(Error::invalid_family(MOMENTS_FAMILY_ID, family_id, "MomentSketch"));
        }
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(SERIAL_VERSION, serial_version));
        }
        if preamble_ints != PREAMBLE_INTS {
            return Err(Error::deserial(format!(
                "invalid preamble ints: expected {PREAMBLE_INTS}, got {preamble_ints}"
            )));
        }
        if !(MIN_K..=MAX_K).contains(&k) {
            return Err(Error::deserial(format!("k out of range: {k}")));
        }

        let log_mode = flags & FLAG_LOG_MODE != 0;
        let mut sketch = if log_mode {
            MomentSketch::with_log_mode(k)
        } else {
            MomentSketch::new(k)
        }
        .map_err(|e| Error::deserial("invalid sketch configuration").set_source(e))?;

        if flags & FLAG_EMPTY != 0 {
            return Ok(sketch);
        }

        let min = cursor.read_f64_le().map_err(make_error("min"))?;
        let max = cursor.read_f64_le().map_err(make_error("max"))?;
        let log_min = cursor.read_f64_le().map_err(make_error("log_min"))?;
        let log_max = cursor.read_f64_le().map_err(make_error("log_max"))?;
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::deserial("min/max are inconsistent"));
        }

        let mut power_sums = vec![0.0; k];
        for (j, slot) in power_sums.iter_mut().enumerate() {
            let sum = cursor.read_f64_le().map_err(make_error("power_sums"))?;
            if j == 0 && !(sum.is_finite() && sum > 0.0) {
                return Err(Error::deserial("total weight must be finite and positive"));
            }
            *slot = sum;
        }
        let mut log_sums = vec![0.0; k];
        for slot in log_sums.iter_mut() {
            *slot = cursor.read_f64_le().map_err(make_error("log_sums"))?;
        }

        sketch.min = min;
        sketch.max = max;
        sketch.log_min = log_min;
        sketch.log_max = log_max;
        sketch.power_sums = power_sums;
        sketch.log_sums = log_sums;
        sketch.logs_enabled = flags & FLAG_LOGS_ENABLED != 0;

        Ok(sketch)
    }
}
