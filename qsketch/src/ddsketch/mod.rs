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

//! DDSketch: a quantile sketch with relative-error guarantees.
//!
//! DDSketch buckets values into geometric ranges of ratio at most
//! `(1 + alpha)^2` and counts weight per bucket, so the geometric-mean
//! representative of a bucket lies within
//! `[x / (1 + alpha), x * (1 + alpha)]` for every value `x` in the
//! bucket. Sketches built independently on shards of a stream merge into
//! a sketch indistinguishable from one built on the whole stream.
//!
//! The sketch is assembled from three interchangeable pieces:
//!
//! - an [`IndexMapping`] turning values into bucket indices
//!   (exact [`LogarithmicMapping`], or the cheaper
//!   [`LinearInterpolationMapping`] / [`CubicInterpolationMapping`]);
//! - a [`Store`] holding bucket weights ([`DenseStore`] for narrow index
//!   ranges, [`SparseStore`] for scattered ones);
//! - the [`DDSketch`] controller routing values by sign, tracking the
//!   summary statistics, and enforcing an optional bucket cap through a
//!   [`CollapseStrategy`].
//!
//! Reference:
//! "DDSketch: A Fast and Fully-Mergeable Quantile Sketch with
//! Relative-Error Guarantees" by Charles Masson, Jee E. Rim and
//! Homin K. Lee.
//!
//! # Usage
//!
//! ```rust
//! # use qsketch::ddsketch::DDSketch;
//! let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
//! sketch.insert(12.5).unwrap();
//! sketch.insert(31.0).unwrap();
//! let p50 = sketch.quantile(0.5).unwrap();
//! assert!(p50 >= 12.0 && p50 <= 32.0);
//! ```

pub mod mapping;
pub mod store;

mod serialization;
mod sketch;

pub use self::mapping::CubicInterpolationMapping;
pub use self::mapping::IndexMapping;
pub use self::mapping::LinearInterpolationMapping;
pub use self::mapping::LogarithmicMapping;
pub use self::mapping::MappingKind;
pub use self::sketch::CollapseStrategy;
pub use self::sketch::DDSketch;
pub use self::store::DenseStore;
pub use self::store::SparseStore;
pub use self::store::Store;
