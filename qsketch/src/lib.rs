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

//! Mergeable quantile sketches over unbounded streams.
//!
//! This crate provides two independent summaries that ingest weighted
//! samples one at a time, merge with summaries built on other shards, and
//! answer arbitrary quantile queries with bounded memory:
//!
//! - [`ddsketch::DDSketch`] buckets values geometrically and guarantees a
//!   *relative* error on every returned quantile: the answer `v` for a true
//!   quantile `v*` satisfies `|v - v*| <= alpha * |v*|`. Memory can be
//!   capped, trading accuracy in one tail for a hard bucket budget.
//! - [`moments::MomentSketch`] keeps the first `k` power sums of the stream
//!   (optionally of its logarithms) in `O(k)` space and reconstructs the
//!   quantile function at query time through a maximum-entropy density
//!   estimate.
//!
//! Both sketches expose the same surface: `insert`, `insert_weighted`,
//! `merge`, `quantile`, `count`, `sum`, `min`, `max`, and a binary
//! serialization that round-trips the full sketch state.
//!
//! Sketches are not internally synchronized. Parallel ingestion is done by
//! sharding: each worker owns a private sketch and the shards are merged
//! into a coordinator, which is the only cross-shard synchronization point.

pub mod ddsketch;
pub mod error;
pub mod moments;

pub(crate) mod codec;
