// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Implements the columnar sparse-set store and its query engine.
//!
//! Component data lives in one [`Table`] per component type: a dense array
//! of entities in insertion order, a parallel dense array of payloads, and
//! an O(1) sparse index from entity to dense offset. Queries never copy or
//! materialize their results; they are lightweight, non-owning handles over
//! live tables:
//!
//! - [`View`] exposes a single table with direct dense-array access.
//! - [`Join`] filters one driving table's dense entity array against any
//!   number of other included and excluded tables at iteration time.
//!
//! A join distinguishes three positions: tables whose component references
//! are yielded, tables consulted for membership only (where zero-size tag
//! components belong), and excluded tables. The driving table differs by
//! access path: cursor and row traversal always walk the leading table,
//! while [`Join::each`] re-selects the smallest included table on every
//! call to minimize membership checks.

mod component;
mod entities;
mod join;
mod set;
mod table;
mod view;

pub use component::Component;
pub use entities::EntityAllocator;
pub use join::{Join, JoinIter, Rows};
pub use lamina_core::ecs::entity::EntityId;
pub use set::{Driver, TableSet};
pub use table::Table;
pub use view::View;

#[cfg(test)]
mod tests;
