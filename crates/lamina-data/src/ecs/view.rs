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

//! The single-table view, base case of every join.

use std::ops::Index;

use lamina_core::ecs::entity::EntityId;

use crate::ecs::component::Component;
use crate::ecs::table::Table;

/// Iterator over a view's entities, in dense table order.
pub type ViewIter<'a> = std::iter::Copied<std::slice::Iter<'a, EntityId>>;

/// A non-owning, read-only window over exactly one [`Table`].
///
/// The view is a thin wrapper: `len` and `contains` mirror the table, and
/// iteration walks the dense arrays directly with no per-entry checks. It
/// exists both as the standalone single-component query and as the building
/// block the multi-table [`Join`](crate::ecs::Join) composes.
///
/// The borrow of the table pins it for the view's lifetime, so the dense
/// layout cannot change while the view or any iterator derived from it is
/// alive.
pub struct View<'a, T: Component> {
    table: &'a Table<T>,
}

impl<T: Component> Clone for View<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Component> Copy for View<'_, T> {}

impl<'a, T: Component> View<'a, T> {
    /// Creates a view over the given table.
    pub fn new(table: &'a Table<T>) -> Self {
        Self { table }
    }

    /// Number of entities in the underlying table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the underlying table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns true if the entity has a component in the underlying table.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.table.contains(entity)
    }

    /// Returns the component assigned to the given entity.
    ///
    /// The entity must be contained in the view. The precondition is
    /// checked by a fatal debug assertion only; release builds perform the
    /// raw dense access.
    pub fn get(&self, entity: EntityId) -> &'a T {
        self.table.fetch(entity)
    }

    /// Direct access to the dense component array. The slice is valid
    /// (and empty) even for an empty table.
    pub fn raw(&self) -> &'a [T] {
        self.table.components()
    }

    /// Direct access to the dense entity array, parallel to
    /// [`View::raw`].
    pub fn data(&self) -> &'a [EntityId] {
        self.table.entities()
    }

    /// Iterates the entities in dense table order. The iterator is
    /// double-ended; `.rev()` walks the table backwards.
    pub fn iter(&self) -> ViewIter<'a> {
        self.table.entities().iter().copied()
    }

    /// Returns the dense position of the entity via the sparse index.
    pub fn find(&self, entity: EntityId) -> Option<usize> {
        self.table.find(entity)
    }

    /// The first entity of the view, if any.
    pub fn first(&self) -> Option<EntityId> {
        self.table.entities().first().copied()
    }

    /// The last entity of the view, if any.
    pub fn last(&self) -> Option<EntityId> {
        self.table.entities().last().copied()
    }

    /// Visits every `(entity, component)` pair once, walking the two dense
    /// arrays in lock-step with no sparse lookups.
    pub fn each(&self, mut func: impl FnMut(EntityId, &'a T)) {
        for (entity, component) in self.rows() {
            func(entity, component);
        }
    }

    /// Lazy `(entity, component)` sequence over the same lock-step walk as
    /// [`View::each`].
    pub fn rows(&self) -> std::iter::Zip<ViewIter<'a>, std::slice::Iter<'a, T>> {
        self.iter().zip(self.table.components().iter())
    }
}

impl<T: Component> Index<usize> for View<'_, T> {
    type Output = EntityId;

    /// The entity at the given dense position.
    fn index(&self, pos: usize) -> &EntityId {
        &self.table.entities()[pos]
    }
}

impl<'a, T: Component> IntoIterator for View<'a, T> {
    type Item = EntityId;
    type IntoIter = ViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Component> IntoIterator for &View<'a, T> {
    type Item = EntityId;
    type IntoIter = ViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
