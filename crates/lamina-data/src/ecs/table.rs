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

//! The columnar component table: a sparse set keyed by entity identifier.

use lamina_core::ecs::entity::EntityId;

use crate::ecs::component::Component;

/// Sparse-index slot meaning "no dense entry for this entity index".
const TOMBSTONE: u32 = u32::MAX;

/// An association from entity identifier to at most one component value.
///
/// Storage is a Structure of Arrays: a dense array of `EntityId`s in
/// insertion/compaction order, a parallel dense array of payloads at the
/// same offsets, and a sparse index from entity index to dense offset.
/// Membership tests and lookups are O(1); removal compacts by swapping the
/// last dense entry into the vacated offset.
///
/// `contains` compares the full identifier, generation included, against
/// the dense entry, so a stale handle for a recycled index is never a
/// member.
pub struct Table<T: Component> {
    /// Dense offset per entity index, `TOMBSTONE` when absent.
    sparse: Vec<u32>,
    /// Entities in dense order. `dense[i]` owns the payload at `payload[i]`.
    dense: Vec<EntityId>,
    /// Component payloads at dense offsets. Stores nothing for zero-size
    /// component types beyond the shared length.
    payload: Vec<T>,
}

impl<T: Component> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> Table<T> {
    /// Creates a new, empty table.
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Returns the number of entities that have a component in this table.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns true if no entity has a component in this table.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// The dense offset of the given entity, if it is a member.
    fn slot(&self, entity: EntityId) -> Option<usize> {
        let offset = *self.sparse.get(entity.index() as usize)?;
        if offset == TOMBSTONE {
            return None;
        }
        (self.dense[offset as usize] == entity).then_some(offset as usize)
    }

    /// Returns true if the entity has a component in this table.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.slot(entity).is_some()
    }

    /// Returns the dense position of the entity via the sparse index.
    pub fn find(&self, entity: EntityId) -> Option<usize> {
        self.slot(entity)
    }

    /// Returns the component assigned to the entity, if any.
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.slot(entity).map(|offset| &self.payload[offset])
    }

    /// Returns the component assigned to the entity mutably, if any.
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.slot(entity).map(|offset| &mut self.payload[offset])
    }

    /// Assigns a component to an entity, growing the sparse index as
    /// needed. Returns the previous value if the entity already had one.
    pub fn insert(&mut self, entity: EntityId, value: T) -> Option<T> {
        debug_assert!(!entity.is_null(), "cannot insert the null entity");
        if let Some(offset) = self.slot(entity) {
            return Some(std::mem::replace(&mut self.payload[offset], value));
        }
        let index = entity.index() as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, TOMBSTONE);
        }
        self.sparse[index] = self.dense.len() as u32;
        self.dense.push(entity);
        self.payload.push(value);
        None
    }

    /// Removes the entity's component and returns it, compacting the dense
    /// arrays by swapping the last entry into the vacated offset and
    /// repointing its sparse slot.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let offset = self.slot(entity)?;
        self.sparse[entity.index() as usize] = TOMBSTONE;
        let value = self.payload.swap_remove(offset);
        self.dense.swap_remove(offset);
        if let Some(moved) = self.dense.get(offset) {
            self.sparse[moved.index() as usize] = offset as u32;
        }
        Some(value)
    }

    /// Removes every entry from the table.
    pub fn clear(&mut self) {
        log::trace!(
            "clearing table of {} ({} entries)",
            std::any::type_name::<T>(),
            self.dense.len()
        );
        self.sparse.clear();
        self.dense.clear();
        self.payload.clear();
    }

    /// Direct access to the dense entity array, in table order. The slice
    /// is valid (and empty) even for an empty table.
    pub fn entities(&self) -> &[EntityId] {
        &self.dense
    }

    /// Direct access to the dense component array, parallel to
    /// [`Table::entities`]. The slice is valid even for an empty table.
    pub fn components(&self) -> &[T] {
        &self.payload
    }

    /// Mutable access to the dense component array. Entity positions are
    /// unaffected, so live views over this table stay coherent.
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.payload
    }

    /// Iterates every `(entity, component)` pair in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.dense.iter().copied().zip(self.payload.iter())
    }

    /// Unconditional dense access for an entity known to be a member.
    ///
    /// The precondition is checked by a fatal debug assertion only; release
    /// builds perform the raw lookup.
    pub(crate) fn fetch(&self, entity: EntityId) -> &T {
        debug_assert!(self.contains(entity), "entity {entity} is not in this table");
        &self.payload[self.sparse[entity.index() as usize] as usize]
    }

    /// Stable address of this table, used to recognize the driving table
    /// when a join skips its structural membership check.
    pub(crate) fn key(&self) -> usize {
        self as *const Self as usize
    }
}
