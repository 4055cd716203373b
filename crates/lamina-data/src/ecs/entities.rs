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

//! Entity identifier allocation and recycling.

use lamina_core::ecs::entity::EntityId;

/// Allocates and recycles entity identifiers.
///
/// The allocator maintains one slot per index that has ever been handed
/// out. Releasing an entity pushes its index onto a free list; the next
/// allocation pops it and bumps the generation, so stale handles to the
/// recycled index can no longer match.
#[derive(Default)]
pub struct EntityAllocator {
    /// Current identifier per slot, paired with its liveness.
    slots: Vec<(EntityId, bool)>,
    /// Indices available for reuse, enabling O(1) recycled allocation.
    freed: Vec<u32>,
}

impl EntityAllocator {
    /// Creates a new, empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a new or recycled identifier.
    pub fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.freed.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = (slot.0.generation() + 1) & EntityId::MAX_GENERATION;
            slot.0 = EntityId::new(index, generation);
            slot.1 = true;
            slot.0
        } else {
            let index = self.slots.len() as u32;
            let id = EntityId::new(index, 0);
            self.slots.push((id, true));
            id
        }
    }

    /// Releases an identifier, making its index available for reuse.
    ///
    /// Returns false for a handle whose generation no longer matches the
    /// slot (or that was never allocated); the allocator is unaffected in
    /// that case.
    pub fn release(&mut self, entity: EntityId) -> bool {
        match self.slots.get_mut(entity.index() as usize) {
            Some(slot) if slot.1 && slot.0 == entity => {
                slot.1 = false;
                self.freed.push(entity.index());
                true
            }
            _ => {
                log::warn!("release of a stale entity handle {entity}");
                false
            }
        }
    }

    /// Returns true if the identifier refers to a currently live entity.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.1 && slot.0 == entity)
    }

    /// Number of currently live entities.
    pub fn alive_count(&self) -> usize {
        self.slots.len() - self.freed.len()
    }
}
