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

//! Defines core types related to entities in the ECS architecture.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A unique identifier for an entity in the world.
///
/// It packs an index with a generation count into a single `u32` to solve
/// the "ABA problem". When an entity is released, its index can be recycled
/// for a new entity, but the generation is incremented. This ensures that
/// old `EntityId` handles pointing to a recycled index become invalid and
/// cannot accidentally affect the new entity.
///
/// The low 20 bits hold the index, the high 12 bits the generation. The
/// all-ones index is reserved for [`EntityId::NULL`], which compares unequal
/// to every live identifier.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Pod, Zeroable)]
pub struct EntityId(u32);

impl EntityId {
    const INDEX_BITS: u32 = 20;
    const INDEX_MASK: u32 = (1 << Self::INDEX_BITS) - 1;

    /// Largest representable generation; recyclers wrap modulo this mask.
    pub const MAX_GENERATION: u32 = (1 << (32 - Self::INDEX_BITS)) - 1;

    /// The distinguished null identifier. Never refers to a live entity.
    pub const NULL: EntityId = EntityId(u32::MAX);

    /// Packs an index and a generation into an identifier.
    ///
    /// The index must be below the all-ones value reserved for the null
    /// identifier, the generation must fit its 12 bits. Both are checked by
    /// debug assertions only.
    pub fn new(index: u32, generation: u32) -> Self {
        debug_assert!(index < Self::INDEX_MASK, "entity index out of range");
        debug_assert!(
            generation <= Self::MAX_GENERATION,
            "entity generation out of range"
        );
        Self((generation << Self::INDEX_BITS) | (index & Self::INDEX_MASK))
    }

    /// The index part of the identifier.
    pub fn index(self) -> u32 {
        self.0 & Self::INDEX_MASK
    }

    /// The generation part of the identifier.
    pub fn generation(self) -> u32 {
        self.0 >> Self::INDEX_BITS
    }

    /// Returns true if this is the null identifier.
    pub fn is_null(self) -> bool {
        self.0 & Self::INDEX_MASK == Self::INDEX_MASK
    }

    /// The raw packed representation.
    pub fn to_bits(self) -> u32 {
        self.0
    }

    /// Rebuilds an identifier from its raw packed representation.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null)")
        } else {
            write!(f, "EntityId({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}
