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

//! Monomorphized operations over tuples of borrowed tables.
//!
//! A join addresses its tables by type identity through [`TableSet`],
//! implemented for `()` and for tuples of `&Table<T>` up to eight entries.
//! Everything a join needs from a position — membership checks, the
//! smallest table, the leading table, component references — is expressed
//! here once per tuple arity, so the join itself stays free of per-type
//! dispatch.

use std::any::TypeId;

use lamina_core::ecs::entity::EntityId;

use crate::ecs::component::Component;
use crate::ecs::table::Table;

/// A type-erased handle to one table's dense entity array.
///
/// The key is the table's address; a join compares it against a table
/// reference to recognize the driving table and skip its structural
/// membership check.
#[derive(Clone, Copy)]
pub struct Driver<'a> {
    pub(crate) key: usize,
    pub(crate) entities: &'a [EntityId],
}

impl<'a> Driver<'a> {
    /// Number of entities in the driven table.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the driven table is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Operations a join needs from one of its tuple positions.
///
/// Implemented for `()` (the empty position) and for tuples of table
/// references. The associated `Refs` type is the tuple of component
/// references yielded per entity — `()` contributes nothing, which is how
/// membership-only positions stay out of callback signatures.
pub trait TableSet<'a>: Copy {
    /// Component references yielded per entity, one per tuple entry.
    type Refs;

    /// Number of tables in the set.
    const LEN: usize;

    /// Returns true if every table contains the entity.
    fn contains_all(&self, entity: EntityId) -> bool;

    /// Returns true if no table contains the entity.
    fn contains_none(&self, entity: EntityId) -> bool;

    /// Like [`TableSet::contains_all`], but treats the table whose address
    /// equals `skip` as containing the entity structurally.
    fn contains_all_except(&self, skip: usize, entity: EntityId) -> bool;

    /// Size of the smallest table, if the set is non-empty.
    fn min_len(&self) -> Option<usize>;

    /// Driver handle of the smallest table; earlier entries win ties.
    fn shortest(&self) -> Option<Driver<'a>>;

    /// Driver handle of the first table in declaration order.
    fn first(&self) -> Option<Driver<'a>>;

    /// Driver handle of the table storing the given component type.
    fn by_type(&self, type_id: TypeId) -> Option<Driver<'a>>;

    /// Dense position of the entity in the first table.
    fn find_in_first(&self, entity: EntityId) -> Option<usize>;

    /// Component references for an entity contained in every table.
    ///
    /// Preconditions are checked by fatal debug assertions only.
    fn fetch(&self, entity: EntityId) -> Self::Refs;

    /// Like [`TableSet::fetch`], but reads the first table's payload
    /// directly at the given dense offset instead of through its sparse
    /// index. The entity must live at that offset.
    fn fetch_at(&self, offset: usize, entity: EntityId) -> Self::Refs;
}

impl<'a> TableSet<'a> for () {
    type Refs = ();

    const LEN: usize = 0;

    fn contains_all(&self, _entity: EntityId) -> bool {
        true
    }

    fn contains_none(&self, _entity: EntityId) -> bool {
        true
    }

    fn contains_all_except(&self, _skip: usize, _entity: EntityId) -> bool {
        true
    }

    fn min_len(&self) -> Option<usize> {
        None
    }

    fn shortest(&self) -> Option<Driver<'a>> {
        None
    }

    fn first(&self) -> Option<Driver<'a>> {
        None
    }

    fn by_type(&self, _type_id: TypeId) -> Option<Driver<'a>> {
        None
    }

    fn find_in_first(&self, _entity: EntityId) -> Option<usize> {
        None
    }

    fn fetch(&self, _entity: EntityId) -> Self::Refs {}

    fn fetch_at(&self, _offset: usize, _entity: EntityId) -> Self::Refs {}
}

// Implementation for tuples of table references. A macro keeps the eight
// arities in lock-step, in the same spirit as the component-tuple
// implementations elsewhere in the ecosystem.
macro_rules! impl_table_set {
    ($head:ident $(, $tail:ident)*) => {
        impl<'a, $head: Component $(, $tail: Component)*> TableSet<'a>
            for (&'a Table<$head>, $(&'a Table<$tail>,)*)
        {
            type Refs = (&'a $head, $(&'a $tail,)*);

            const LEN: usize = [stringify!($head) $(, stringify!($tail))*].len();

            #[allow(non_snake_case)]
            fn contains_all(&self, entity: EntityId) -> bool {
                let ($head, $($tail,)*) = *self;
                $head.contains(entity) $(&& $tail.contains(entity))*
            }

            #[allow(non_snake_case)]
            fn contains_none(&self, entity: EntityId) -> bool {
                let ($head, $($tail,)*) = *self;
                !($head.contains(entity) $(|| $tail.contains(entity))*)
            }

            #[allow(non_snake_case)]
            fn contains_all_except(&self, skip: usize, entity: EntityId) -> bool {
                let ($head, $($tail,)*) = *self;
                ($head.key() == skip || $head.contains(entity))
                    $(&& ($tail.key() == skip || $tail.contains(entity)))*
            }

            #[allow(non_snake_case)]
            fn min_len(&self) -> Option<usize> {
                let ($head, $($tail,)*) = *self;
                #[allow(unused_mut)]
                let mut min = $head.len();
                $(min = min.min($tail.len());)*
                Some(min)
            }

            #[allow(non_snake_case)]
            fn shortest(&self) -> Option<Driver<'a>> {
                let ($head, $($tail,)*) = *self;
                #[allow(unused_mut)]
                let mut best = Driver {
                    key: $head.key(),
                    entities: $head.entities(),
                };
                $(
                    if $tail.len() < best.entities.len() {
                        best = Driver {
                            key: $tail.key(),
                            entities: $tail.entities(),
                        };
                    }
                )*
                Some(best)
            }

            #[allow(non_snake_case)]
            fn first(&self) -> Option<Driver<'a>> {
                let ($head, ..) = *self;
                Some(Driver {
                    key: $head.key(),
                    entities: $head.entities(),
                })
            }

            #[allow(non_snake_case)]
            fn by_type(&self, type_id: TypeId) -> Option<Driver<'a>> {
                let ($head, $($tail,)*) = *self;
                if TypeId::of::<$head>() == type_id {
                    return Some(Driver {
                        key: $head.key(),
                        entities: $head.entities(),
                    });
                }
                $(
                    if TypeId::of::<$tail>() == type_id {
                        return Some(Driver {
                            key: $tail.key(),
                            entities: $tail.entities(),
                        });
                    }
                )*
                None
            }

            #[allow(non_snake_case)]
            fn find_in_first(&self, entity: EntityId) -> Option<usize> {
                let ($head, ..) = *self;
                $head.find(entity)
            }

            #[allow(non_snake_case)]
            fn fetch(&self, entity: EntityId) -> Self::Refs {
                let ($head, $($tail,)*) = *self;
                ($head.fetch(entity), $($tail.fetch(entity),)*)
            }

            #[allow(non_snake_case)]
            fn fetch_at(&self, offset: usize, entity: EntityId) -> Self::Refs {
                let ($head, $($tail,)*) = *self;
                debug_assert_eq!(
                    $head.entities().get(offset).copied(),
                    Some(entity),
                    "dense offset does not hold the expected entity"
                );
                (&$head.components()[offset], $($tail.fetch(entity),)*)
            }
        }
    };
}

impl_table_set!(A);
impl_table_set!(A, B);
impl_table_set!(A, B, C);
impl_table_set!(A, B, C, D);
impl_table_set!(A, B, C, D, E);
impl_table_set!(A, B, C, D, E, F);
impl_table_set!(A, B, C, D, E, F, G);
impl_table_set!(A, B, C, D, E, F, G, H);
