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

//! The multi-table join: filtered iteration across component tables.

use std::any::TypeId;
use std::iter::FusedIterator;

use lamina_core::ecs::entity::EntityId;

use crate::ecs::component::Component;
use crate::ecs::set::{Driver, TableSet};

/// A non-owning composite over included and excluded component tables.
///
/// The join yields the entities present in every included table and absent
/// from every excluded one, without copying them into a side buffer. Its
/// three positions are tuples of `&Table<T>`:
///
/// - `G` ("get"): included tables whose component references are yielded;
/// - `W` ("with"): included tables consulted for membership only — this is
///   where zero-size tag components belong, so they never contribute a
///   callback argument;
/// - `X` ("without"): excluded tables.
///
/// At least one included table is required; construction panics otherwise.
/// The *leading* table — first `G` table, or first `W` table when `G` is
/// empty — is fixed at construction and drives [`Join::iter`],
/// [`Join::find`] and [`Join::rows`]. [`Join::each`] instead re-selects the
/// smallest included table on every call; the two strategies traverse the
/// same result set in different orders.
///
/// Joins borrow their tables, so the dense layouts cannot change while the
/// join or any iterator derived from it is alive.
#[derive(Clone, Copy)]
pub struct Join<'a, G, W = (), X = ()>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    get: G,
    with: W,
    without: X,
    leading: Driver<'a>,
}

impl<'a, G, W, X> Join<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    /// Creates a join over the given table tuples.
    ///
    /// # Panics
    ///
    /// Panics if both included positions are empty: a join with no included
    /// table has no driving table to walk.
    pub fn new(get: G, with: W, without: X) -> Self {
        let leading = get
            .first()
            .or_else(|| with.first())
            .expect("a join needs at least one included table");
        Self {
            get,
            with,
            without,
            leading,
        }
    }

    /// Estimates the number of entities iterated by the join: the minimum
    /// size among the included tables. An upper bound on, never the exact
    /// count of, matching entities.
    pub fn size_hint(&self) -> usize {
        [self.get.min_len(), self.with.min_len()]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(0)
    }

    /// Full membership predicate, evaluated fresh: the entity is in every
    /// included table and in none of the excluded ones.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.get.contains_all(entity)
            && self.with.contains_all(entity)
            && self.without.contains_none(entity)
    }

    /// Returns the component references assigned to the given entity.
    ///
    /// The entity must satisfy [`Join::contains`]. The precondition is
    /// checked by a fatal debug assertion only; no validity re-derivation
    /// happens beyond it, each reference is one O(1) lookup.
    pub fn get(&self, entity: EntityId) -> G::Refs {
        debug_assert!(
            self.contains(entity),
            "entity {entity} is not part of the join"
        );
        self.get.fetch(entity)
    }

    /// Iterates the matching entities in the leading table's dense order.
    /// The iterator is double-ended; `.rev()` walks the join backwards.
    pub fn iter(&self) -> JoinIter<'a, G, W, X> {
        JoinIter {
            entities: self.leading.entities,
            skip: self.leading.key,
            get: self.get,
            with: self.with,
            without: self.without,
            front: 0,
            back: self.leading.entities.len(),
        }
    }

    /// Locates an entity and returns an iterator positioned at it, usable
    /// to resume traversal from that point. Returns an exhausted iterator
    /// if the entity is not part of the join.
    ///
    /// The position comes from the leading table's sparse index in O(1);
    /// the first yield is then verified to be the requested entity before
    /// the iterator is handed out. Under the join invariants that check
    /// cannot fail, it guards against tables mutated behind the join's
    /// back.
    pub fn find(&self, entity: EntityId) -> JoinIter<'a, G, W, X> {
        let mut it = self.iter();
        let offset = if G::LEN > 0 {
            self.get.find_in_first(entity)
        } else {
            self.with.find_in_first(entity)
        };
        match offset {
            Some(pos) => {
                it.front = pos;
                let mut probe = it;
                if probe.next() == Some(entity) {
                    it
                } else {
                    it.front = it.back;
                    it
                }
            }
            None => {
                it.front = it.back;
                it
            }
        }
    }

    /// The first matching entity, if any.
    pub fn first(&self) -> Option<EntityId> {
        self.iter().next()
    }

    /// The last matching entity, if any.
    pub fn last(&self) -> Option<EntityId> {
        self.iter().next_back()
    }

    /// Visits every matching entity with its `G` component references.
    ///
    /// The driving table is re-selected on every call: the currently
    /// smallest included table, ties broken in declaration order (`G`
    /// before `W`). That minimizes membership checks but ties the
    /// iteration order to whichever table is momentarily smallest; use
    /// [`Join::each_by`] or [`Join::rows`] when the order matters.
    pub fn each<F: FnMut(EntityId, G::Refs)>(&self, func: F) {
        self.traverse(self.shortest_driver(), func);
    }

    /// Like [`Join::each`], but forces the table of component `D` to drive
    /// the traversal, trading the optimal pool size for an iteration order
    /// that tracks `D`'s table.
    ///
    /// # Panics
    ///
    /// Panics if `D` is not one of the join's included component types.
    pub fn each_by<D: Component, F: FnMut(EntityId, G::Refs)>(&self, func: F) {
        let driver = self
            .get
            .by_type(TypeId::of::<D>())
            .or_else(|| self.with.by_type(TypeId::of::<D>()))
            .unwrap_or_else(|| {
                panic!(
                    "`{}` is not an included table of this join",
                    std::any::type_name::<D>()
                )
            });
        self.traverse(driver, func);
    }

    /// Lazy sequence of `(entity, refs)` records, always driven by the
    /// fixed leading table. The leading payload is read directly from the
    /// dense array being walked; the other references go through their
    /// sparse indices.
    pub fn rows(&self) -> Rows<'a, G, W, X> {
        Rows {
            entities: self.leading.entities,
            skip: self.leading.key,
            get: self.get,
            with: self.with,
            without: self.without,
            offset: 0,
        }
    }

    /// Walks one driving table, applying the restricted validity predicate
    /// and invoking the callback on every match.
    fn traverse<F: FnMut(EntityId, G::Refs)>(&self, driver: Driver<'a>, mut func: F) {
        for &entity in driver.entities {
            if self.valid_except(driver.key, entity) {
                func(entity, self.get.fetch(entity));
            }
        }
    }

    /// Smallest included table, ties broken in declaration order.
    fn shortest_driver(&self) -> Driver<'a> {
        match (self.get.shortest(), self.with.shortest()) {
            (Some(get), Some(with)) => {
                if with.len() < get.len() {
                    with
                } else {
                    get
                }
            }
            (Some(get), None) => get,
            (None, Some(with)) => with,
            // Construction guarantees an included table.
            (None, None) => self.leading,
        }
    }

    /// Restricted validity predicate: membership in the driving table is
    /// structural, so only the other included tables and the excluded
    /// tables are checked. Short-circuits in declaration order.
    fn valid_except(&self, skip: usize, entity: EntityId) -> bool {
        self.get.contains_all_except(skip, entity)
            && self.with.contains_all_except(skip, entity)
            && self.without.contains_none(entity)
    }
}

impl<'a, G, W, X> IntoIterator for &Join<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    type Item = EntityId;
    type IntoIter = JoinIter<'a, G, W, X>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended filtering cursor over the leading table's dense entities.
///
/// Entries failing the restricted validity predicate are skipped lazily in
/// both directions. Yields bare entity identifiers; pair it with
/// [`Join::get`] or use [`Join::rows`] for component access.
#[derive(Clone, Copy)]
pub struct JoinIter<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    entities: &'a [EntityId],
    skip: usize,
    get: G,
    with: W,
    without: X,
    front: usize,
    back: usize,
}

impl<'a, G, W, X> JoinIter<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    fn valid(&self, entity: EntityId) -> bool {
        self.get.contains_all_except(self.skip, entity)
            && self.with.contains_all_except(self.skip, entity)
            && self.without.contains_none(entity)
    }
}

impl<'a, G, W, X> Iterator for JoinIter<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        while self.front < self.back {
            let entity = self.entities[self.front];
            self.front += 1;
            if self.valid(entity) {
                return Some(entity);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.back - self.front))
    }
}

impl<'a, G, W, X> DoubleEndedIterator for JoinIter<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    fn next_back(&mut self) -> Option<EntityId> {
        while self.back > self.front {
            self.back -= 1;
            let entity = self.entities[self.back];
            if self.valid(entity) {
                return Some(entity);
            }
        }
        None
    }
}

impl<'a, G, W, X> FusedIterator for JoinIter<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
}

/// Lazy sequence of `(entity, refs)` records over a join.
///
/// Always driven by the join's fixed leading table, so the record order
/// tracks that table's dense order rather than whichever included table is
/// momentarily smallest. Restartable by calling [`Join::rows`] again.
#[derive(Clone)]
pub struct Rows<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    entities: &'a [EntityId],
    skip: usize,
    get: G,
    with: W,
    without: X,
    offset: usize,
}

impl<'a, G, W, X> Iterator for Rows<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
    type Item = (EntityId, G::Refs);

    fn next(&mut self) -> Option<Self::Item> {
        while self.offset < self.entities.len() {
            let offset = self.offset;
            self.offset += 1;
            let entity = self.entities[offset];
            let valid = self.get.contains_all_except(self.skip, entity)
                && self.with.contains_all_except(self.skip, entity)
                && self.without.contains_none(entity);
            if valid {
                // The leading table is the first `G` table whenever `G` is
                // non-empty; its payload sits at the offset being walked.
                let refs = if G::LEN > 0 {
                    self.get.fetch_at(offset, entity)
                } else {
                    self.get.fetch(entity)
                };
                return Some((entity, refs));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entities.len() - self.offset))
    }
}

impl<'a, G, W, X> FusedIterator for Rows<'a, G, W, X>
where
    G: TableSet<'a>,
    W: TableSet<'a>,
    X: TableSet<'a>,
{
}
