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

use super::entities::EntityAllocator;
use super::join::Join;
use super::table::Table;
use super::view::View;
use super::Component;
use lamina_core::ecs::entity::EntityId;

// --- DUMMY COMPONENTS FOR TESTING ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position(i32);
impl Component for Position {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Velocity(i32);
impl Component for Velocity {}

/// Zero-size tag: presence, not value, is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frozen;
impl Component for Frozen {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Disabled;
impl Component for Disabled {}

fn entity(index: u32) -> EntityId {
    EntityId::new(index, 0)
}

// --- TABLE TESTS ---

#[test]
fn test_table_insert_replace_and_swap_remove() {
    // --- 1. SETUP ---
    let mut table = Table::new();
    let (a, b, c) = (entity(0), entity(1), entity(2));

    // --- 2. ACTION ---
    assert_eq!(table.insert(a, Position(1)), None);
    assert_eq!(table.insert(b, Position(2)), None);
    assert_eq!(table.insert(c, Position(3)), None);

    // --- 3. ASSERTIONS ---
    assert_eq!(
        table.insert(b, Position(20)),
        Some(Position(2)),
        "re-inserting must replace and hand back the previous value"
    );
    assert_eq!(table.len(), 3, "a replace must not grow the table");

    // Removing the first entry swaps the last one into the vacated offset.
    assert_eq!(table.remove(a), Some(Position(1)));
    assert_eq!(
        table.entities(),
        &[c, b],
        "the last dense entry should have been swapped into offset 0"
    );
    assert_eq!(
        table.find(c),
        Some(0),
        "the sparse index must follow the swapped entry"
    );
    assert_eq!(table.get(b), Some(&Position(20)));
    assert!(!table.contains(a));
    assert_eq!(table.remove(a), None, "double removal must be a no-op");
}

#[test]
fn test_table_rejects_stale_generations() {
    let mut allocator = EntityAllocator::new();
    let mut table = Table::new();

    let stale = allocator.allocate();
    table.insert(stale, Position(1));
    allocator.release(stale);

    // Same index, bumped generation.
    let recycled = allocator.allocate();
    assert_eq!(recycled.index(), stale.index());

    assert!(
        !table.contains(recycled),
        "the recycled handle must not see the stale entry"
    );
    assert_eq!(table.get(recycled), None);
    assert_eq!(table.remove(recycled), None);
    assert!(
        table.contains(stale),
        "the stale entry itself is untouched until removed"
    );
}

#[test]
fn test_removing_current_entity_during_reverse_walk() {
    // --- 1. SETUP ---
    let mut table = Table::new();
    let (a, b, c) = (entity(0), entity(1), entity(2));
    table.insert(a, Position(1));
    table.insert(b, Position(2));
    table.insert(c, Position(3));

    // --- 2. ACTION ---
    // Walk the dense array back to front, removing the entry currently
    // pointed at. Swap-remove compaction only ever moves already-visited
    // entries, so the walk neither crashes nor revisits.
    let mut visited = Vec::new();
    let mut pos = table.len();
    while pos > 0 {
        pos -= 1;
        let current = table.entities()[pos];
        visited.push(current);
        if current == b {
            table.remove(current);
        }
    }

    // --- 3. ASSERTIONS ---
    assert_eq!(
        visited,
        vec![c, b, a],
        "every entity is reached exactly once, none is revisited"
    );
    assert_eq!(table.entities(), &[a, c]);
}

// --- SINGLE-TABLE VIEW TESTS ---

#[test]
fn test_view_mirrors_its_table() {
    let mut table = Table::new();
    let (a, b) = (entity(4), entity(7));
    table.insert(a, Position(40));
    table.insert(b, Position(70));

    let view = View::new(&table);
    assert_eq!(view.len(), table.len());
    assert!(!view.is_empty());
    assert_eq!(view.contains(a), table.contains(a));
    assert_eq!(view.contains(entity(9)), table.contains(entity(9)));

    // The parallel dense slices pair entity and payload at equal offsets.
    assert_eq!(view.data(), &[a, b]);
    assert_eq!(view.raw(), &[Position(40), Position(70)]);
    assert_eq!(view.get(b), &Position(70));
}

#[test]
fn test_view_over_empty_table() {
    let table: Table<Position> = Table::new();
    let view = View::new(&table);

    assert!(view.is_empty());
    assert!(view.raw().is_empty(), "slices stay valid for empty tables");
    assert!(view.data().is_empty());
    assert_eq!(view.iter().next(), None);
    assert_eq!(view.first(), None);
    assert_eq!(view.last(), None);
}

#[test]
fn test_view_iterates_in_dense_order() {
    let mut table = Table::new();
    let (a, b, c) = (entity(5), entity(3), entity(9));
    table.insert(a, Position(50));
    table.insert(b, Position(30));
    table.insert(c, Position(90));

    let view = View::new(&table);
    let forward: Vec<_> = view.iter().collect();
    assert_eq!(forward, vec![a, b, c], "iteration follows insertion order");

    let backward: Vec<_> = view.iter().rev().collect();
    assert_eq!(backward, vec![c, b, a]);

    assert_eq!(view[1], b, "indexing returns the entity at a dense offset");
    assert_eq!(view.find(c), Some(2));
    assert_eq!(view.find(entity(6)), None);
    assert_eq!(view.first(), Some(a));
    assert_eq!(view.last(), Some(c));
}

#[test]
fn test_view_each_visits_every_pair_once() {
    let mut table = Table::new();
    let (a, b) = (entity(0), entity(1));
    table.insert(a, Position(1));
    table.insert(b, Position(2));

    let view = View::new(&table);
    let mut pairs = Vec::new();
    view.each(|entity, component| pairs.push((entity, *component)));
    assert_eq!(pairs, vec![(a, Position(1)), (b, Position(2))]);

    let rows: Vec<_> = view.rows().map(|(entity, c)| (entity, *c)).collect();
    assert_eq!(rows, pairs, "each and rows walk the same records");
}

// --- JOIN TESTS ---

#[test]
fn test_join_is_the_included_intersection() {
    // --- 1. SETUP ---
    // A = {1, 2, 3}, B = {2, 3, 4}, both with payloads keyed off the index.
    let (e1, e2, e3, e4) = (entity(1), entity(2), entity(3), entity(4));
    let mut positions = Table::new();
    positions.insert(e1, Position(10));
    positions.insert(e2, Position(20));
    positions.insert(e3, Position(30));
    let mut velocities = Table::new();
    velocities.insert(e2, Velocity(-2));
    velocities.insert(e3, Velocity(-3));
    velocities.insert(e4, Velocity(-4));

    // --- 2. ACTION ---
    let join = Join::new((&positions, &velocities), (), ());

    // --- 3. ASSERTIONS ---
    let matched: Vec<_> = join.iter().collect();
    assert_eq!(matched, vec![e2, e3], "only the intersection is yielded");

    assert!(join.contains(e2) && join.contains(e3));
    assert!(
        !join.contains(e1) && !join.contains(e4),
        "entities missing from either table are not members"
    );

    let (position, velocity) = join.get(e2);
    assert_eq!(position, &Position(20));
    assert_eq!(velocity, &Velocity(-2));

    assert_eq!(join.first(), Some(e2));
    assert_eq!(join.last(), Some(e3));
    let backward: Vec<_> = join.iter().rev().collect();
    assert_eq!(backward, vec![e3, e2]);
}

#[test]
fn test_join_excludes_unwanted_tables() {
    // A = {1, 2, 3}, excluded C = {2}.
    let (e1, e2, e3) = (entity(1), entity(2), entity(3));
    let mut positions = Table::new();
    positions.insert(e1, Position(10));
    positions.insert(e2, Position(20));
    positions.insert(e3, Position(30));
    let mut disabled = Table::new();
    disabled.insert(e2, Disabled);

    let join = Join::new((&positions,), (), (&disabled,));
    let matched: Vec<_> = join.iter().collect();
    assert_eq!(matched, vec![e1, e3]);
    assert!(!join.contains(e2), "excluded entities are not members");
}

#[test]
fn test_join_size_hint_is_the_minimum_included_size() {
    let (e1, e2, e3) = (entity(1), entity(2), entity(3));
    let mut positions = Table::new();
    positions.insert(e1, Position(1));
    positions.insert(e2, Position(2));
    positions.insert(e3, Position(3));
    let mut velocities = Table::new();
    velocities.insert(e1, Velocity(1));
    velocities.insert(e3, Velocity(3));
    let mut frozen = Table::new();
    frozen.insert(e3, Frozen);

    let join = Join::new((&positions, &velocities), (&frozen,), ());
    assert_eq!(
        join.size_hint(),
        1,
        "the hint is the smallest included table, tags included"
    );
    assert!(
        join.size_hint() >= join.iter().count(),
        "the hint is an upper bound on the true count"
    );
}

#[test]
fn test_join_find_agrees_with_contains() {
    let (e1, e2, e3, e4, e5) = (entity(1), entity(2), entity(3), entity(4), entity(5));
    let mut positions = Table::new();
    positions.insert(e1, Position(1));
    positions.insert(e2, Position(2));
    positions.insert(e3, Position(3));
    let mut velocities = Table::new();
    velocities.insert(e2, Velocity(2));
    velocities.insert(e3, Velocity(3));
    velocities.insert(e4, Velocity(4));

    let join = Join::new((&positions, &velocities), (), ());

    for candidate in [e1, e2, e3, e4, e5] {
        let found = join.find(candidate).next();
        if join.contains(candidate) {
            assert_eq!(found, Some(candidate), "find must land on the entity itself");
        } else {
            assert_eq!(found, None, "find of a non-member must be exhausted");
        }
    }

    // The returned cursor resumes traversal from the found position.
    let mut it = join.find(e2);
    assert_eq!(it.next(), Some(e2));
    assert_eq!(it.next(), Some(e3));
    assert_eq!(it.next(), None);
}

#[test]
fn test_join_iteration_follows_leading_dense_order() {
    let (e1, e2, e3) = (entity(1), entity(2), entity(3));
    let mut positions = Table::new();
    positions.insert(e3, Position(3));
    positions.insert(e1, Position(1));
    positions.insert(e2, Position(2));
    let mut velocities = Table::new();
    velocities.insert(e1, Velocity(1));
    velocities.insert(e2, Velocity(2));
    velocities.insert(e3, Velocity(3));

    // The leading table is the first included one: positions.
    let join = Join::new((&positions, &velocities), (), ());
    let matched: Vec<_> = join.iter().collect();
    assert_eq!(
        matched,
        vec![e3, e1, e2],
        "iteration is a position-increasing walk of the leading dense array"
    );
    for entity in matched {
        assert!(join.contains(entity));
    }
}

#[test]
fn test_join_each_reselects_the_smallest_driver() {
    // --- 1. SETUP ---
    // positions = [e1, e2, e3], velocities = [e3, e2]: the dynamic driver
    // is the velocity table, the fixed leading table is positions.
    let (e1, e2, e3) = (entity(1), entity(2), entity(3));
    let mut positions = Table::new();
    positions.insert(e1, Position(1));
    positions.insert(e2, Position(2));
    positions.insert(e3, Position(3));
    let mut velocities = Table::new();
    velocities.insert(e3, Velocity(3));
    velocities.insert(e2, Velocity(2));

    let join = Join::new((&positions, &velocities), (), ());

    // --- 2. ACTION ---
    let mut each_order = Vec::new();
    join.each(|entity, _| each_order.push(entity));
    let rows_order: Vec<_> = join.rows().map(|(entity, _)| entity).collect();

    // --- 3. ASSERTIONS ---
    assert_eq!(
        each_order,
        vec![e3, e2],
        "each follows the momentarily smallest table"
    );
    assert_eq!(
        rows_order,
        vec![e2, e3],
        "rows always follow the fixed leading table"
    );
}

#[test]
fn test_join_each_and_rows_agree_on_records() {
    let (e1, e2, e3) = (entity(1), entity(2), entity(3));
    let mut positions = Table::new();
    positions.insert(e1, Position(1));
    positions.insert(e2, Position(2));
    positions.insert(e3, Position(3));
    let mut velocities = Table::new();
    velocities.insert(e3, Velocity(3));
    velocities.insert(e2, Velocity(2));

    let join = Join::new((&positions, &velocities), (), ());

    // Orders differ (dynamic vs leading driver), the record sets must not.
    // Compare component identity, not just value.
    let mut from_each = Vec::new();
    join.each(|entity, (position, velocity)| {
        from_each.push((
            entity,
            position as *const Position,
            velocity as *const Velocity,
        ));
    });
    let mut from_rows: Vec<_> = join
        .rows()
        .map(|(entity, (position, velocity))| {
            (
                entity,
                position as *const Position,
                velocity as *const Velocity,
            )
        })
        .collect();

    from_each.sort_by_key(|(entity, ..)| entity.index());
    from_rows.sort_by_key(|(entity, ..)| entity.index());
    assert_eq!(from_each, from_rows);
}

#[test]
fn test_join_each_by_forces_the_driver() {
    let (e1, e2, e3) = (entity(1), entity(2), entity(3));
    let mut positions = Table::new();
    positions.insert(e1, Position(1));
    positions.insert(e2, Position(2));
    positions.insert(e3, Position(3));
    let mut velocities = Table::new();
    velocities.insert(e3, Velocity(3));
    velocities.insert(e2, Velocity(2));

    let join = Join::new((&positions, &velocities), (), ());

    let mut by_position = Vec::new();
    join.each_by::<Position, _>(|entity, _| by_position.push(entity));
    assert_eq!(by_position, vec![e2, e3], "order tracks the position table");

    let mut by_velocity = Vec::new();
    join.each_by::<Velocity, _>(|entity, _| by_velocity.push(entity));
    assert_eq!(by_velocity, vec![e3, e2], "order tracks the velocity table");
}

#[test]
#[should_panic(expected = "not an included table")]
fn test_join_each_by_rejects_foreign_components() {
    let mut positions = Table::new();
    positions.insert(entity(1), Position(1));
    let join = Join::new((&positions,), (), ());
    join.each_by::<Velocity, _>(|_, _| {});
}

#[test]
fn test_tag_membership_without_payload_arguments() {
    // --- 1. SETUP ---
    let (e1, e2, e3) = (entity(1), entity(2), entity(3));
    let mut positions = Table::new();
    positions.insert(e1, Position(1));
    positions.insert(e2, Position(2));
    positions.insert(e3, Position(3));
    let mut frozen = Table::new();
    frozen.insert(e1, Frozen);
    frozen.insert(e3, Frozen);

    // --- 2. ACTION & ASSERTIONS ---
    // The tag narrows membership but contributes no callback argument.
    let join = Join::new((&positions,), (&frozen,), ());
    let mut narrowed = Vec::new();
    join.each(|entity, (position,)| narrowed.push((entity, *position)));
    assert_eq!(narrowed, vec![(e1, Position(1)), (e3, Position(3))]);

    // A tag-only join passes no component references at all.
    let tags_only = Join::new((), (&frozen,), ());
    let mut visited = Vec::new();
    tags_only.each(|entity, ()| visited.push(entity));
    assert_eq!(
        visited,
        vec![e1, e3],
        "one invocation per matching entity, nothing else supplied"
    );
    assert_eq!(tags_only.size_hint(), 2);
}

#[test]
fn test_join_with_all_three_positions() {
    // e1: P+V+F, e2: P+V+F but disabled, e3: P+V only, e4: P+F only.
    let (e1, e2, e3, e4) = (entity(1), entity(2), entity(3), entity(4));
    let mut positions = Table::new();
    let mut velocities = Table::new();
    let mut frozen = Table::new();
    let mut disabled = Table::new();
    for (target, value) in [(e1, 1), (e2, 2), (e3, 3), (e4, 4)] {
        positions.insert(target, Position(value));
    }
    velocities.insert(e1, Velocity(1));
    velocities.insert(e2, Velocity(2));
    velocities.insert(e3, Velocity(3));
    frozen.insert(e1, Frozen);
    frozen.insert(e2, Frozen);
    frozen.insert(e4, Frozen);
    disabled.insert(e2, Disabled);

    let join = Join::new((&positions, &velocities), (&frozen,), (&disabled,));

    let matched: Vec<_> = join.iter().collect();
    assert_eq!(matched, vec![e1], "only e1 satisfies the full predicate");

    let mut visited = Vec::new();
    join.each(|entity, (position, velocity)| visited.push((entity, *position, *velocity)));
    assert_eq!(visited, vec![(e1, Position(1), Velocity(1))]);

    let mut it = join.find(e2);
    assert_eq!(it.next(), None, "an excluded entity is not findable");
}

#[test]
fn test_join_over_empty_table_yields_nothing() {
    let positions: Table<Position> = Table::new();
    let mut velocities = Table::new();
    velocities.insert(entity(1), Velocity(1));

    let join = Join::new((&positions, &velocities), (), ());
    assert_eq!(join.size_hint(), 0);
    assert_eq!(join.iter().next(), None);
    assert_eq!(join.first(), None);
    assert_eq!(join.last(), None);
    assert_eq!(join.find(entity(1)).next(), None);
}

// --- ENTITY ALLOCATOR TESTS ---

#[test]
fn test_allocator_recycling_and_stale_handles() {
    // --- 1. SETUP ---
    let mut allocator = EntityAllocator::new();

    // --- Part A: allocate and release ---
    let id_a = allocator.allocate();
    assert_eq!(id_a.index(), 0, "the first entity should have index 0");
    assert_eq!(id_a.generation(), 0);
    assert!(allocator.release(id_a));

    // --- Part B: recycle the index ---
    let id_b = allocator.allocate();
    assert_eq!(id_b.index(), 0, "the recycled entity should have index 0");
    assert_eq!(
        id_b.generation(),
        1,
        "the generation should be incremented to 1"
    );

    // --- Part C: stale handle protection ---
    assert!(
        !allocator.release(id_a),
        "releasing with a stale handle should fail"
    );
    assert!(allocator.is_alive(id_b), "id_b must be unaffected");
    assert!(!allocator.is_alive(id_a));
    assert_eq!(allocator.alive_count(), 1);

    // --- Part D: release with the correct handle ---
    assert!(allocator.release(id_b));
    assert_eq!(allocator.alive_count(), 0);
}
