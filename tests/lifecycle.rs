use colony_ecs::{ComponentStore, Entity, EntityRef, Relation, World};

colony_ecs::world! {
    /// Small world exercising the entity lifecycle.
    pub struct Sim(max_entities = 64) {
        position: Position { x: i32, y: i32 },
        velocity: Velocity { x: i32, y: i32 },
        health: Health { value: i32 },
        likes: Likes { relationship: Relationship },
    }
}

mod tiny {
    colony_ecs::world! {
        /// Two-slot world for exhaustion and wrap-around tests.
        pub struct Pair(max_entities = 2) {
            tag: Tag { id: i32 },
        }
    }
}

use tiny::{Pair, Tag};

// -- allocation ----------------------------------------------------------

#[test]
fn spawn_assigns_distinct_refs() {
    let mut world = Sim::new();
    let a = world.spawn().entity_ref();
    let b = world.spawn().entity_ref();
    assert_ne!(a, b);
    assert_eq!(world.live_count(), 2);
}

#[test]
fn default_ref_is_never_valid() {
    let mut world = Sim::new();
    world.spawn();
    let empty = EntityRef::default();
    assert!(!world.alive(empty));
    assert!(!world.entity(empty).alive());
}

#[test]
fn killed_slot_is_reused_with_new_generation() {
    let mut world = Sim::new();
    let old = world.spawn().entity_ref();
    world.kill(old);
    let new = world.spawn().entity_ref();
    assert_eq!(old.index, new.index);
    assert_ne!(old.generation, new.generation);
    assert!(!world.alive(old));
    assert!(world.alive(new));
}

#[test]
fn kill_is_idempotent() {
    let mut world = Sim::new();
    let e = world.spawn().entity_ref();
    world.kill(e);
    world.kill(e);
    assert_eq!(world.live_count(), 0);
    // The second kill must not have double-pushed the slot onto the
    // free-list: two spawns must hand out two distinct entities.
    let a = world.spawn().entity_ref();
    let b = world.spawn().entity_ref();
    assert_ne!(a.index, b.index);
}

// -- generational safety -------------------------------------------------

#[test]
fn stale_ref_reports_dead_and_reads_zero() {
    let mut world = Sim::new();
    let dog = world.spawn();
    dog.set(Health { value: 45 });
    let stale = dog.entity_ref();
    world.kill(stale);

    let reborn = world.spawn();
    reborn.set(Health { value: 99 });
    let reborn = reborn.entity_ref();
    assert_eq!(stale.index, reborn.index);

    assert!(!world.alive(stale));
    assert_eq!(world.read::<Health>(stale).value, 0);

    let mut handle = world.entity(stale);
    assert!(!handle.alive());
    assert!(!handle.has::<Health>());
    assert_eq!(handle.get::<Health>().value, 0);
    // Writes through the stale handle must not leak into the new occupant.
    handle.set(Health { value: 7 });

    assert_eq!(world.read::<Health>(reborn).value, 99);
}

#[test]
fn try_entity_rejects_stale_refs() {
    let mut world = Sim::new();
    let e = world.spawn().entity_ref();
    assert!(world.try_entity(e).is_ok());
    world.kill(e);
    let err = world.try_entity(e).unwrap_err();
    assert_eq!(err.reference, e);
}

// -- components ----------------------------------------------------------

#[test]
fn set_then_get_roundtrips() {
    let mut world = Sim::new();
    let e = world.spawn();
    e.set(Position { x: 3, y: 4 });
    let r = e.entity_ref();
    assert!(world.entity(r).has::<Position>());
    assert_eq!(world.read::<Position>(r), Position { x: 3, y: 4 });
}

#[test]
fn set_twice_equals_set_once() {
    let mut world = Sim::new();
    let e = world.spawn();
    e.set(Health { value: 45 });
    e.set(Health { value: 45 });
    let r = e.entity_ref();
    assert_eq!(world.read::<Health>(r).value, 45);
    assert_eq!(world.entity(r).components().count(), 1);
}

#[test]
fn remove_clears_membership_and_is_idempotent() {
    let mut world = Sim::new();
    let e = world.spawn();
    e.set(Health { value: 45 });
    e.remove::<Health>();
    assert!(!e.has::<Health>());
    e.remove::<Health>();
    assert!(!e.has::<Health>());
    // Removing a component that was never attached is also a no-op.
    e.remove::<Velocity>();
    assert!(!e.has::<Velocity>());
}

#[test]
fn get_or_insert_prefers_existing_value() {
    let mut world = Sim::new();
    let mut dog = world.spawn();
    dog.set(Health { value: 45 });
    assert_eq!(dog.get_or_insert(Health { value: 65 }).value, 45);
    let vel = *dog.get_or_insert(Velocity { x: 20, y: 20 });
    assert_eq!(vel, Velocity { x: 20, y: 20 });
    assert!(dog.has::<Velocity>());
}

#[test]
fn components_lists_every_attached_kind() {
    let mut world = Sim::new();
    let e = world.spawn();
    e.set(Health { value: 45 });
    e.set(Position { x: 1, y: 1 });
    e.set(Velocity { x: 2, y: 2 });
    assert_eq!(e.components().count(), 3);

    let ids: Vec<_> = e.components().collect();
    assert!(ids.contains(&<Position as colony_ecs::Component>::ID));
    assert!(ids.contains(&<Health as colony_ecs::Component>::ID));
    assert!(!ids.contains(&<Likes as Relation>::ID));
}

#[test]
fn mask_bit_implies_index_within_range() {
    let mut world = Sim::new();
    world.spawn(); // index 0, no components
    let mut carriers = Vec::new();
    for i in 0..10 {
        let e = world.spawn();
        if i % 2 == 0 {
            e.set(Health { value: i });
            carriers.push(e.entity_ref());
        }
    }
    let range = <Sim as ComponentStore<Health>>::column(&world).range();
    for r in carriers {
        assert!(range.low <= r.index && r.index <= range.high);
    }
}

// -- capacity ------------------------------------------------------------

#[test]
fn try_spawn_fails_when_exhausted() {
    let mut world = Pair::new();
    let a = world.spawn().entity_ref();
    world.spawn();
    let err = world.try_spawn().unwrap_err();
    assert_eq!(err.capacity, 2);

    world.kill(a);
    assert!(world.try_spawn().is_ok());
}

#[test]
fn wrap_around_overwrites_oldest_slot() {
    let mut world = Pair::new();
    let a = world.spawn();
    a.set(Tag { id: 1 });
    let a = a.entity_ref();
    let b = world.spawn().entity_ref();

    // Third spawn wraps onto slot 0; the old occupant must be fully gone.
    let c = world.spawn().entity_ref();
    assert_eq!(c.index, a.index);
    assert!(c.generation > a.generation);
    assert!(!world.alive(a));
    assert!(world.alive(b));
    assert_eq!(world.live_count(), 2);
    assert!(!world.entity(c).has::<Tag>());
    assert_eq!(world.read::<Tag>(a).id, 0);
}

#[test]
fn try_spawn_still_refuses_after_a_wrap() {
    let mut world = Pair::new();
    world.spawn();
    world.spawn();
    world.spawn(); // wraps onto slot 0, world stays full
    assert!(world.try_spawn().is_err());
}

// -- reset ---------------------------------------------------------------

#[test]
fn reset_returns_world_to_empty() {
    let mut world = Sim::new();
    for _ in 0..10 {
        let e = world.spawn();
        e.set(Health { value: 1 });
    }
    world.reset();
    assert_eq!(world.live_count(), 0);
    assert_eq!(world.capacity(), Sim::MAX_ENTITIES);

    let mut visited = 0;
    world.select(|_e: Entity<'_, Sim>, _h: &mut Health| {
        visited += 1;
    });
    assert_eq!(visited, 0);

    // The world is fully usable again after a reset.
    let e = world.spawn();
    e.set(Health { value: 5 });
    let e = e.entity_ref();
    assert_eq!(world.read::<Health>(e).value, 5);
}
