use colony_ecs::{EntityRef, Relation, Relationship, World};

colony_ecs::world! {
    /// World with both pure and payload-carrying relationships.
    pub struct Sim(max_entities = 64) {
        name: Name { id: i32 },
        has: Has { relationship: Relationship, count: i32 },
        likes: Likes { relationship: Relationship },
    }
}

fn holding(count: i32) -> Has {
    Has {
        relationship: Relationship,
        count,
    }
}

// -- core scenario -------------------------------------------------------

#[test]
fn edges_follow_target_liveness() {
    let mut world = Sim::new();
    let e = world.spawn().entity_ref();
    let apple = world.spawn().entity_ref();
    let gun = world.spawn().entity_ref();
    let egg = world.spawn().entity_ref();

    {
        let holder = world.entity(e);
        holder.relate(apple, holding(5));
        holder.relate(gun, holding(1));
        holder.relate(egg, holding(3));
        holder.relate(apple, Likes::default());
        holder.relate(gun, Likes::default());
        holder.relate(egg, Likes::default());
    }

    world.kill(egg);

    let holder = world.entity(e);
    let mut count = 0;
    holder.relations(|_target, has: &mut Has| {
        count += has.count;
    });
    assert_eq!(count, 6);

    let mut liked = 0;
    holder.relations(|_target, _edge: &mut Likes| {
        liked += 1;
    });
    assert_eq!(liked, 2);

    assert!(!holder.relates_to::<Likes>(egg));
    assert!(holder.relates_to::<Likes>(gun));

    holder.unrelate::<Likes>(gun);
    assert!(!holder.relates_to::<Likes>(gun));

    // An entity whose only edge was removed reports no relations at all.
    let single = world.spawn();
    let single_ref = single.entity_ref();
    single.relate(gun, Likes::default());
    single.unrelate::<Likes>(gun);
    assert!(!world.entity(single_ref).relates_any::<Likes>());
}

// -- membership bit ------------------------------------------------------

#[test]
fn relation_bit_tracks_outgoing_edges() {
    let mut world = Sim::new();
    let a = world.spawn().entity_ref();
    let b = world.spawn().entity_ref();

    let likes_id = <Likes as Relation>::ID;
    assert!(!world.entity(a).components().any(|id| id == likes_id));

    world.entity(a).relate(b, Likes::default());
    assert!(world.entity(a).components().any(|id| id == likes_id));

    world.entity(a).unrelate::<Likes>(b);
    assert!(!world.entity(a).components().any(|id| id == likes_id));
}

#[test]
fn killing_the_last_target_clears_the_source_bit() {
    let mut world = Sim::new();
    let a = world.spawn().entity_ref();
    let b = world.spawn().entity_ref();
    world.entity(a).relate(b, Likes::default());

    world.kill(b);

    let likes_id = <Likes as Relation>::ID;
    assert!(!world.entity(a).components().any(|id| id == likes_id));
    assert!(!world.entity(a).relates_any::<Likes>());
}

// -- symmetry under death ------------------------------------------------

#[test]
fn killing_a_source_detaches_its_edges() {
    let mut world = Sim::new();
    let a = world.spawn().entity_ref();
    let b = world.spawn().entity_ref();
    world.entity(a).relate(b, Likes::default());

    world.kill(a);
    let reborn = world.spawn().entity_ref();
    assert_eq!(reborn.index, a.index);

    // The reused slot starts with a clean adjacency.
    assert!(!world.entity(reborn).relates_any::<Likes>());
    assert!(!world.entity(reborn).relates_to::<Likes>(b));
}

#[test]
fn reused_target_slots_do_not_resurrect_edges() {
    let mut world = Sim::new();
    let a = world.spawn().entity_ref();
    let x = world.spawn().entity_ref();
    world.entity(a).relate(x, Likes::default());

    world.kill(x);
    let y = world.spawn().entity_ref();
    assert_eq!(y.index, x.index);

    assert!(!world.entity(a).relates_to::<Likes>(x));
    assert!(!world.entity(a).relates_to::<Likes>(y));
    assert!(!world.entity(a).relates_any::<Likes>());
}

#[test]
fn cyclic_edges_survive_and_die_cleanly() {
    let mut world = Sim::new();
    let a = world.spawn().entity_ref();
    let b = world.spawn().entity_ref();
    world.entity(a).relate(b, Likes::default());
    world.entity(b).relate(a, Likes::default());

    assert!(world.entity(a).relates_to::<Likes>(b));
    assert!(world.entity(b).relates_to::<Likes>(a));

    world.kill(a);
    assert!(!world.entity(b).relates_any::<Likes>());
}

// -- payloads ------------------------------------------------------------

#[test]
fn edge_payloads_are_mutable_in_place() {
    let mut world = Sim::new();
    let e = world.spawn().entity_ref();
    let apple = world.spawn().entity_ref();
    let gun = world.spawn().entity_ref();

    {
        let holder = world.entity(e);
        holder.relate(apple, holding(5));
        holder.relate(gun, holding(1));
    }

    world.entity(e).relations(|_target, has: &mut Has| {
        has.count += 10;
    });

    let mut total = 0;
    world.entity(e).relations(|_target, has: &mut Has| {
        total += has.count;
    });
    assert_eq!(total, 26);
}

#[test]
fn relate_overwrites_edge_payload() {
    let mut world = Sim::new();
    let e = world.spawn().entity_ref();
    let apple = world.spawn().entity_ref();

    world.entity(e).relate(apple, holding(5));
    world.entity(e).relate(apple, holding(9));

    let mut total = 0;
    world.entity(e).relations(|_target, has: &mut Has| {
        total += has.count;
    });
    assert_eq!(total, 9);
}

#[test]
fn relation_callbacks_can_read_target_components() {
    let mut world = Sim::new();
    let e = world.spawn().entity_ref();
    let apple = world.spawn();
    apple.set(Name { id: 7 });
    let apple = apple.entity_ref();
    world.entity(e).relate(apple, holding(2));

    let mut seen = Vec::new();
    world.entity(e).relations(|mut target, _has: &mut Has| {
        seen.push(target.get::<Name>().id);
    });
    assert_eq!(seen, vec![7]);
}

// -- defensive paths -----------------------------------------------------

#[test]
fn relating_to_a_dead_target_is_a_noop() {
    let mut world = Sim::new();
    let a = world.spawn().entity_ref();
    let t = world.spawn().entity_ref();
    world.kill(t);

    world.entity(a).relate(t, Likes::default());
    assert!(!world.entity(a).relates_any::<Likes>());
}

#[test]
fn sentinel_handles_ignore_relationship_calls() {
    let mut world = Sim::new();
    let t = world.spawn().entity_ref();
    let ghost = EntityRef::default();

    let handle = world.entity(ghost);
    handle.relate(t, Likes::default());
    assert!(!handle.relates_any::<Likes>());
    assert!(!handle.relates_to::<Likes>(t));
    handle.unrelate::<Likes>(t);
}
