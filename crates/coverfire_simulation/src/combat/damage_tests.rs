//! Tests for damage / heal / death systems.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;

use super::damage::apply_damage;
use super::events::{DamageEvent, EntityDied, HealEvent, HealthChanged};
use crate::components::{Dead, DespawnAfter, DespawnOnDeath, Health};

fn damage_world() -> World {
    let mut world = World::new();
    world.init_resource::<Events<DamageEvent>>();
    world.init_resource::<Events<HealEvent>>();
    world.init_resource::<Events<HealthChanged>>();
    world.init_resource::<Events<EntityDied>>();
    world
}

fn hit(source: Entity, target: Entity, amount: u32) -> DamageEvent {
    DamageEvent {
        source,
        target,
        amount,
        impact_point: Vec3::ZERO,
        impact_normal: Vec3::Z,
    }
}

fn drain<E: Event + Clone>(world: &World) -> Vec<E> {
    let events = world.resource::<Events<E>>();
    events.get_cursor().read(events).cloned().collect()
}

#[test]
fn test_damage_reduces_health_and_notifies() {
    let mut world = damage_world();
    let shooter = world.spawn(Health::new(100)).id();
    let target = world.spawn(Health::new(100)).id();

    world.send_event(hit(shooter, target, 25));
    world.run_system_once(apply_damage).unwrap();

    assert_eq!(world.get::<Health>(target).unwrap().current, 75);
    let changed = drain::<HealthChanged>(&world);
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].current, 75);
    assert!(drain::<EntityDied>(&world).is_empty());
}

#[test]
fn test_player_death_flags_without_despawn() {
    let mut world = damage_world();
    let shooter = world.spawn(Health::new(100)).id();
    let player = world.spawn(Health::new(20)).id();

    world.send_event(hit(shooter, player, 25));
    world.send_event(hit(shooter, player, 25)); // тот же тик — уже мёртв
    world.run_system_once(apply_damage).unwrap();

    assert_eq!(world.get::<Health>(player).unwrap().current, 0);
    assert!(world.get::<Dead>(player).is_some());
    assert!(world.get::<DespawnAfter>(player).is_none());

    let died = drain::<EntityDied>(&world);
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].killer, Some(shooter));
    assert_eq!(drain::<HealthChanged>(&world).len(), 1);
}

#[test]
fn test_enemy_death_schedules_despawn() {
    let mut world = damage_world();
    let shooter = world.spawn(Health::new(100)).id();
    let enemy = world.spawn((Health::new(10), DespawnOnDeath::default())).id();

    world.send_event(hit(shooter, enemy, 10));
    world.run_system_once(apply_damage).unwrap();

    assert!(world.get::<Dead>(enemy).is_some());
    assert_eq!(world.get::<DespawnAfter>(enemy).unwrap().remaining, 2.0);
}

#[test]
fn test_heal_clamped_and_ignored_for_dead() {
    let mut world = damage_world();
    let medic = world.spawn(Health::new(100)).id();
    let patient = world.spawn(Health { current: 90, max: 100 }).id();
    let corpse = world.spawn((Health { current: 0, max: 100 }, Dead)).id();

    world.send_event(HealEvent { target: patient, amount: 50 });
    world.send_event(HealEvent { target: corpse, amount: 50 });
    world.send_event(hit(medic, corpse, 5));
    world.run_system_once(apply_damage).unwrap();

    assert_eq!(world.get::<Health>(patient).unwrap().current, 100);
    assert_eq!(world.get::<Health>(corpse).unwrap().current, 0);
    assert_eq!(drain::<HealthChanged>(&world).len(), 1);
}

#[test]
fn test_damage_to_entity_without_health_is_ignored() {
    let mut world = damage_world();
    let shooter = world.spawn(Health::new(100)).id();
    let prop = world.spawn_empty().id();

    world.send_event(hit(shooter, prop, 25));
    world.run_system_once(apply_damage).unwrap();

    assert!(drain::<HealthChanged>(&world).is_empty());
}

#[test]
fn test_resolve_damageable_walks_to_parent() {
    use super::damage::resolve_damageable;

    let mut world = World::new();
    let body = world.spawn(Health::new(100)).id();
    let head = world.spawn(ChildOf(body)).id();
    let prop = world.spawn_empty().id();

    let resolved = world
        .run_system_once(move |health: Query<(), With<Health>>, parents: Query<&ChildOf>| {
            (
                resolve_damageable(body, &health, &parents),
                resolve_damageable(head, &health, &parents),
                resolve_damageable(prop, &health, &parents),
            )
        })
        .unwrap();

    assert_eq!(resolved, (Some(body), Some(body), None));
}
