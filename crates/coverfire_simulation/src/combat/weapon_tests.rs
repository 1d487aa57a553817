//! Tests for WeaponResolver (fire, reload, cooldown, loadout).

use bevy::prelude::*;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::events::CombatNotice;
use super::weapon::*;
use super::weapon_stats::{CatalogError, WeaponCatalog, WeaponId, WeaponStats};
use crate::physics::{EmptySpace, ObstacleField, ObstacleShape};

fn perfect_rifle() -> WeaponResolver {
    let mut stats = WeaponStats::assault_rifle();
    stats.accuracy = 1.0;
    WeaponResolver::new(WeaponId::new("rifle"), stats)
}

fn shooter() -> Entity {
    Entity::from_raw(1)
}

fn target() -> Entity {
    Entity::from_raw(2)
}

/// Цель в 10м по -Z
fn range_with_target() -> ObstacleField {
    let mut field = ObstacleField::new();
    field.set_hurtboxes([(target(), ObstacleShape::cuboid(Vec3::new(0.0, 1.0, -10.0), Vec3::splat(0.5)))]);
    field
}

fn request() -> FireRequest {
    FireRequest {
        shooter: shooter(),
        origin: Vec3::new(0.0, 1.0, 0.0),
        direction: Vec3::NEG_Z,
    }
}

#[test]
fn test_fire_hits_and_emits_in_order() {
    let mut weapon = perfect_rifle();
    let field = range_with_target();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut env = ShotEnv {
        space: &field,
        damageable: &|e| Some(e),
        rng: &mut rng,
    };
    let mut notices = Vec::new();

    let outcome = weapon.fire(&request(), &mut env, &mut notices).unwrap();

    assert_eq!(outcome.target, Some(target()));
    assert_eq!(weapon.current_ammo(), 29);
    assert_eq!(notices.len(), 3);
    assert!(matches!(notices[0], CombatNotice::Fired(_)));
    assert!(matches!(
        &notices[1],
        CombatNotice::Damage(d) if d.target == target() && d.amount == 25 && d.source == shooter()
    ));
    assert!(matches!(&notices[2], CombatNotice::Ammo(a) if a.current == 29 && a.max == 30));
}

#[test]
fn test_miss_still_spends_ammo_and_notifies() {
    let mut weapon = perfect_rifle();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut env = ShotEnv {
        space: &EmptySpace,
        damageable: &|e| Some(e),
        rng: &mut rng,
    };
    let mut notices = Vec::new();

    let outcome = weapon.fire(&request(), &mut env, &mut notices).unwrap();

    assert_eq!(outcome.hit, None);
    assert_eq!(outcome.target, None);
    assert_eq!(weapon.current_ammo(), 29);
    assert!(notices.iter().all(|n| !matches!(n, CombatNotice::Damage(_))));
    assert!(notices.iter().any(|n| matches!(n, CombatNotice::Ammo(_))));
}

#[test]
fn test_hit_on_non_damageable_is_a_miss() {
    let mut weapon = perfect_rifle();
    let field = range_with_target();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut env = ShotEnv {
        space: &field,
        damageable: &|_| None,
        rng: &mut rng,
    };
    let mut notices = Vec::new();

    let outcome = weapon.fire(&request(), &mut env, &mut notices).unwrap();

    assert!(outcome.hit.is_some());
    assert_eq!(outcome.target, None);
}

#[test]
fn test_cannot_fire_empty_or_reloading() {
    let mut weapon = perfect_rifle().with_ammo(0, Some(10));
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut env = ShotEnv {
        space: &EmptySpace,
        damageable: &|e| Some(e),
        rng: &mut rng,
    };
    let mut notices = Vec::new();

    assert!(!weapon.can_fire());
    assert!(weapon.fire(&request(), &mut env, &mut notices).is_none());
    assert!(notices.is_empty());

    assert!(weapon.begin_reload(shooter(), &mut notices));
    assert!(weapon.is_reloading());
    assert!(!weapon.can_fire());
    assert!(!weapon.can_reload());
}

#[test]
fn test_reload_bounded_by_spare() {
    let mut weapon = perfect_rifle().with_ammo(25, Some(3));
    let mut notices = Vec::new();

    let loaded = weapon.reload(shooter(), &mut notices);

    assert_eq!(loaded, 3);
    assert_eq!(weapon.current_ammo(), 28);
    assert_eq!(weapon.spare_ammo(), Some(0));
    assert!(!weapon.can_reload());
}

#[test]
fn test_reload_infinite_spare_fills_magazine() {
    let mut weapon = perfect_rifle().with_ammo(4, None);
    let mut notices = Vec::new();

    assert_eq!(weapon.reload(shooter(), &mut notices), 26);
    assert_eq!(weapon.current_ammo(), 30);
    assert_eq!(weapon.spare_ammo(), None);
}

#[test]
fn test_timed_reload_commits_once_at_duration() {
    let mut weapon = perfect_rifle().with_ammo(0, Some(90));
    let mut notices = Vec::new();
    let dt = 1.0 / 64.0;

    assert!(weapon.begin_reload(shooter(), &mut notices));

    // 2.0с = 128 тиков по 1/64
    for _ in 0..127 {
        assert!(!weapon.advance_reload(shooter(), dt, &mut notices));
        assert_eq!(weapon.current_ammo(), 0);
    }
    assert!(weapon.advance_reload(shooter(), dt, &mut notices));

    assert_eq!(weapon.current_ammo(), 30);
    assert_eq!(weapon.spare_ammo(), Some(60));
    assert!(!weapon.is_reloading());
    assert!(!weapon.advance_reload(shooter(), dt, &mut notices));
}

#[test]
fn test_cancel_reload_discards_progress() {
    let mut weapon = perfect_rifle().with_ammo(5, Some(90));
    let mut notices = Vec::new();

    weapon.begin_reload(shooter(), &mut notices);
    weapon.advance_reload(shooter(), 1.5, &mut notices);
    assert!(weapon.cancel_reload());

    assert_eq!(weapon.current_ammo(), 5);
    assert_eq!(weapon.spare_ammo(), Some(90));
    assert_eq!(weapon.state().reload_elapsed, 0.0);
    assert!(!weapon.cancel_reload());
}

#[test]
fn test_cooldown_is_owner_driven() {
    let mut weapon = perfect_rifle();
    assert!(weapon.cooldown_ready());

    weapon.start_cooldown();
    assert_eq!(weapon.state().fire_cooldown_remaining, 0.1);
    weapon.tick_cooldown(0.05);
    assert!(!weapon.cooldown_ready());
    weapon.tick_cooldown(0.06);
    assert!(weapon.cooldown_ready());
    assert_eq!(weapon.state().fire_cooldown_remaining, 0.0);
}

#[test]
fn test_cooldown_spacing_never_shorter_than_fire_rate() {
    let dt = 1.0 / 64.0;
    let mut weapon = perfect_rifle();
    let mut shots = Vec::new();

    // Остаток не переносится: 0.1с при 64Гц = каждый 7-й тик
    for tick in 0..64 {
        weapon.tick_cooldown(dt);
        if weapon.cooldown_ready() {
            weapon.start_cooldown();
            shots.push(tick);
        }
    }

    assert_eq!(shots.len(), 10);
    for pair in shots.windows(2) {
        assert_eq!(pair[1] - pair[0], 7);
        assert!((pair[1] - pair[0]) as f32 * dt >= weapon.stats().fire_rate);
    }
}

#[test]
fn test_spread_is_seeded_and_bounded() {
    let direction = Vec3::NEG_Z;
    let max = (0.5 * MAX_SPREAD_DEGREES).to_radians();

    let mut a = ChaCha8Rng::seed_from_u64(99);
    let mut b = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..50 {
        let da = spread_direction(direction, 0.5, &mut a);
        let db = spread_direction(direction, 0.5, &mut b);
        assert_eq!(da, db);
        assert!(da.angle_between(direction) <= max + 1e-4);
    }

    // Идеальная точность не трогает направление
    assert_eq!(spread_direction(direction, 1.0, &mut a), direction);
}

#[test]
fn test_loadout_switch_preserves_ammo() {
    let catalog = WeaponCatalog::builtin();
    let (mut active, mut loadout) =
        Loadout::from_catalog(&catalog, &[WeaponId::new("rifle"), WeaponId::new("pistol")]).unwrap();
    let mut notices = Vec::new();

    assert_eq!(active.id(), &WeaponId::new("rifle"));
    active = active.with_ammo(7, Some(90));
    active.begin_reload(shooter(), &mut notices);

    assert!(loadout.switch_to(1, &mut active));
    assert_eq!(active.id(), &WeaponId::new("pistol"));
    assert_eq!(active.current_ammo(), 12);
    assert_eq!(loadout.active(), 1);

    // Повторный выбор того же слота / несуществующего — no-op
    assert!(!loadout.switch_to(1, &mut active));
    assert!(!loadout.switch_to(5, &mut active));

    assert!(loadout.switch_to(0, &mut active));
    assert_eq!(active.id(), &WeaponId::new("rifle"));
    assert_eq!(active.current_ammo(), 7);
    assert!(!active.is_reloading());
}

#[test]
fn test_loadout_rejects_empty_and_unknown_ids() {
    let catalog = WeaponCatalog::builtin();

    assert!(matches!(Loadout::from_catalog(&catalog, &[]), Err(CatalogError::EmptyLoadout)));
    assert!(matches!(
        Loadout::from_catalog(&catalog, &[WeaponId::new("rifle"), WeaponId::new("bfg")]),
        Err(CatalogError::Unknown(id)) if id == WeaponId::new("bfg")
    ));
}
