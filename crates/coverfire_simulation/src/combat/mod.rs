//! Combat system module (hit-scan)
//!
//! ECS ответственность:
//! - WeaponResolver: патроны, cooldown, перезарядка, hit-scan
//! - Damage: единственный writer Health, смерть, деспавн
//! - Events: DamageEvent, AmmoChanged, WeaponFired, Reload*, HealthChanged, EntityDied
//!
//! Выстрелы инициируют FSM игрока/врагов (Decide), урон применяется в Resolve.

use bevy::prelude::*;

pub mod damage;
pub mod events;
pub mod weapon;
pub mod weapon_stats;

pub use damage::{apply_damage, despawn_after_timeout, resolve_damageable};
pub use events::{
    AmmoChanged, CombatEventWriters, CombatNotice, DamageEvent, EntityDied, HealEvent, HealthChanged,
    ReloadCompleted, ReloadStarted, WeaponFired,
};
pub use weapon::{
    spread_direction, FireRequest, Loadout, ShotEnv, ShotOutcome, WeaponResolver, WeaponState, MAX_SPREAD_DEGREES,
};
pub use weapon_stats::{CatalogError, WeaponCatalog, WeaponId, WeaponStats};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (FixedUpdate, Resolve):
/// 1. apply_damage — DamageEvent/HealEvent → Health, смерть
/// 2. despawn_after_timeout — удаление трупов врагов
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageEvent>()
            .add_event::<HealEvent>()
            .add_event::<AmmoChanged>()
            .add_event::<WeaponFired>()
            .add_event::<ReloadStarted>()
            .add_event::<ReloadCompleted>()
            .add_event::<HealthChanged>()
            .add_event::<EntityDied>();

        if !app.world().contains_resource::<WeaponCatalog>() {
            app.insert_resource(WeaponCatalog::builtin());
        }

        app.add_systems(
            FixedUpdate,
            (damage::apply_damage, damage::despawn_after_timeout)
                .chain()
                .in_set(SimulationSet::Resolve),
        );
    }
}

#[cfg(test)]
mod damage_tests;
#[cfg(test)]
mod weapon_tests;
