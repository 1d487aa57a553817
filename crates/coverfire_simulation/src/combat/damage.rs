//! Damage / heal / death
//!
//! Единственный writer Health: урон и лечение приходят событиями,
//! применяются здесь в порядке поступления.
//!
//! Смерть:
//! - игрок → `Dead`, остаётся в мире
//! - враг (`DespawnOnDeath`) → `Dead` + `DespawnAfter` (grace delay)

use bevy::prelude::*;

use super::events::{DamageEvent, EntityDied, HealEvent, HealthChanged};
use crate::components::{Dead, DespawnAfter, DespawnOnDeath, Health};

/// Система: применение DamageEvent / HealEvent к Health
pub fn apply_damage(
    mut commands: Commands,
    mut damage_events: EventReader<DamageEvent>,
    mut heal_events: EventReader<HealEvent>,
    mut targets: Query<(&mut Health, Has<Dead>, Option<&DespawnOnDeath>)>,
    mut health_changed: EventWriter<HealthChanged>,
    mut entity_died: EventWriter<EntityDied>,
) {
    for event in damage_events.read() {
        let Ok((mut health, dead, despawn)) = targets.get_mut(event.target) else {
            crate::log_warning(&format!("DamageEvent: target {:?} has no Health", event.target));
            continue;
        };

        // Мёртвых не добиваем (урон за тот же тик, что и смерть)
        if dead || !health.is_alive() {
            continue;
        }

        let dealt = health.take_damage(event.amount);
        health_changed.write(HealthChanged {
            entity: event.target,
            current: health.current,
            max: health.max,
        });

        crate::log(&format!(
            "💥 {:?} → {:?}: {} damage (HP: {} → {})",
            event.source,
            event.target,
            dealt,
            health.current + dealt,
            health.current
        ));

        if health.is_alive() {
            continue;
        }

        entity_died.write(EntityDied {
            entity: event.target,
            killer: Some(event.source),
        });

        let mut entity = commands.entity(event.target);
        entity.insert(Dead);
        if let Some(despawn) = despawn {
            entity.insert(DespawnAfter {
                remaining: despawn.delay,
            });
        }

        crate::log_info(&format!("💀 {:?} killed by {:?}", event.target, event.source));
    }

    for event in heal_events.read() {
        let Ok((mut health, dead, _)) = targets.get_mut(event.target) else {
            continue;
        };
        if dead || !health.is_alive() {
            continue;
        }

        if health.heal(event.amount) > 0 {
            health_changed.write(HealthChanged {
                entity: event.target,
                current: health.current,
                max: health.max,
            });
        }
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    mut query: Query<(Entity, &mut DespawnAfter)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut timer) in query.iter_mut() {
        timer.remaining -= delta;
        if timer.remaining <= 0.0 {
            commands.entity(entity).despawn();
            crate::log(&format!("🗑️ Despawned {:?}", entity));
        }
    }
}

/// Максимальная глубина подъёма по иерархии при поиске damageable
const MAX_DAMAGEABLE_DEPTH: usize = 8;

/// Collider → damageable: сам entity с Health, иначе ближайший предок с Health
pub fn resolve_damageable(
    collider: Entity,
    damageable: &Query<(), With<Health>>,
    parents: &Query<&ChildOf>,
) -> Option<Entity> {
    let mut current = collider;
    for _ in 0..MAX_DAMAGEABLE_DEPTH {
        if damageable.contains(current) {
            return Some(current);
        }
        current = parents.get(current).ok()?.parent();
    }
    None
}
