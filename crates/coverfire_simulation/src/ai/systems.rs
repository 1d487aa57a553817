//! AI driver system: собирает `EnemyContext`, тикает FSM, двигает navigator.

use bevy::prelude::*;

use super::navigator::NavAgent;
use super::states::{EnemyContext, EnemyState};
use super::{EnemyConfig, PatrolRoute};
use crate::animation::AnimatorParams;
use crate::camera::AimState;
use crate::combat::{resolve_damageable, CombatEventWriters, ShotEnv, WeaponResolver};
use crate::components::{turn_towards, Dead, Health, PhysicsBody};
use crate::fsm::StateMachine;
use crate::perception::{Perception, PerceptionConfig};
use crate::physics::WorldSpace;
use crate::DeterministicRng;

/// Система: тик боевого FSM врагов (Decide, после perception)
///
/// Порядок на актора:
/// 1. cooldown оружия
/// 2. FSM tick (guards → transition → update)
/// 3. navigator step → Transform, velocity, анимация
#[allow(clippy::type_complexity)]
pub fn enemy_combat_fsm(
    space: WorldSpace,
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    mut enemies: Query<(
        Entity,
        &mut StateMachine<EnemyState>,
        &mut Transform,
        &EnemyConfig,
        &Perception,
        &PerceptionConfig,
        &mut WeaponResolver,
        &mut PhysicsBody,
        Option<&mut PatrolRoute>,
        Option<&mut NavAgent>,
        Option<&mut AnimatorParams>,
        Option<&mut AimState>,
        Has<Dead>,
    )>,
    damageable: Query<(), With<Health>>,
    parents: Query<&ChildOf>,
    mut writers: CombatEventWriters,
) {
    let delta = time.delta_secs();
    let resolve = |collider: Entity| resolve_damageable(collider, &damageable, &parents);
    let mut notices = Vec::new();

    space.scope(|space| {
        for (entity, mut fsm, transform, config, perception, sensing, mut weapon, mut body, route, nav, animator, aim, dead) in
            enemies.iter_mut()
        {
            if !dead {
                weapon.tick_cooldown(delta);
            }

            let mut ctx = EnemyContext {
                entity,
                delta,
                transform: transform.into_inner(),
                config,
                perception,
                eye_height: sensing.eye_height,
                route: route.map(Mut::into_inner),
                nav: nav.map(Mut::into_inner),
                weapon: weapon.into_inner(),
                animator: animator.map(Mut::into_inner),
                aim: aim.map(Mut::into_inner),
                shot: ShotEnv {
                    space,
                    damageable: &resolve,
                    rng: &mut rng.rng,
                },
                notices: &mut notices,
            };

            if dead {
                fsm.teardown(&mut ctx);
                body.velocity = Vec3::ZERO;
                continue;
            }

            fsm.tick(&mut ctx);

            // Navigator двигает актора; без него AI стоит на месте
            let before = ctx.transform.translation;
            if let Some(nav) = ctx.nav.as_deref_mut() {
                ctx.transform.translation = nav.step(before, delta);
            }
            let displacement = ctx.transform.translation - before;

            if matches!(fsm.current(), EnemyState::Patrol { .. }) {
                turn_towards(ctx.transform, displacement, config.turn_speed, delta);
            }

            body.velocity = if delta > 0.0 {
                displacement / delta
            } else {
                Vec3::ZERO
            };

            if let Some(animator) = ctx.animator.as_deref_mut() {
                let local = ctx.transform.rotation.inverse() * body.velocity;
                let input = Vec2::new(local.x, -local.z).normalize_or_zero();
                let speed = Vec2::new(body.velocity.x, body.velocity.z).length();
                animator.drive_locomotion(speed, input, delta);
            }
        }
    });

    writers.flush(&mut notices);
}
