//! Player combat module
//!
//! ECS ответственность:
//! - `StateMachine<PlayerState>`: Idle / Move / Sprint / Aim / Shoot / Reload / Cover
//! - driver система (Decide): cooldown, смена оружия, тик FSM, velocity, анимация
//!
//! Состояния получают `PlayerContext` — ссылки на компоненты актора + сервисы мира
//! (физика, RNG, damageable lookup). Уведомления оружия сбрасываются в events
//! после всех акторов, в порядке действий.

use bevy::prelude::*;

pub mod context;
pub mod states;

pub use context::{CameraView, PlayerContext};
pub use states::PlayerState;

use crate::animation::AnimatorParams;
use crate::camera::{AimState, FollowCamera};
use crate::combat::{resolve_damageable, CombatEventWriters, Loadout, ShotEnv, WeaponResolver};
use crate::components::{Actor, Dead, Health, MovementSpeeds, PhysicsBody, Player};
use crate::cover::{CoverRegistry, CoverSensor};
use crate::fsm::StateMachine;
use crate::input::PlayerInput;
use crate::physics::WorldSpace;
use crate::{DeterministicRng, SimulationSet};

/// Высота глаз игрока (прицел без камеры)
pub const PLAYER_EYE_HEIGHT: f32 = 1.5;

pub const PLAYER_FACTION: u64 = 0;

/// Обязательные компоненты игрока
pub fn player_bundle(weapon: WeaponResolver) -> impl Bundle {
    (
        Player,
        Actor {
            faction_id: PLAYER_FACTION,
        },
        PlayerInput::default(),
        MovementSpeeds::default(),
        weapon,
        StateMachine::new(PlayerState::Idle),
    )
}

/// Опциональные коллабораторы (aim flag, animator, укрытия)
pub fn player_collaborators() -> impl Bundle {
    (
        AimState::default(),
        AnimatorParams::default(),
        CoverRegistry::default(),
        CoverSensor::default(),
    )
}

/// Система: тик боевого FSM игрока (Decide)
#[allow(clippy::type_complexity)]
pub fn player_combat_fsm(
    space: WorldSpace,
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    mut players: Query<
        (
            Entity,
            &mut StateMachine<PlayerState>,
            &PlayerInput,
            &mut Transform,
            &MovementSpeeds,
            &mut WeaponResolver,
            &mut PhysicsBody,
            Option<&mut Loadout>,
            Option<&mut CoverRegistry>,
            Option<&mut AnimatorParams>,
            Option<&mut AimState>,
            Has<Dead>,
        ),
        With<Player>,
    >,
    cameras: Query<(&FollowCamera, &Transform), Without<Player>>,
    damageable: Query<(), With<Health>>,
    parents: Query<&ChildOf>,
    mut writers: CombatEventWriters,
) {
    let delta = time.delta_secs();
    let resolve = |collider: Entity| resolve_damageable(collider, &damageable, &parents);
    let mut notices = Vec::new();

    space.scope(|space| {
        for (entity, mut fsm, input, transform, speeds, mut weapon, mut body, loadout, cover, animator, aim, dead) in
            players.iter_mut()
        {
            if !dead {
                weapon.tick_cooldown(delta);

                if let (Some(index), Some(mut loadout)) = (input.weapon_select, loadout) {
                    if !fsm.current().locks_weapon() && loadout.switch_to(index, &mut weapon) {
                        crate::log(&format!("🔫 {:?} switched to {}", entity, weapon.id()));
                        notices.push(weapon.ammo_notice(entity));
                    }
                }
            }

            let view = cameras
                .iter()
                .find(|(camera, _)| camera.target == entity)
                .map(|(_, camera_transform)| CameraView::from_camera(camera_transform))
                .unwrap_or_else(|| CameraView::fallback(&transform, PLAYER_EYE_HEIGHT));

            let mut ctx = PlayerContext {
                entity,
                delta,
                input,
                transform: transform.into_inner(),
                speeds,
                weapon: weapon.into_inner(),
                view,
                cover: cover.map(Mut::into_inner),
                animator: animator.map(Mut::into_inner),
                aim: aim.map(Mut::into_inner),
                shot: ShotEnv {
                    space,
                    damageable: &resolve,
                    rng: &mut rng.rng,
                },
                notices: &mut notices,
                displacement: Vec3::ZERO,
            };

            if dead {
                fsm.teardown(&mut ctx);
                body.velocity = Vec3::ZERO;
                continue;
            }

            fsm.tick(&mut ctx);
            fsm.fixed_tick(&mut ctx);

            body.velocity = if delta > 0.0 {
                ctx.displacement / delta
            } else {
                Vec3::ZERO
            };

            if let Some(animator) = ctx.animator.as_deref_mut() {
                let speed = Vec2::new(body.velocity.x, body.velocity.z).length();
                animator.drive_locomotion(speed, input.move_axis, delta);
            }
        }
    });

    writers.flush(&mut notices);
}

/// Player Plugin (Decide)
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, player_combat_fsm.in_set(SimulationSet::Decide));
    }
}
