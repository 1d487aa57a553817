//! Состояния боевого FSM игрока
//!
//! Guards проверяются в порядке колонок Idle → Move → Sprint → Aim → Shoot →
//! Reload → Cover, первый выполненный побеждает.

use super::context::PlayerContext;
use crate::fsm::FsmState;

/// Множитель скорости в Shoot (от aim) и Reload/Cover (от walk)
const SLOW_MOVE_FACTOR: f32 = 0.5;

/// Множитель скорости доворота к камере в Aim/Shoot
const AIM_TURN_FACTOR: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Move,
    Sprint,
    Aim,
    Shoot,
    Reload,
    Cover,
}

impl PlayerState {
    /// Weapon select игнорируется, пока оружие занято
    pub fn locks_weapon(&self) -> bool {
        matches!(self, Self::Shoot | Self::Reload)
    }
}

impl<'a> FsmState<PlayerContext<'a>> for PlayerState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Move => "Move",
            Self::Sprint => "Sprint",
            Self::Aim => "Aim",
            Self::Shoot => "Shoot",
            Self::Reload => "Reload",
            Self::Cover => "Cover",
        }
    }

    fn next(&self, ctx: &PlayerContext<'a>) -> Option<Self> {
        let input = ctx.input;
        let moving = input.is_moving();
        let aim = input.aim_held;

        match self {
            Self::Idle => {
                if moving && !input.sprint_held {
                    Some(Self::Move)
                } else if moving && input.sprint_held {
                    Some(Self::Sprint)
                } else if aim {
                    Some(Self::Aim)
                } else if input.cover_down && ctx.cover_available() {
                    Some(Self::Cover)
                } else {
                    None
                }
            }
            Self::Move => {
                if !moving {
                    Some(Self::Idle)
                } else if input.sprint_held {
                    Some(Self::Sprint)
                } else if aim {
                    Some(Self::Aim)
                } else if input.cover_down && ctx.cover_available() {
                    Some(Self::Cover)
                } else {
                    None
                }
            }
            Self::Sprint => {
                if !moving {
                    Some(Self::Idle)
                } else if !input.sprint_held {
                    Some(Self::Move)
                } else if aim {
                    Some(Self::Aim)
                } else {
                    None
                }
            }
            Self::Aim => {
                if !aim && !moving {
                    Some(Self::Idle)
                } else if !aim {
                    Some(Self::Move)
                } else if input.fire_pressed() && ctx.weapon.can_fire() {
                    Some(Self::Shoot)
                } else if input.reload_down && ctx.weapon.can_reload() {
                    Some(Self::Reload)
                } else {
                    None
                }
            }
            Self::Shoot => {
                let released = !input.fire_pressed();
                let has_ammo = ctx.weapon.has_ammo();

                if released && !aim && has_ammo {
                    Some(Self::Idle)
                } else if released && aim {
                    Some(Self::Aim)
                } else if !has_ammo {
                    Some(Self::Reload)
                } else {
                    None
                }
            }
            Self::Reload => {
                if ctx.weapon.is_reloading() {
                    None
                } else if aim {
                    Some(Self::Aim)
                } else {
                    Some(Self::Idle)
                }
            }
            Self::Cover => {
                if input.cover_down || !ctx.in_cover() {
                    Some(Self::Idle)
                } else if aim {
                    Some(Self::Aim)
                } else {
                    None
                }
            }
        }
    }

    fn enter(&mut self, ctx: &mut PlayerContext<'a>) {
        match self {
            Self::Aim => ctx.set_aiming(true),
            Self::Shoot => {
                ctx.set_aiming(true);
                if ctx.weapon.cooldown_ready() {
                    ctx.fire();
                }
            }
            Self::Reload => {
                if ctx.weapon.begin_reload(ctx.entity, ctx.notices) {
                    if let Some(animator) = ctx.animator.as_deref_mut() {
                        animator.trigger_reload();
                    }
                }
            }
            Self::Cover => {
                let position = ctx.transform.translation;
                let Some(cover) = ctx.cover.as_deref_mut().and_then(|c| c.take_cover(position)) else {
                    return;
                };

                ctx.transform.translation = cover.snap_position(position);
                ctx.transform.rotation = cover.facing_rotation();
                ctx.displacement += ctx.transform.translation - position;
                if let Some(animator) = ctx.animator.as_deref_mut() {
                    animator.in_cover = true;
                }
                crate::log(&format!("🧱 {:?} took cover at {:?}", ctx.entity, cover.entity));
            }
            Self::Idle | Self::Move | Self::Sprint => {}
        }
    }

    fn exit(&mut self, ctx: &mut PlayerContext<'a>) {
        match self {
            Self::Aim | Self::Shoot => ctx.set_aiming(false),
            // Прерванная перезарядка теряет прогресс, патроны не трогаем
            Self::Reload => {
                ctx.weapon.cancel_reload();
            }
            Self::Cover => {
                if let Some(cover) = ctx.cover.as_deref_mut() {
                    cover.leave_cover();
                }
                if let Some(animator) = ctx.animator.as_deref_mut() {
                    animator.in_cover = false;
                }
            }
            Self::Idle | Self::Move | Self::Sprint => {}
        }
    }

    fn update(&mut self, ctx: &mut PlayerContext<'a>) {
        let speeds = *ctx.speeds;

        match self {
            Self::Idle => {}
            Self::Move => ctx.locomote(speeds.walk),
            Self::Sprint => ctx.locomote(speeds.sprint),
            Self::Aim => ctx.strafe_facing_camera(speeds.aim, speeds.rotation_speed * AIM_TURN_FACTOR),
            Self::Shoot => {
                if ctx.input.fire_pressed() && ctx.weapon.has_ammo() && ctx.weapon.cooldown_ready() {
                    ctx.fire();
                }
                ctx.strafe_facing_camera(
                    speeds.aim * SLOW_MOVE_FACTOR,
                    speeds.rotation_speed * AIM_TURN_FACTOR,
                );
            }
            Self::Reload => {
                ctx.weapon.advance_reload(ctx.entity, ctx.delta, ctx.notices);
                ctx.locomote(speeds.walk * SLOW_MOVE_FACTOR);
            }
            Self::Cover => {
                let Some(cover) = ctx.cover.as_deref().and_then(|c| c.current()).copied() else {
                    return;
                };

                // Страф вдоль укрытия, в пределах его ширины
                let along = ctx.move_direction().dot(cover.lateral_axis());
                let position = ctx.transform.translation;
                let stepped = position + cover.lateral_axis() * along * speeds.walk * SLOW_MOVE_FACTOR * ctx.delta;
                let snapped = cover.snap_position(stepped);
                ctx.translate(snapped - position);
            }
        }
    }
}
