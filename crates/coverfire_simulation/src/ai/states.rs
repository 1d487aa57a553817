//! Состояния боевого FSM врага: Idle / Patrol / Chase / Attack
//!
//! Таймеры живут внутри вариантов: выход из состояния = таймер выброшен.

use bevy::prelude::*;

use super::navigator::NavAgent;
use super::{EnemyConfig, PatrolRoute};
use crate::animation::AnimatorParams;
use crate::camera::AimState;
use crate::combat::{CombatNotice, FireRequest, ShotEnv, WeaponResolver};
use crate::components::turn_towards;
use crate::fsm::FsmState;
use crate::perception::Perception;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyState {
    Idle {
        elapsed: f32,
    },
    Patrol {
        /// Some = стоим на точке и ждём
        wait_remaining: Option<f32>,
    },
    Chase {
        /// Сколько цель не видна подряд
        lost_for: f32,
        since_path_request: f32,
    },
    Attack,
}

impl EnemyState {
    pub fn idle() -> Self {
        Self::Idle { elapsed: 0.0 }
    }

    pub fn patrol() -> Self {
        Self::Patrol { wait_remaining: None }
    }

    pub fn chase() -> Self {
        Self::Chase {
            lost_for: 0.0,
            since_path_request: 0.0,
        }
    }

    /// Начальное состояние: патруль, если есть маршрут
    pub fn initial(route: Option<&PatrolRoute>) -> Self {
        if route.is_some_and(PatrolRoute::has_waypoints) {
            Self::patrol()
        } else {
            Self::idle()
        }
    }
}

pub struct EnemyContext<'a> {
    pub entity: Entity,
    pub delta: f32,
    pub transform: &'a mut Transform,
    pub config: &'a EnemyConfig,
    pub perception: &'a Perception,
    pub eye_height: f32,
    pub route: Option<&'a mut PatrolRoute>,
    pub nav: Option<&'a mut NavAgent>,
    pub weapon: &'a mut WeaponResolver,
    pub animator: Option<&'a mut AnimatorParams>,
    pub aim: Option<&'a mut AimState>,
    pub shot: ShotEnv<'a>,
    pub notices: &'a mut Vec<CombatNotice>,
}

impl EnemyContext<'_> {
    pub fn detected(&self) -> bool {
        self.perception.result.detected
    }

    pub fn in_attack_range(&self) -> bool {
        self.detected() && self.perception.result.distance <= self.config.attack_range
    }

    pub fn has_waypoints(&self) -> bool {
        self.route.as_deref().is_some_and(PatrolRoute::has_waypoints)
    }

    /// Видим → текущая позиция цели, иначе последняя известная
    pub fn chase_destination(&self) -> Option<Vec3> {
        if self.detected() {
            self.perception.target_position
        } else {
            self.perception.result.last_known_target_position
        }
    }

    fn navigate(&mut self, destination: Vec3) {
        if let Some(nav) = self.nav.as_deref_mut() {
            nav.move_to(destination);
        }
    }

    fn stop(&mut self) {
        if let Some(nav) = self.nav.as_deref_mut() {
            nav.stop();
        }
    }

    /// Без navigator'а считаем, что дошли
    fn reached(&self) -> bool {
        self.nav.as_deref().is_none_or(NavAgent::has_reached_destination)
    }

    fn face(&mut self, point: Vec3) {
        let direction = point - self.transform.translation;
        turn_towards(self.transform, direction, self.config.turn_speed, self.delta);
    }

    fn set_aiming(&mut self, aiming: bool) {
        if let Some(aim) = self.aim.as_deref_mut() {
            aim.aiming = aiming;
        }
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.is_aiming = aiming;
        }
    }

    /// Hit-scan от глаз в грудь цели
    fn fire_at(&mut self, target: Vec3) {
        let origin = self.transform.translation + Vec3::Y * self.eye_height;
        let request = FireRequest {
            shooter: self.entity,
            origin,
            direction: target + Vec3::Y * self.config.aim_height - origin,
        };

        if self.weapon.fire(&request, &mut self.shot, self.notices).is_some() {
            self.weapon.start_cooldown_for(self.config.attack_cooldown);
            if let Some(animator) = self.animator.as_deref_mut() {
                animator.trigger_shoot();
            }
        }
    }
}

impl<'a> FsmState<EnemyContext<'a>> for EnemyState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "Idle",
            Self::Patrol { .. } => "Patrol",
            Self::Chase { .. } => "Chase",
            Self::Attack => "Attack",
        }
    }

    fn next(&self, ctx: &EnemyContext<'a>) -> Option<Self> {
        // Цели нет в мире: Chase/Attack → Idle, Idle/Patrol живут как обычно
        if !ctx.perception.target_present && matches!(self, Self::Chase { .. } | Self::Attack) {
            return Some(Self::idle());
        }

        match self {
            Self::Idle { elapsed } => {
                if ctx.in_attack_range() {
                    Some(Self::Attack)
                } else if ctx.detected() {
                    Some(Self::chase())
                } else if *elapsed >= ctx.config.idle_duration && ctx.has_waypoints() {
                    Some(Self::patrol())
                } else {
                    None
                }
            }
            Self::Patrol { .. } => ctx.detected().then(Self::chase),
            Self::Chase { lost_for, .. } => {
                if ctx.in_attack_range() {
                    Some(Self::Attack)
                } else if !ctx.detected() && *lost_for + ctx.delta >= ctx.config.chase_timeout {
                    Some(Self::idle())
                } else {
                    None
                }
            }
            Self::Attack => (!ctx.in_attack_range()).then(Self::chase),
        }
    }

    fn enter(&mut self, ctx: &mut EnemyContext<'a>) {
        match self {
            Self::Idle { elapsed } => {
                *elapsed = 0.0;
                ctx.stop();
            }
            Self::Patrol { wait_remaining } => {
                *wait_remaining = None;
                if let Some(waypoint) = ctx.route.as_deref().and_then(PatrolRoute::current) {
                    ctx.navigate(waypoint);
                }
            }
            Self::Chase {
                lost_for,
                since_path_request,
            } => {
                *lost_for = 0.0;
                *since_path_request = 0.0;
                if let Some(destination) = ctx.chase_destination() {
                    ctx.navigate(destination);
                }
            }
            Self::Attack => {
                ctx.stop();
                ctx.set_aiming(true);
            }
        }
    }

    fn exit(&mut self, ctx: &mut EnemyContext<'a>) {
        match self {
            Self::Chase { .. } => ctx.stop(),
            Self::Attack => {
                ctx.set_aiming(false);
                ctx.weapon.cancel_reload();
            }
            Self::Idle { .. } | Self::Patrol { .. } => {}
        }
    }

    fn update(&mut self, ctx: &mut EnemyContext<'a>) {
        let delta = ctx.delta;

        match self {
            Self::Idle { elapsed } => *elapsed += delta,
            Self::Patrol { wait_remaining } => {
                if let Some(remaining) = wait_remaining.as_mut() {
                    *remaining -= delta;
                    if *remaining <= 0.0 {
                        *wait_remaining = None;
                        let next = ctx.route.as_deref_mut().and_then(PatrolRoute::advance);
                        if let Some(waypoint) = next {
                            ctx.navigate(waypoint);
                        }
                    }
                } else if ctx.reached() {
                    ctx.stop();
                    *wait_remaining = Some(ctx.config.patrol_wait_time);
                }
            }
            Self::Chase {
                lost_for,
                since_path_request,
            } => {
                if ctx.detected() {
                    *lost_for = 0.0;
                } else {
                    *lost_for += delta;
                }

                // Перезапрос пути не чаще path_update_interval
                *since_path_request += delta;
                if *since_path_request >= ctx.config.path_update_interval {
                    *since_path_request = 0.0;
                    if let Some(destination) = ctx.chase_destination() {
                        ctx.navigate(destination);
                    }
                }

                if let Some(destination) = ctx.chase_destination() {
                    ctx.face(destination);
                }
            }
            Self::Attack => {
                let Some(target) = ctx.perception.target_position else {
                    return;
                };
                ctx.face(target);

                if ctx.weapon.is_reloading() {
                    ctx.weapon.advance_reload(ctx.entity, delta, ctx.notices);
                } else if !ctx.weapon.has_ammo() {
                    if ctx.weapon.begin_reload(ctx.entity, ctx.notices) {
                        if let Some(animator) = ctx.animator.as_deref_mut() {
                            animator.trigger_reload();
                        }
                    }
                } else if ctx.weapon.cooldown_ready() {
                    ctx.fire_at(target);
                }
            }
        }
    }
}
