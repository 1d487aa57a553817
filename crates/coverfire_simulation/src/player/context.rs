//! PlayerContext — всё, что состояниям игрока нужно на один тик
//!
//! Собирается driver-системой из компонентов актора и сервисов мира.
//! Опциональные коллабораторы (укрытия, animator, aim flag) — `Option`:
//! их отсутствие делает соответствующую фичу инертной.

use bevy::prelude::*;

use crate::animation::AnimatorParams;
use crate::camera::AimState;
use crate::combat::{CombatNotice, FireRequest, ShotEnv, ShotOutcome, WeaponResolver};
use crate::components::{flatten, turn_towards, MovementSpeeds};
use crate::cover::CoverRegistry;
use crate::input::PlayerInput;

/// Базис камеры для camera-relative движения и точка прицеливания
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Горизонтальный forward камеры
    pub forward: Vec3,
    /// Горизонтальный right камеры
    pub right: Vec3,
    /// Куда смотреть при прицеливании (горизонталь)
    pub look: Vec3,
    pub aim_origin: Vec3,
    pub aim_direction: Vec3,
}

impl CameraView {
    /// Из Transform камеры (если камера смотрит строго вертикально — мировые оси)
    pub fn from_camera(camera: &Transform) -> Self {
        let forward = flatten(camera.forward().as_vec3());
        let right = flatten(camera.right().as_vec3());
        let (forward, right) = if forward == Vec3::ZERO || right == Vec3::ZERO {
            (Vec3::NEG_Z, Vec3::X)
        } else {
            (forward, right)
        };

        Self {
            forward,
            right,
            look: forward,
            aim_origin: camera.translation,
            aim_direction: camera.forward().as_vec3(),
        }
    }

    /// Без камеры: движение по мировым осям, прицел от глаз вдоль forward актора
    pub fn fallback(actor: &Transform, eye_height: f32) -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            look: flatten(actor.forward().as_vec3()),
            aim_origin: actor.translation + Vec3::Y * eye_height,
            aim_direction: actor.forward().as_vec3(),
        }
    }
}

pub struct PlayerContext<'a> {
    pub entity: Entity,
    pub delta: f32,
    pub input: &'a PlayerInput,
    pub transform: &'a mut Transform,
    pub speeds: &'a MovementSpeeds,
    pub weapon: &'a mut WeaponResolver,
    pub view: CameraView,
    pub cover: Option<&'a mut CoverRegistry>,
    pub animator: Option<&'a mut AnimatorParams>,
    pub aim: Option<&'a mut AimState>,
    pub shot: ShotEnv<'a>,
    pub notices: &'a mut Vec<CombatNotice>,
    /// Смещение за тик (для velocity)
    pub displacement: Vec3,
}

impl PlayerContext<'_> {
    /// Camera-relative направление ввода (длина ≤ 1)
    pub fn move_direction(&self) -> Vec3 {
        let axis = self.input.move_axis;
        let direction = self.view.right * axis.x + self.view.forward * axis.y;
        if direction.length_squared() > 1.0 {
            direction.normalize()
        } else {
            direction
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.transform.translation += offset;
        self.displacement += offset;
    }

    /// Движение со скоростью `speed`, доворот по направлению движения
    pub fn locomote(&mut self, speed: f32) {
        let direction = self.move_direction();
        if direction == Vec3::ZERO {
            return;
        }
        self.translate(direction * speed * self.delta);
        turn_towards(self.transform, direction, self.speeds.rotation_speed, self.delta);
    }

    /// Движение без смены ориентации, лицом к камере
    pub fn strafe_facing_camera(&mut self, speed: f32, turn_rate: f32) {
        let direction = self.move_direction();
        if direction != Vec3::ZERO {
            self.translate(direction * speed * self.delta);
        }
        turn_towards(self.transform, self.view.look, turn_rate, self.delta);
    }

    pub fn set_aiming(&mut self, aiming: bool) {
        if let Some(aim) = self.aim.as_deref_mut() {
            aim.aiming = aiming;
        }
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.is_aiming = aiming;
        }
    }

    pub fn cover_available(&self) -> bool {
        self.cover.as_deref().is_some_and(CoverRegistry::has_candidates)
    }

    pub fn in_cover(&self) -> bool {
        self.cover.as_deref().is_some_and(|c| c.current().is_some())
    }

    /// Один выстрел из камеры/глаз. Cooldown взводится здесь же.
    pub fn fire(&mut self) -> Option<ShotOutcome> {
        let request = FireRequest {
            shooter: self.entity,
            origin: self.view.aim_origin,
            direction: self.view.aim_direction,
        };

        let outcome = self.weapon.fire(&request, &mut self.shot, self.notices)?;
        self.weapon.start_cooldown();
        if let Some(animator) = self.animator.as_deref_mut() {
            animator.trigger_shoot();
        }
        Some(outcome)
    }
}
