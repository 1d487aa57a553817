//! FollowCamera — третье лицо с уходом от препятствий
//!
//! Единственный gameplay вход: `AimState` цели (флаг прицеливания).
//! Остальное — input (look delta, смена плеча) и геометрия мира (sphere-cast).
//! Камера ничего не решает за геймплей; без камеры игрок целится от глаз.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::input::PlayerInput;
use crate::physics::{SpatialQuery, WorldSpace};
use crate::SimulationSet;

/// Флаг прицеливания, публикуемый FSM (Aim / Shoot)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AimState {
    pub aiming: bool,
}

/// Настройки rig'а камеры
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct CameraRig {
    /// (lateral, vertical, back) относительно pivot
    pub normal_offset: Vec3,
    pub normal_height: f32,
    pub normal_fov: f32,
    pub aim_offset: Vec3,
    pub aim_height: f32,
    pub aim_fov: f32,
    /// Постоянные времени сглаживания offset/height (секунды)
    pub normal_smooth_time: f32,
    pub aim_smooth_time: f32,
    /// Скорость сглаживания FOV (1/сек)
    pub fov_smooth_speed: f32,
    pub collision_radius: f32,
    pub min_distance: f32,
    /// Релаксация дистанции после ухода препятствия (секунды)
    pub distance_recover_time: f32,
    pub shoulder_switch_speed: f32,
    /// Градусы
    pub pitch_min: f32,
    pub pitch_max: f32,
    /// Градусы на единицу look delta
    pub look_sensitivity: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            normal_offset: Vec3::new(0.5, 0.3, 1.8),
            normal_height: 1.5,
            normal_fov: 60.0,
            aim_offset: Vec3::new(0.6, 0.2, 1.0),
            aim_height: 1.4,
            aim_fov: 45.0,
            normal_smooth_time: 0.1,
            aim_smooth_time: 0.05,
            fov_smooth_speed: 10.0,
            collision_radius: 0.2,
            min_distance: 0.2,
            distance_recover_time: 0.1,
            shoulder_switch_speed: 8.0,
            pitch_min: -40.0,
            pitch_max: 70.0,
            look_sensitivity: 3.0,
        }
    }
}

/// Поле зрения для рендера (градусы)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CameraLens {
    pub fov: f32,
}

impl Default for CameraLens {
    fn default() -> Self {
        Self { fov: 60.0 }
    }
}

/// Входы камеры за один тик
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    pub look: Vec2,
    pub shoulder_switch: bool,
    pub aiming: bool,
}

/// Runtime состояние follow-камеры
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform, CameraRig, CameraLens)]
pub struct FollowCamera {
    pub target: Entity,
    /// Градусы
    pub yaw: f32,
    pub pitch: f32,
    /// ±1: целевое плечо
    pub shoulder_side: f32,
    /// Текущее (сглаженное) плечо
    pub shoulder_blend: f32,
    pub offset: Vec3,
    pub height: f32,
    pub fov: f32,
    /// Текущая дистанция от pivot
    pub distance: f32,
}

impl FollowCamera {
    pub fn new(target: Entity, rig: &CameraRig) -> Self {
        Self {
            target,
            yaw: 0.0,
            pitch: 0.0,
            shoulder_side: 1.0,
            shoulder_blend: 1.0,
            offset: rig.normal_offset,
            height: rig.normal_height,
            fov: rig.normal_fov,
            distance: rig.normal_offset.length(),
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), -self.pitch.to_radians(), 0.0)
    }

    pub fn pivot(&self, target_position: Vec3) -> Vec3 {
        target_position + Vec3::Y * self.height
    }

    /// Один тик камеры. Возвращает итоговый Transform.
    pub fn step(
        &mut self,
        rig: &CameraRig,
        target_position: Vec3,
        input: CameraInput,
        space: &dyn SpatialQuery,
        delta: f32,
    ) -> Transform {
        // Look
        self.yaw -= input.look.x * rig.look_sensitivity;
        self.pitch = (self.pitch - input.look.y * rig.look_sensitivity).clamp(rig.pitch_min, rig.pitch_max);

        // Плечо: знак блендится, не переключается мгновенно
        if input.shoulder_switch {
            self.shoulder_side = -self.shoulder_side;
        }
        let shoulder_t = (rig.shoulder_switch_speed * delta).clamp(0.0, 1.0);
        self.shoulder_blend += (self.shoulder_side - self.shoulder_blend) * shoulder_t;

        // Aim профиль
        let (desired_offset, desired_height, desired_fov, smooth_time) = if input.aiming {
            (rig.aim_offset, rig.aim_height, rig.aim_fov, rig.aim_smooth_time)
        } else {
            (rig.normal_offset, rig.normal_height, rig.normal_fov, rig.normal_smooth_time)
        };
        let t = exp_smoothing(delta, smooth_time);
        self.offset = self.offset.lerp(desired_offset, t);
        self.height += (desired_height - self.height) * t;
        self.fov += (desired_fov - self.fov) * (rig.fov_smooth_speed * delta).clamp(0.0, 1.0);

        let rotation = self.rotation();
        let pivot = self.pivot(target_position);
        let local = Vec3::new(self.offset.x * self.shoulder_blend, self.offset.y, self.offset.z);
        let desired_distance = local.length();
        let direction = (rotation * local).normalize_or_zero();

        // Occlusion
        match space.cast_sphere(pivot, rig.collision_radius, direction, desired_distance) {
            Some(time_of_impact) if direction != Vec3::ZERO => {
                self.distance = (time_of_impact - rig.collision_radius).max(rig.min_distance);
            }
            _ => {
                let recover = exp_smoothing(delta, rig.distance_recover_time);
                self.distance += (desired_distance - self.distance) * recover;
            }
        }
        self.distance = self.distance.min(desired_distance.max(rig.min_distance));

        Transform {
            translation: pivot + direction * self.distance,
            rotation,
            ..default()
        }
    }
}

fn exp_smoothing(delta: f32, time_constant: f32) -> f32 {
    if time_constant <= 0.0 {
        return 1.0;
    }
    1.0 - (-delta / time_constant).exp()
}

/// Система: follow камеры за целью (Camera set, после FSM)
pub fn update_follow_camera(
    space: WorldSpace,
    time: Res<Time<Fixed>>,
    mut cameras: Query<(&mut FollowCamera, &CameraRig, &mut Transform, Option<&mut CameraLens>)>,
    targets: Query<(&Transform, Option<&AimState>, Option<&PlayerInput>), Without<FollowCamera>>,
) {
    let delta = time.delta_secs();

    space.scope(|space| {
        for (mut camera, rig, mut transform, lens) in cameras.iter_mut() {
            // Цель пропала — камера замирает
            let Ok((target, aim, input)) = targets.get(camera.target) else {
                continue;
            };

            let camera_input = CameraInput {
                look: input.map(|i| i.look).unwrap_or_default(),
                shoulder_switch: input.is_some_and(|i| i.shoulder_switch_down),
                aiming: aim.is_some_and(|a| a.aiming),
            };

            *transform = camera.step(rig, target.translation, camera_input, space, delta);

            if let Some(mut lens) = lens {
                lens.fov = camera.fov;
            }
        }
    });
}

/// Camera Plugin
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, update_follow_camera.in_set(SimulationSet::Camera));
    }
}
