//! Movement компоненты: скорости локомоции, velocity, helpers поворота

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Фактическая скорость актора (смещение за последний тик / dt)
///
/// Пишется владельцем Transform (FSM driver), читается анимацией.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec3,
}

/// Скорости локомоции игрока (м/с)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct MovementSpeeds {
    pub walk: f32,
    pub sprint: f32,
    pub aim: f32,
    /// Скорость доворота к направлению движения (1/сек, множитель slerp)
    pub rotation_speed: f32,
}

impl Default for MovementSpeeds {
    fn default() -> Self {
        Self {
            walk: 4.0,
            sprint: 7.0,
            aim: 2.0,
            rotation_speed: 10.0,
        }
    }
}

/// Проекция на горизонтальную плоскость (XZ), нормализованная
pub fn flatten(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

/// Rotation (yaw-only), при которой forward (-Z) смотрит вдоль `direction`
pub fn yaw_towards(direction: Vec3) -> Option<Quat> {
    let flat = flatten(direction);
    if flat == Vec3::ZERO {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Плавный доворот по yaw к `direction` со скоростью `rate` (slerp factor rate·dt)
pub fn turn_towards(transform: &mut Transform, direction: Vec3, rate: f32, delta: f32) {
    if let Some(target) = yaw_towards(direction) {
        let t = (rate * delta).clamp(0.0, 1.0);
        transform.rotation = transform.rotation.slerp(target, t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_towards_matches_forward() {
        for direction in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::new(1.0, 3.0, 1.0)] {
            let rotation = yaw_towards(direction).unwrap();
            let forward = rotation * Vec3::NEG_Z;
            assert!(
                forward.distance(flatten(direction)) < 1e-5,
                "forward {:?} != {:?}",
                forward,
                flatten(direction)
            );
        }
    }

    #[test]
    fn test_yaw_towards_vertical_is_none() {
        assert!(yaw_towards(Vec3::Y).is_none());
        assert!(yaw_towards(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_turn_towards_full_rate_snaps() {
        let mut transform = Transform::default();
        turn_towards(&mut transform, Vec3::X, 100.0, 1.0);
        assert!((transform.forward().as_vec3() - Vec3::X).length() < 1e-5);
    }
}
