//! SpatialQuery — единый интерфейс физических запросов симуляции
//!
//! Потребители: hit-scan оружия (cast_ray), line-of-sight восприятия
//! (segment_blocked), коллизия камеры (cast_sphere).

use bevy::prelude::*;

/// Попадание луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Entity коллайдера (None для безымянной статики)
    pub entity: Option<Entity>,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

pub trait SpatialQuery {
    /// Ближайшее попадание луча по акторам и статике. `direction` нормализован.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RayHit>;

    /// Перекрыт ли отрезок статической геометрией (акторы не блокируют)
    fn segment_blocked(&self, from: Vec3, to: Vec3) -> bool;

    /// Sphere-cast по статике: дистанция центра сферы до первого контакта
    fn cast_sphere(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<f32>;
}

/// Пустой мир: ничего не блокирует, ни во что не попадаем
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySpace;

impl SpatialQuery for EmptySpace {
    fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: Option<Entity>) -> Option<RayHit> {
        None
    }

    fn segment_blocked(&self, _: Vec3, _: Vec3) -> bool {
        false
    }

    fn cast_sphere(&self, _: Vec3, _: f32, _: Vec3, _: f32) -> Option<f32> {
        None
    }
}
