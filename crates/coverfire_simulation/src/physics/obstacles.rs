//! ObstacleField — headless backend для SpatialQuery
//!
//! Без Rapier world: статика (сферы/боксы) задаётся явно,
//! hurtbox'ы акторов синхронизируются из ECS каждый тик.
//! Используется в headless симуляции и тестах.

use bevy::prelude::*;

use super::spatial::{RayHit, SpatialQuery};
use crate::components::Dead;

/// Примитив препятствия
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleShape {
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box
    Cuboid { min: Vec3, max: Vec3 },
}

impl ObstacleShape {
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::Cuboid {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Minkowski-расширение на `radius` (для sphere-cast; углы бокса аппроксимируются)
    pub fn inflated(&self, radius: f32) -> Self {
        match *self {
            Self::Sphere { center, radius: r } => Self::Sphere {
                center,
                radius: r + radius,
            },
            Self::Cuboid { min, max } => Self::Cuboid {
                min: min - Vec3::splat(radius),
                max: max + Vec3::splat(radius),
            },
        }
    }

    /// Пересечение луча: (distance, normal). `direction` нормализован.
    pub fn ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
        match *self {
            Self::Sphere { center, radius } => ray_sphere(origin, direction, center, radius, max_distance),
            Self::Cuboid { min, max } => ray_aabb(origin, direction, min, max, max_distance),
        }
    }
}

fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32, max_distance: f32) -> Option<(f32, Vec3)> {
    let m = origin - center;
    let b = m.dot(direction);
    let c = m.length_squared() - radius * radius;

    // Снаружи и смотрим от сферы
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let distance = (-b - discriminant.sqrt()).max(0.0);
    if distance > max_distance {
        return None;
    }

    let point = origin + direction * distance;
    let normal = (point - center).normalize_or_zero();
    Some((distance, if normal == Vec3::ZERO { -direction } else { normal }))
}

// Slab method; origin внутри бокса → попадание на дистанции 0
fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
    let mut t_enter = 0.0_f32;
    let mut t_exit = max_distance;
    let mut normal = -direction;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];

        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        let mut sign = -1.0;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            sign = 1.0;
        }

        if t0 > t_enter {
            t_enter = t0;
            normal = Vec3::ZERO;
            normal[axis] = sign;
        }
        t_exit = t_exit.min(t1);

        if t_enter > t_exit {
            return None;
        }
    }

    Some((t_enter, normal))
}

/// Статическое препятствие
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub entity: Option<Entity>,
    pub shape: ObstacleShape,
}

/// Hurtbox актора (AABB относительно позиции)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub half_extents: Vec3,
    pub center_offset: Vec3,
}

impl Default for Hurtbox {
    fn default() -> Self {
        // Капсула ~1.8м аппроксимируется боксом 0.8 × 1.8 × 0.8
        Self {
            half_extents: Vec3::new(0.4, 0.9, 0.4),
            center_offset: Vec3::new(0.0, 0.9, 0.0),
        }
    }
}

impl Hurtbox {
    pub fn shape_at(&self, position: Vec3) -> ObstacleShape {
        ObstacleShape::cuboid(position + self.center_offset, self.half_extents)
    }
}

/// Headless физический мир
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleField {
    statics: Vec<Obstacle>,
    hurtboxes: Vec<(Entity, ObstacleShape)>,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_static(&mut self, entity: Option<Entity>, shape: ObstacleShape) {
        self.statics.push(Obstacle { entity, shape });
    }

    /// Builder: стена-бокс
    pub fn with_wall(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.add_static(None, ObstacleShape::cuboid(center, half_extents));
        self
    }

    pub fn statics(&self) -> &[Obstacle] {
        &self.statics
    }

    pub fn hurtbox_count(&self) -> usize {
        self.hurtboxes.len()
    }

    pub fn set_hurtboxes(&mut self, hurtboxes: impl IntoIterator<Item = (Entity, ObstacleShape)>) {
        self.hurtboxes.clear();
        self.hurtboxes.extend(hurtboxes);
    }
}

impl SpatialQuery for ObstacleField {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RayHit> {
        let statics = self.statics.iter().map(|o| (o.entity, o.shape));
        let actors = self.hurtboxes.iter().map(|(e, shape)| (Some(*e), *shape));

        statics
            .chain(actors)
            .filter(|(entity, _)| exclude.is_none() || *entity != exclude)
            .filter_map(|(entity, shape)| {
                shape.ray(origin, direction, max_distance).map(|(distance, normal)| RayHit {
                    entity,
                    point: origin + direction * distance,
                    normal,
                    distance,
                })
            })
            // Первый из равных побеждает (детерминизм)
            .fold(None, |best: Option<RayHit>, hit| match best {
                Some(b) if b.distance <= hit.distance => Some(b),
                _ => Some(hit),
            })
    }

    fn segment_blocked(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let length = delta.length();
        if length < 1e-6 {
            return false;
        }
        let direction = delta / length;

        self.statics
            .iter()
            .any(|o| o.shape.ray(from, direction, length).is_some())
    }

    fn cast_sphere(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<f32> {
        self.statics
            .iter()
            .filter_map(|o| o.shape.inflated(radius).ray(origin, direction, max_distance))
            .map(|(distance, _)| distance)
            .reduce(f32::min)
    }
}

/// Система: синхронизация hurtbox'ов живых акторов в ObstacleField
pub fn sync_hurtboxes(
    field: Option<ResMut<ObstacleField>>,
    actors: Query<(Entity, &Transform, &Hurtbox), Without<Dead>>,
) {
    let Some(mut field) = field else {
        return;
    };

    field.set_hurtboxes(
        actors
            .iter()
            .map(|(entity, transform, hurtbox)| (entity, hurtbox.shape_at(transform.translation))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_box_front_face() {
        let wall = ObstacleShape::cuboid(Vec3::new(0.0, 0.0, -5.0), Vec3::new(2.0, 2.0, 0.5));
        let (distance, normal) = wall.ray(Vec3::ZERO, Vec3::NEG_Z, 100.0).unwrap();

        assert!((distance - 4.5).abs() < 1e-5);
        assert_eq!(normal, Vec3::Z);
    }

    #[test]
    fn test_ray_respects_max_distance() {
        let wall = ObstacleShape::cuboid(Vec3::new(0.0, 0.0, -5.0), Vec3::splat(0.5));
        assert!(wall.ray(Vec3::ZERO, Vec3::NEG_Z, 4.0).is_none());
        assert!(wall.ray(Vec3::ZERO, Vec3::Z, 100.0).is_none());
    }

    #[test]
    fn test_ray_sphere() {
        let ball = ObstacleShape::Sphere {
            center: Vec3::new(10.0, 0.0, 0.0),
            radius: 1.0,
        };
        let (distance, normal) = ball.ray(Vec3::ZERO, Vec3::X, 100.0).unwrap();

        assert!((distance - 9.0).abs() < 1e-5);
        assert!((normal - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_segment_blocked_ignores_hurtboxes() {
        let mut field = ObstacleField::new().with_wall(Vec3::new(5.0, 1.0, 0.0), Vec3::new(0.2, 2.0, 2.0));
        field.set_hurtboxes([(Entity::from_raw(7), ObstacleShape::cuboid(Vec3::new(0.0, 1.0, 5.0), Vec3::ONE))]);

        assert!(field.segment_blocked(Vec3::new(0.0, 1.5, 0.0), Vec3::new(10.0, 1.5, 0.0)));
        // Актор на пути не блокирует LOS
        assert!(!field.segment_blocked(Vec3::new(0.0, 1.5, 0.0), Vec3::new(0.0, 1.5, 10.0)));
    }

    #[test]
    fn test_cast_ray_excludes_shooter_and_picks_nearest() {
        let shooter = Entity::from_raw(1);
        let target = Entity::from_raw(2);
        let mut field = ObstacleField::new().with_wall(Vec3::new(0.0, 1.0, -20.0), Vec3::new(5.0, 5.0, 0.5));
        field.set_hurtboxes([
            (shooter, ObstacleShape::cuboid(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(0.5))),
            (target, ObstacleShape::cuboid(Vec3::new(0.0, 1.0, -10.0), Vec3::splat(0.5))),
        ]);

        let hit = field
            .cast_ray(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, 100.0, Some(shooter))
            .unwrap();

        assert_eq!(hit.entity, Some(target));
        assert!((hit.distance - 9.5).abs() < 1e-5);
    }

    #[test]
    fn test_cast_sphere_inflates_statics() {
        let field = ObstacleField::new().with_wall(Vec3::new(0.0, 0.0, 3.0), Vec3::new(5.0, 5.0, 0.5));
        let distance = field.cast_sphere(Vec3::ZERO, 0.2, Vec3::Z, 10.0).unwrap();

        // Грань на z=2.5, центр сферы касается на 2.3
        assert!((distance - 2.3).abs() < 1e-5);
    }
}
