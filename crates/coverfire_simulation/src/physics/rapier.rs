//! Rapier backend для SpatialQuery + collision groups
//!
//! ## Слои:
//! - GROUP_2: Actors (капсулы игрока/врагов, hit-scan цели)
//! - GROUP_3: Environment (стены, укрытия, террейн — блокируют LOS и камеру)
//!
//! Hit-scan видит Actors | Environment, LOS и камера — только Environment.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::spatial::{RayHit, SpatialQuery};

pub const COLLISION_GROUP_ACTORS: Group = Group::GROUP_2;
pub const COLLISION_GROUP_ENVIRONMENT: Group = Group::GROUP_3;

/// Маска hit-scan: акторы + статика
pub const HITSCAN_FILTER: Group = COLLISION_GROUP_ACTORS.union(COLLISION_GROUP_ENVIRONMENT);

/// Collision groups для акторов
pub fn actor_groups() -> CollisionGroups {
    CollisionGroups::new(COLLISION_GROUP_ACTORS, HITSCAN_FILTER)
}

/// Collision groups для статики
pub fn environment_groups() -> CollisionGroups {
    CollisionGroups::new(COLLISION_GROUP_ENVIRONMENT, COLLISION_GROUP_ACTORS)
}

fn query_filter(filter: Group) -> QueryFilter<'static> {
    QueryFilter::default().groups(CollisionGroups::new(Group::ALL, filter))
}

/// SpatialQuery поверх RapierContext (read-only)
pub struct RapierSpatial<'c, 'w> {
    context: &'c RapierContext<'w>,
}

impl<'c, 'w> RapierSpatial<'c, 'w> {
    pub fn new(context: &'c RapierContext<'w>) -> Self {
        Self { context }
    }
}

impl SpatialQuery for RapierSpatial<'_, '_> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RayHit> {
        let mut filter = query_filter(HITSCAN_FILTER);
        if let Some(entity) = exclude {
            filter = filter.exclude_collider(entity).exclude_rigid_body(entity);
        }

        self.context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)
            .map(|(entity, hit)| RayHit {
                entity: Some(entity),
                point: hit.point,
                normal: hit.normal,
                distance: hit.time_of_impact,
            })
    }

    fn segment_blocked(&self, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let length = delta.length();
        if length < 1e-6 {
            return false;
        }

        self.context
            .cast_ray(from, delta / length, length, true, query_filter(COLLISION_GROUP_ENVIRONMENT))
            .is_some()
    }

    fn cast_sphere(&self, origin: Vec3, radius: f32, direction: Vec3, max_distance: f32) -> Option<f32> {
        let shape = Collider::ball(radius);
        let options = ShapeCastOptions::with_max_time_of_impact(max_distance);

        self.context
            .cast_shape(
                origin,
                Quat::IDENTITY,
                direction,
                shape.raw.as_ref(),
                options,
                query_filter(COLLISION_GROUP_ENVIRONMENT),
            )
            .map(|(_, hit)| hit.time_of_impact)
    }
}
