//! Physics queries module
//!
//! Симуляция не интегрирует физику сама — ей нужны только запросы:
//! - hit-scan (оружие)
//! - line-of-sight (восприятие врагов)
//! - sphere-cast (коллизия камеры)
//!
//! Backends: Rapier (игра) и ObstacleField (headless/тесты).

pub mod obstacles;
pub mod rapier;
pub mod spatial;
pub mod world_space;

pub use obstacles::{sync_hurtboxes, Hurtbox, Obstacle, ObstacleField, ObstacleShape};
pub use rapier::{
    actor_groups, environment_groups, RapierSpatial, COLLISION_GROUP_ACTORS, COLLISION_GROUP_ENVIRONMENT,
    HITSCAN_FILTER,
};
pub use spatial::{EmptySpace, RayHit, SpatialQuery};
pub use world_space::WorldSpace;
