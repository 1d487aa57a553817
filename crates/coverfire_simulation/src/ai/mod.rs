//! AI module: боевой FSM врагов
//!
//! Архитектура:
//! - Perception (Sense) → `StateMachine<EnemyState>` (Decide) → NavAgent step
//! - Состояния: Idle, Patrol, Chase, Attack (см. states.rs)
//! - Навигация через `Navigator` capability (pathfinding — внешний)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod navigator;
pub mod states;
pub mod systems;

pub use navigator::{NavAgent, Navigator, StraightLineNavigator};
pub use states::{EnemyContext, EnemyState};
pub use systems::enemy_combat_fsm;

use crate::combat::WeaponResolver;
use crate::components::{Actor, DespawnOnDeath};
use crate::fsm::StateMachine;
use crate::perception::{Perception, PerceptionConfig};
use crate::SimulationSet;

pub const ENEMY_FACTION: u64 = 1;

/// Параметры поведения врага
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct EnemyConfig {
    pub attack_range: f32,
    /// Секунды между выстрелами в Attack
    pub attack_cooldown: f32,
    /// Сколько преследовать невидимую цель
    pub chase_timeout: f32,
    pub patrol_wait_time: f32,
    pub idle_duration: f32,
    /// Минимальный интервал перезапроса пути в Chase
    pub path_update_interval: f32,
    /// Скорость доворота к цели (slerp factor / сек)
    pub turn_speed: f32,
    /// Высота точки прицеливания над позицией цели (грудь)
    pub aim_height: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            attack_range: 10.0,
            attack_cooldown: 1.0,
            chase_timeout: 5.0,
            patrol_wait_time: 2.0,
            idle_duration: 2.0,
            path_update_interval: 0.2,
            turn_speed: 5.0,
            aim_height: 1.0,
        }
    }
}

/// Циклический маршрут патруля (индекс переживает выход из Patrol)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec3>,
    current: usize,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints, current: 0 }
    }

    pub fn has_waypoints(&self) -> bool {
        !self.waypoints.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.get(self.current).copied()
    }

    /// Следующая точка (по кругу)
    pub fn advance(&mut self) -> Option<Vec3> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.waypoints.len();
        self.current()
    }
}

/// Обязательные компоненты врага. Маршрут и navigator — опциональны.
pub fn enemy_bundle(weapon: WeaponResolver, route: Option<&PatrolRoute>) -> impl Bundle {
    (
        Actor {
            faction_id: ENEMY_FACTION,
        },
        EnemyConfig::default(),
        PerceptionConfig::default(),
        Perception::default(),
        weapon,
        StateMachine::new(EnemyState::initial(route)),
        DespawnOnDeath::default(),
    )
}

/// AI Plugin (Decide)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, enemy_combat_fsm.in_set(SimulationSet::Decide));
    }
}
