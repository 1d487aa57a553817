//! Perception — обнаружение цели (дальность + FOV + line-of-sight)
//!
//! Пересчитывается каждый тик в Sense, до FSM.
//! Между тиками живёт только `last_known_target_position` (для Chase)
//! и флаг `alerted` (урон по актору → цель считается обнаруженной на следующем проходе).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::DamageEvent;
use crate::components::{Dead, Player};
use crate::physics::{SpatialQuery, WorldSpace};
use crate::SimulationSet;

/// Параметры восприятия
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct PerceptionConfig {
    /// Дальность обнаружения (метры)
    pub detection_range: f32,
    /// Полный угол обзора (градусы)
    pub field_of_view: f32,
    /// Высота глаз над позицией (метры)
    pub eye_height: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            detection_range: 15.0,
            field_of_view: 120.0,
            eye_height: 1.5,
        }
    }
}

/// Результат одного прохода восприятия
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct PerceptionResult {
    pub detected: bool,
    /// Дистанция до цели (горизонтальная плоскость не учитывается — полная 3D)
    pub distance: f32,
    /// Угол между forward и направлением на цель (градусы, по горизонтали)
    pub angle_from_forward: f32,
    pub last_known_target_position: Option<Vec3>,
}

/// Состояние восприятия актора
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Perception {
    /// Кого ищем (None → первый живой Player)
    pub target: Option<Entity>,
    /// Цель существует в мире на этом тике
    pub target_present: bool,
    /// Позиция цели на этом тике (если есть)
    pub target_position: Option<Vec3>,
    pub result: PerceptionResult,
    /// Урон от цели → обнаружение на следующем проходе
    pub alerted: bool,
}

impl Perception {
    pub fn tracking(target: Entity) -> Self {
        Self {
            target: Some(target),
            ..default()
        }
    }

    pub fn detected(&self) -> bool {
        self.result.detected
    }
}

/// Геометрическая проверка: дальность, FOV, LOS между глазами
pub fn evaluate(
    observer: &Transform,
    target_position: Vec3,
    config: &PerceptionConfig,
    space: &dyn SpatialQuery,
) -> PerceptionResult {
    let eye = observer.translation + Vec3::Y * config.eye_height;
    let target_eye = target_position + Vec3::Y * config.eye_height;
    let distance = observer.translation.distance(target_position);

    let to_target = Vec3::new(target_position.x - observer.translation.x, 0.0, target_position.z - observer.translation.z);
    let forward = observer.forward().as_vec3();
    let forward = Vec3::new(forward.x, 0.0, forward.z);
    let angle_from_forward = if to_target.length_squared() < 1e-8 || forward.length_squared() < 1e-8 {
        0.0
    } else {
        forward.angle_between(to_target).to_degrees()
    };

    let detected = distance <= config.detection_range
        && angle_from_forward <= config.field_of_view * 0.5
        && !space.segment_blocked(eye, target_eye);

    PerceptionResult {
        detected,
        distance,
        angle_from_forward,
        last_known_target_position: None,
    }
}

/// Система: цель по умолчанию — первый живой игрок
pub fn acquire_player_target(
    mut observers: Query<&mut Perception>,
    players: Query<Entity, (With<Player>, Without<Dead>)>,
) {
    let Some(player) = players.iter().next() else {
        return;
    };

    for mut perception in observers.iter_mut() {
        if perception.target.is_none() {
            perception.target = Some(player);
        }
    }
}

/// Система: пересчёт восприятия (Sense)
pub fn update_perception(
    space: WorldSpace,
    mut observers: Query<(Entity, &Transform, &PerceptionConfig, &mut Perception), Without<Dead>>,
    targets: Query<(&Transform, Has<Dead>)>,
) {
    space.scope(|space| {
        for (entity, transform, config, mut perception) in observers.iter_mut() {
            let was_detected = perception.result.detected;
            let last_known = perception.result.last_known_target_position;

            let target = perception.target.and_then(|t| targets.get(t).ok());
            let Some((target_transform, target_dead)) = target else {
                perception.target_present = false;
                perception.target_position = None;
                perception.alerted = false;
                perception.result = PerceptionResult {
                    last_known_target_position: last_known,
                    ..default()
                };
                continue;
            };

            let target_position = target_transform.translation;
            let mut result = evaluate(transform, target_position, config, space);

            // Мёртвых не видим; урон от цели = обнаружение
            if target_dead {
                result.detected = false;
            } else if perception.alerted {
                result.detected = true;
            }

            result.last_known_target_position = if result.detected {
                Some(target_position)
            } else {
                last_known
            };

            if result.detected != was_detected {
                crate::log(&format!(
                    "👁️ {:?} {} target at {:.1}m / {:.0}°",
                    entity,
                    if result.detected { "spotted" } else { "lost" },
                    result.distance,
                    result.angle_from_forward
                ));
            }

            perception.target_present = true;
            perception.target_position = Some(target_position);
            perception.alerted = false;
            perception.result = result;
        }
    });
}

/// Система: урон поднимает тревогу у жертвы (Resolve)
pub fn alert_on_damage(mut damage_events: EventReader<DamageEvent>, mut observers: Query<&mut Perception>) {
    for event in damage_events.read() {
        let Ok(mut perception) = observers.get_mut(event.target) else {
            continue;
        };

        if perception.target.is_none() {
            perception.target = Some(event.source);
        }
        if perception.target == Some(event.source) {
            perception.alerted = true;
        }
    }
}

/// Perception Plugin
///
/// Sense: acquire_player_target → update_perception
/// Resolve: alert_on_damage
pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (acquire_player_target, update_perception)
                .chain()
                .in_set(SimulationSet::Sense),
        )
        .add_systems(FixedUpdate, alert_on_damage.in_set(SimulationSet::Resolve));
    }
}
