//! Cover system: точки укрытия, реестр пересечений, snap позы
//!
//! Поток данных:
//! - `poll_cover_overlaps` (headless сенсор) → `CoverOverlap` events
//! - `apply_cover_overlaps` → `CoverRegistry` актора (кандидаты)
//! - Player FSM (Cover state) берёт ближайшего кандидата и снапается к нему
//!
//! Реестр — read service для FSM: хранит копии точек, а не ссылки на мир.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{flatten, yaw_towards};
use crate::SimulationSet;

/// Глубина позиции актора перед плоскостью укрытия (метры, по нормали)
pub const COVER_DEPTH_OFFSET: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum CoverKind {
    /// Низкое укрытие (по пояс)
    #[default]
    Half,
    /// Стена в полный рост
    Full,
}

/// Точка укрытия (статичная, позиция — в Transform)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CoverPoint {
    /// Нормаль от укрытия в сторону, где стоит актор
    pub normal: Vec3,
    /// Половина ширины укрытия вдоль lateral оси
    pub half_length: f32,
    pub kind: CoverKind,
}

impl Default for CoverPoint {
    fn default() -> Self {
        Self {
            normal: Vec3::Z,
            half_length: 1.0,
            kind: CoverKind::Half,
        }
    }
}

/// Кандидат в реестре: entity укрытия + копия его геометрии
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CoverCandidate {
    pub entity: Entity,
    pub position: Vec3,
    pub point: CoverPoint,
}

impl CoverCandidate {
    /// Горизонтальная нормаль (fallback +Z для вырожденной)
    pub fn normal(&self) -> Vec3 {
        let normal = flatten(self.point.normal);
        if normal == Vec3::ZERO {
            Vec3::Z
        } else {
            normal
        }
    }

    /// Ось вдоль укрытия
    pub fn lateral_axis(&self) -> Vec3 {
        Vec3::Y.cross(self.normal())
    }

    /// Смещение актора вдоль укрытия в локальном фрейме (без clamp)
    pub fn lateral_offset(&self, position: Vec3) -> f32 {
        (position - self.position).dot(self.lateral_axis())
    }

    /// Snap позиция: lateral ∈ [−half_length, +half_length], depth фиксирован, высота сохраняется
    pub fn snap_position(&self, actor_position: Vec3) -> Vec3 {
        let half = self.point.half_length.max(0.0);
        let lateral = self.lateral_offset(actor_position).clamp(-half, half);

        let mut snapped = self.position + self.lateral_axis() * lateral + self.normal() * COVER_DEPTH_OFFSET;
        snapped.y = actor_position.y;
        snapped
    }

    /// Актор смотрит на укрытие
    pub fn facing(&self) -> Vec3 {
        -self.normal()
    }

    pub fn facing_rotation(&self) -> Quat {
        yaw_towards(self.facing()).unwrap_or(Quat::IDENTITY)
    }

    /// Горизонтальная дистанция до отрезка укрытия (для сенсора пересечений)
    pub fn distance_to_segment(&self, position: Vec3) -> f32 {
        let half = self.point.half_length.max(0.0);
        let lateral = self.lateral_offset(position).clamp(-half, half);
        let closest = self.position + self.lateral_axis() * lateral;
        Vec2::new(position.x - closest.x, position.z - closest.z).length()
    }
}

/// Реестр укрытий, которые актор сейчас пересекает
#[derive(Component, Debug, Clone, Default)]
pub struct CoverRegistry {
    candidates: Vec<CoverCandidate>,
    current: Option<CoverCandidate>,
}

impl CoverRegistry {
    /// Дубликаты (тот же entity) игнорируются
    pub fn add(&mut self, candidate: CoverCandidate) -> bool {
        if self.candidates.iter().any(|c| c.entity == candidate.entity) {
            return false;
        }
        self.candidates.push(candidate);
        true
    }

    /// Удаляет кандидата. Текущее укрытие (если актор в нём) не трогаем.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.candidates.len();
        self.candidates.retain(|c| c.entity != entity);
        self.candidates.len() != before
    }

    pub fn candidates(&self) -> &[CoverCandidate] {
        &self.candidates
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Линейный поиск по Euclidean distance; при равенстве — первый добавленный
    pub fn nearest(&self, position: Vec3) -> Option<&CoverCandidate> {
        let mut best: Option<(&CoverCandidate, f32)> = None;
        for candidate in &self.candidates {
            let distance = candidate.position.distance(position);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((candidate, distance)),
            }
        }
        best.map(|(candidate, _)| candidate)
    }

    /// Занять ближайшее укрытие
    pub fn take_cover(&mut self, position: Vec3) -> Option<CoverCandidate> {
        let nearest = self.nearest(position).copied()?;
        self.current = Some(nearest);
        Some(nearest)
    }

    pub fn leave_cover(&mut self) -> Option<CoverCandidate> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&CoverCandidate> {
        self.current.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapKind {
    Entered,
    Exited,
}

/// Событие пересечения актор ↔ укрытие (от сенсора или внешней физики)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CoverOverlap {
    pub actor: Entity,
    pub cover: Entity,
    pub kind: OverlapKind,
}

/// Headless сенсор укрытий (радиус вокруг актора)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CoverSensor {
    pub detection_radius: f32,
    overlapping: Vec<Entity>,
}

impl Default for CoverSensor {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl CoverSensor {
    pub fn new(detection_radius: f32) -> Self {
        Self {
            detection_radius,
            overlapping: Vec::new(),
        }
    }

    pub fn overlapping(&self) -> &[Entity] {
        &self.overlapping
    }
}

/// Система: diff пересечений сенсора → CoverOverlap events
pub fn poll_cover_overlaps(
    mut sensors: Query<(Entity, &Transform, &mut CoverSensor)>,
    covers: Query<(Entity, &Transform, &CoverPoint)>,
    mut overlaps: EventWriter<CoverOverlap>,
) {
    for (actor, transform, mut sensor) in sensors.iter_mut() {
        let position = transform.translation;
        let radius = sensor.detection_radius;

        let inside: Vec<Entity> = covers
            .iter()
            .filter(|(entity, cover_transform, point)| {
                let candidate = CoverCandidate {
                    entity: *entity,
                    position: cover_transform.translation,
                    point: **point,
                };
                candidate.distance_to_segment(position) <= radius
            })
            .map(|(entity, _, _)| entity)
            .collect();

        for cover in sensor.overlapping.iter().filter(|e| !inside.contains(e)) {
            overlaps.write(CoverOverlap {
                actor,
                cover: *cover,
                kind: OverlapKind::Exited,
            });
        }
        for cover in inside.iter().filter(|e| !sensor.overlapping.contains(e)) {
            overlaps.write(CoverOverlap {
                actor,
                cover: *cover,
                kind: OverlapKind::Entered,
            });
        }

        sensor.overlapping = inside;
    }
}

/// Система: CoverOverlap → CoverRegistry (актор без реестра — игнор)
pub fn apply_cover_overlaps(
    mut overlaps: EventReader<CoverOverlap>,
    mut registries: Query<&mut CoverRegistry>,
    covers: Query<(&Transform, &CoverPoint)>,
) {
    for overlap in overlaps.read() {
        let Ok(mut registry) = registries.get_mut(overlap.actor) else {
            continue;
        };

        match overlap.kind {
            OverlapKind::Entered => {
                let Ok((transform, point)) = covers.get(overlap.cover) else {
                    continue;
                };
                registry.add(CoverCandidate {
                    entity: overlap.cover,
                    position: transform.translation,
                    point: *point,
                });
            }
            OverlapKind::Exited => {
                registry.remove(overlap.cover);
            }
        }
    }
}

/// Cover Plugin (Sense: poll → apply)
pub struct CoverPlugin;

impl Plugin for CoverPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CoverOverlap>().add_systems(
            FixedUpdate,
            (poll_cover_overlaps, apply_cover_overlaps)
                .chain()
                .in_set(SimulationSet::Sense),
        );
    }
}
