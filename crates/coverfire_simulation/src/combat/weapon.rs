//! WeaponResolver — runtime состояние оружия одного актора
//!
//! Владеет патронами и таймерами (cooldown выстрела, перезарядка).
//! `fire` превращает запрос в hit-scan луч и DamageEvent.
//!
//! Темп стрельбы resolver сам НЕ проверяет: cooldown взводит состояние-владелец
//! (Shoot / Attack), а тикает FSM driver актора раз в тик.

use bevy::prelude::*;
use rand::{Rng, RngCore};

use super::events::{AmmoChanged, CombatNotice, DamageEvent, ReloadCompleted, ReloadStarted, WeaponFired};
use super::weapon_stats::{CatalogError, WeaponCatalog, WeaponId, WeaponStats};
use crate::physics::{RayHit, SpatialQuery};

/// Максимальный полуугол разброса при accuracy = 0 (градусы)
pub const MAX_SPREAD_DEGREES: f32 = 4.0;

/// Патроны и таймеры
///
/// Инварианты: current_ammo ≤ magazine_size; перезарядка берёт
/// не больше min(magazine_size − current_ammo, spare_ammo).
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct WeaponState {
    pub current_ammo: u32,
    /// None = бесконечный запас
    pub spare_ammo: Option<u32>,
    pub fire_cooldown_remaining: f32,
    pub reload_elapsed: f32,
    pub reloading: bool,
}

/// Запрос выстрела
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireRequest {
    pub shooter: Entity,
    /// Точка выхода луча (камера или глаза)
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Результат выстрела
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotOutcome {
    /// Направление после разброса
    pub direction: Vec3,
    pub hit: Option<RayHit>,
    /// Damageable, получивший DamageEvent
    pub target: Option<Entity>,
}

/// Окружение выстрела (инжектится driver'ом на тик)
pub struct ShotEnv<'a> {
    pub space: &'a dyn SpatialQuery,
    /// Collider entity → damageable entity (сам или ближайший предок с Health)
    pub damageable: &'a dyn Fn(Entity) -> Option<Entity>,
    pub rng: &'a mut dyn RngCore,
}

/// Оружие актора: конфиг + состояние
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct WeaponResolver {
    id: WeaponId,
    stats: WeaponStats,
    state: WeaponState,
}

impl WeaponResolver {
    /// Полный магазин, запас из конфига
    pub fn new(id: WeaponId, stats: WeaponStats) -> Self {
        let state = WeaponState {
            current_ammo: stats.magazine_size,
            spare_ammo: stats.spare_ammo,
            fire_cooldown_remaining: 0.0,
            reload_elapsed: 0.0,
            reloading: false,
        };
        Self { id, stats, state }
    }

    pub fn from_catalog(catalog: &WeaponCatalog, id: &WeaponId) -> Result<Self, CatalogError> {
        Ok(Self::new(id.clone(), catalog.require(id)?.clone()))
    }

    /// Builder: стартовые патроны (магазин обрезается по magazine_size)
    pub fn with_ammo(mut self, current: u32, spare: Option<u32>) -> Self {
        self.state.current_ammo = current.min(self.stats.magazine_size);
        self.state.spare_ammo = spare;
        self
    }

    pub fn id(&self) -> &WeaponId {
        &self.id
    }

    pub fn stats(&self) -> &WeaponStats {
        &self.stats
    }

    pub fn state(&self) -> &WeaponState {
        &self.state
    }

    pub fn current_ammo(&self) -> u32 {
        self.state.current_ammo
    }

    pub fn magazine_size(&self) -> u32 {
        self.stats.magazine_size
    }

    pub fn spare_ammo(&self) -> Option<u32> {
        self.state.spare_ammo
    }

    pub fn has_ammo(&self) -> bool {
        self.state.current_ammo > 0
    }

    pub fn is_reloading(&self) -> bool {
        self.state.reloading
    }

    pub fn can_fire(&self) -> bool {
        !self.state.reloading && self.state.current_ammo > 0
    }

    /// Есть место в магазине и есть чем его заполнить
    pub fn can_reload(&self) -> bool {
        !self.state.reloading
            && self.state.current_ammo < self.stats.magazine_size
            && self.state.spare_ammo != Some(0)
    }

    // === Fire-rate cooldown (взводит владелец) ===

    pub fn cooldown_ready(&self) -> bool {
        self.state.fire_cooldown_remaining <= 0.0
    }

    /// Cooldown = fire_rate оружия
    pub fn start_cooldown(&mut self) {
        self.state.fire_cooldown_remaining = self.stats.fire_rate;
    }

    /// Cooldown произвольной длины (AI attack cadence)
    pub fn start_cooldown_for(&mut self, seconds: f32) {
        self.state.fire_cooldown_remaining = seconds.max(0.0);
    }

    pub fn tick_cooldown(&mut self, delta: f32) {
        if self.state.fire_cooldown_remaining > 0.0 {
            self.state.fire_cooldown_remaining = (self.state.fire_cooldown_remaining - delta).max(0.0);
        }
    }

    // === Fire ===

    /// Один hit-scan выстрел. None если `can_fire()` ложно.
    pub fn fire(
        &mut self,
        request: &FireRequest,
        env: &mut ShotEnv<'_>,
        notices: &mut Vec<CombatNotice>,
    ) -> Option<ShotOutcome> {
        if !self.can_fire() {
            return None;
        }
        self.state.current_ammo -= 1;

        let aim = request.direction.normalize_or_zero();
        let direction = if aim == Vec3::ZERO {
            aim
        } else {
            spread_direction(aim, self.stats.accuracy, &mut *env.rng)
        };

        let hit = if direction == Vec3::ZERO {
            None
        } else {
            env.space
                .cast_ray(request.origin, direction, self.stats.max_range, Some(request.shooter))
        };

        let target = hit
            .and_then(|h| h.entity)
            .and_then(|collider| (env.damageable)(collider))
            .filter(|target| *target != request.shooter);

        notices.push(CombatNotice::Fired(WeaponFired {
            shooter: request.shooter,
            origin: request.origin,
            direction,
            impact: hit.map(|h| h.point),
        }));

        if let (Some(target), Some(hit)) = (target, hit) {
            notices.push(CombatNotice::Damage(DamageEvent {
                source: request.shooter,
                target,
                amount: self.stats.damage,
                impact_point: hit.point,
                impact_normal: hit.normal,
            }));
        }

        notices.push(self.ammo_notice(request.shooter));

        Some(ShotOutcome {
            direction,
            hit,
            target,
        })
    }

    // === Reload ===

    /// Запуск таймера перезарядки
    pub fn begin_reload(&mut self, entity: Entity, notices: &mut Vec<CombatNotice>) -> bool {
        if !self.can_reload() {
            return false;
        }
        self.state.reloading = true;
        self.state.reload_elapsed = 0.0;

        notices.push(CombatNotice::ReloadStarted(ReloadStarted {
            entity,
            duration: self.stats.reload_time,
        }));
        true
    }

    /// Продвигает таймер; по завершении коммитит патроны. `true` — завершилась на этом шаге.
    pub fn advance_reload(&mut self, entity: Entity, delta: f32, notices: &mut Vec<CombatNotice>) -> bool {
        if !self.state.reloading {
            return false;
        }
        self.state.reload_elapsed += delta;
        if self.state.reload_elapsed < self.stats.reload_time {
            return false;
        }
        self.reload(entity, notices);
        true
    }

    /// Мгновенный коммит перезарядки. Возвращает число заряженных патронов.
    pub fn reload(&mut self, entity: Entity, notices: &mut Vec<CombatNotice>) -> u32 {
        let missing = self.stats.magazine_size - self.state.current_ammo;
        let loaded = match self.state.spare_ammo {
            Some(spare) => missing.min(spare),
            None => missing,
        };

        self.state.current_ammo += loaded;
        if let Some(spare) = self.state.spare_ammo.as_mut() {
            *spare -= loaded;
        }
        self.state.reloading = false;
        self.state.reload_elapsed = 0.0;

        notices.push(CombatNotice::ReloadCompleted(ReloadCompleted {
            entity,
            current: self.state.current_ammo,
            max: self.stats.magazine_size,
        }));
        notices.push(self.ammo_notice(entity));
        loaded
    }

    /// Прерывание: прогресс теряется, патроны не меняются
    pub fn cancel_reload(&mut self) -> bool {
        if !self.state.reloading {
            return false;
        }
        self.state.reloading = false;
        self.state.reload_elapsed = 0.0;
        true
    }

    pub fn ammo_notice(&self, entity: Entity) -> CombatNotice {
        CombatNotice::Ammo(AmmoChanged {
            entity,
            current: self.state.current_ammo,
            max: self.stats.magazine_size,
            spare: self.state.spare_ammo,
        })
    }
}

/// Разброс в конусе с полуулом (1 − accuracy)·MAX_SPREAD_DEGREES.
/// При accuracy = 1 RNG не трогается.
pub fn spread_direction<R: Rng + ?Sized>(direction: Vec3, accuracy: f32, rng: &mut R) -> Vec3 {
    let half_angle = ((1.0 - accuracy.clamp(0.0, 1.0)) * MAX_SPREAD_DEGREES).to_radians();
    if half_angle <= 0.0 {
        return direction;
    }

    let azimuth = rng.gen_range(0.0..std::f32::consts::TAU);
    // sqrt → равномерно по площади диска
    let deviation = half_angle * rng.gen::<f32>().sqrt();

    let (u, v) = direction.any_orthonormal_pair();
    let offset = u * azimuth.cos() + v * azimuth.sin();
    (direction * deviation.cos() + offset * deviation.sin()).normalize()
}

/// Набор оружия актора: активное — в `WeaponResolver`, остальные лежат здесь
#[derive(Component, Debug, Clone, Default)]
pub struct Loadout {
    slots: Vec<Option<WeaponResolver>>,
    active: usize,
}

impl Loadout {
    /// Первый id — активное оружие
    pub fn from_catalog(
        catalog: &WeaponCatalog,
        ids: &[WeaponId],
    ) -> Result<(WeaponResolver, Loadout), CatalogError> {
        let mut slots = ids
            .iter()
            .map(|id| WeaponResolver::from_catalog(catalog, id).map(Some))
            .collect::<Result<Vec<_>, _>>()?;

        let active = slots
            .first_mut()
            .and_then(Option::take)
            .ok_or(CatalogError::EmptyLoadout)?;
        Ok((active, Loadout { slots, active: 0 }))
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Меняет активное оружие; состояние (патроны) каждого слота сохраняется
    pub fn switch_to(&mut self, index: usize, current: &mut WeaponResolver) -> bool {
        if index == self.active || index >= self.slots.len() {
            return false;
        }
        let Some(mut next) = self.slots[index].take() else {
            return false;
        };

        // Незаконченная перезарядка при смене оружия теряется
        current.cancel_reload();
        next.state.fire_cooldown_remaining = current.state.fire_cooldown_remaining;

        let previous = std::mem::replace(current, next);
        self.slots[self.active] = Some(previous);
        self.active = index;
        true
    }
}
