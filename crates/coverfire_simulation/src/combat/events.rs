//! Combat events (UI / анимация / здоровье)
//!
//! FSM-тики копят уведомления в `Vec<CombatNotice>` (порядок = порядок действий),
//! затем driver сбрасывает их в Bevy events через `CombatEventWriters::flush`.
//! Так порядок доставки совпадает с порядком действий внутри тика.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Событие: hit-scan попал в damageable цель
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageEvent {
    pub source: Entity,
    pub target: Entity,
    pub amount: u32,
    pub impact_point: Vec3,
    pub impact_normal: Vec3,
}

/// Запрос лечения (аптечки, скрипты)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HealEvent {
    pub target: Entity,
    pub amount: u32,
}

/// Событие: изменились патроны в магазине
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AmmoChanged {
    pub entity: Entity,
    pub current: u32,
    pub max: u32,
    /// None = бесконечный запас
    pub spare: Option<u32>,
}

/// Событие: выстрел (для VFX/звука/отдачи)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct WeaponFired {
    pub shooter: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
    /// Куда пришёл луч (None = промах в пустоту)
    pub impact: Option<Vec3>,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ReloadStarted {
    pub entity: Entity,
    pub duration: f32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct ReloadCompleted {
    pub entity: Entity,
    pub current: u32,
    pub max: u32,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: u32,
    pub max: u32,
}

/// Событие: актор умер (health → 0)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Уведомление, накопленное за тик FSM
#[derive(Debug, Clone, PartialEq)]
pub enum CombatNotice {
    Ammo(AmmoChanged),
    Fired(WeaponFired),
    ReloadStarted(ReloadStarted),
    ReloadCompleted(ReloadCompleted),
    Damage(DamageEvent),
}

/// Writers для всех уведомлений оружия
#[derive(SystemParam)]
pub struct CombatEventWriters<'w> {
    ammo: EventWriter<'w, AmmoChanged>,
    fired: EventWriter<'w, WeaponFired>,
    reload_started: EventWriter<'w, ReloadStarted>,
    reload_completed: EventWriter<'w, ReloadCompleted>,
    damage: EventWriter<'w, DamageEvent>,
}

impl CombatEventWriters<'_> {
    /// Сброс накопленных уведомлений (в порядке появления)
    pub fn flush(&mut self, notices: &mut Vec<CombatNotice>) {
        for notice in notices.drain(..) {
            match notice {
                CombatNotice::Ammo(e) => {
                    self.ammo.write(e);
                }
                CombatNotice::Fired(e) => {
                    self.fired.write(e);
                }
                CombatNotice::ReloadStarted(e) => {
                    self.reload_started.write(e);
                }
                CombatNotice::ReloadCompleted(e) => {
                    self.reload_completed.write(e);
                }
                CombatNotice::Damage(e) => {
                    self.damage.write(e);
                }
            }
        }
    }
}
