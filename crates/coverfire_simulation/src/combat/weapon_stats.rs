//! Weapon stats + каталог оружия
//!
//! Архитектура:
//! - `WeaponStats` — read-only конфиг (урон, темп, магазин, перезарядка, дальность)
//! - `WeaponCatalog` — resource, ключ = `WeaponId`; грузится из JSON или builtin
//! - Runtime состояние (патроны, таймеры) — в `WeaponResolver` (weapon.rs)
//!
//! Битые таблицы отклоняются при загрузке (`CatalogError`),
//! в runtime невалидный конфиг не попадает.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Идентификатор оружия в каталоге
#[derive(Debug, Clone, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeaponId(pub String);

impl WeaponId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for WeaponId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Параметры оружия (hit-scan)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct WeaponStats {
    pub name: String,

    /// Урон за попадание
    pub damage: u32,

    /// Интервал между выстрелами (секунды)
    pub fire_rate: f32,

    pub magazine_size: u32,

    /// Длительность перезарядки (секунды)
    pub reload_time: f32,

    /// Точность 0..1 (1 = без разброса)
    pub accuracy: f32,

    /// Дистанция без штрафов (для AI/UI, на hit-scan не влияет)
    pub effective_range: f32,

    /// Максимальная дальность луча (метры)
    pub max_range: f32,

    /// Стартовый запас патронов (None = бесконечный)
    #[serde(default)]
    pub spare_ammo: Option<u32>,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self::assault_rifle()
    }
}

impl WeaponStats {
    pub fn assault_rifle() -> Self {
        Self {
            name: "Assault Rifle".to_string(),
            damage: 25,
            fire_rate: 0.1,
            magazine_size: 30,
            reload_time: 2.0,
            accuracy: 0.8,
            effective_range: 50.0,
            max_range: 100.0,
            spare_ammo: Some(90),
        }
    }

    pub fn pistol() -> Self {
        Self {
            name: "Pistol".to_string(),
            damage: 15,
            fire_rate: 0.25,
            magazine_size: 12,
            reload_time: 1.5,
            accuracy: 0.9,
            effective_range: 25.0,
            max_range: 50.0,
            spare_ammo: None,
        }
    }

    /// Оружие врага: урон 10, бесконечный запас
    pub fn enemy_rifle() -> Self {
        Self {
            name: "Enemy Rifle".to_string(),
            damage: 10,
            fire_rate: 0.1,
            magazine_size: 30,
            reload_time: 2.0,
            accuracy: 0.7,
            effective_range: 10.0,
            max_range: 100.0,
            spare_ammo: None,
        }
    }

    /// Проверка инвариантов конфига
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.magazine_size == 0 {
            return Err("magazine_size must be > 0");
        }
        if !(self.fire_rate > 0.0) {
            return Err("fire_rate must be > 0");
        }
        if !(self.reload_time >= 0.0) {
            return Err("reload_time must be >= 0");
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err("accuracy must be within [0, 1]");
        }
        if !(self.max_range > 0.0) {
            return Err("max_range must be > 0");
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("weapon catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate weapon id `{0}`")]
    Duplicate(WeaponId),

    #[error("weapon `{id}` is invalid: {reason}")]
    Invalid { id: WeaponId, reason: &'static str },

    #[error("unknown weapon id `{0}`")]
    Unknown(WeaponId),

    #[error("loadout needs at least one weapon id")]
    EmptyLoadout,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    weapons: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: WeaponId,
    #[serde(flatten)]
    stats: WeaponStats,
}

/// Каталог оружия (порядок записей сохраняется)
#[derive(Resource, Debug, Clone)]
pub struct WeaponCatalog {
    entries: Vec<(WeaponId, WeaponStats)>,
}

impl Default for WeaponCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WeaponCatalog {
    /// Встроенный набор: rifle, pistol, enemy_rifle
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                (WeaponId::new("rifle"), WeaponStats::assault_rifle()),
                (WeaponId::new("pistol"), WeaponStats::pistol()),
                (WeaponId::new("enemy_rifle"), WeaponStats::enemy_rifle()),
            ],
        }
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = (WeaponId, WeaponStats)>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self { entries: Vec::new() };
        for (id, stats) in entries {
            stats
                .validate()
                .map_err(|reason| CatalogError::Invalid { id: id.clone(), reason })?;
            if catalog.get(&id).is_some() {
                return Err(CatalogError::Duplicate(id));
            }
            catalog.entries.push((id, stats));
        }
        Ok(catalog)
    }

    /// Формат: `{ "weapons": [ { "id": "rifle", "name": ..., "damage": ..., ... } ] }`
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_entries(file.weapons.into_iter().map(|e| (e.id, e.stats)))
    }

    pub fn get(&self, id: &WeaponId) -> Option<&WeaponStats> {
        self.entries.iter().find(|(key, _)| key == id).map(|(_, stats)| stats)
    }

    pub fn require(&self, id: &WeaponId) -> Result<&WeaponStats, CatalogError> {
        self.get(id).ok_or_else(|| CatalogError::Unknown(id.clone()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &WeaponId> {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
