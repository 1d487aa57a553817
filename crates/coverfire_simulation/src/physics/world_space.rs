//! WorldSpace — SystemParam, выбирающий backend физических запросов
//!
//! Приоритет: ObstacleField (headless) → Rapier context → EmptySpace.
//! Отсутствие физики — не ошибка: LOS всегда свободен, выстрелы мажут.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::obstacles::ObstacleField;
use super::rapier::RapierSpatial;
use super::spatial::{EmptySpace, SpatialQuery};

#[derive(SystemParam)]
pub struct WorldSpace<'w, 's> {
    rapier: ReadRapierContext<'w, 's>,
    obstacles: Option<Res<'w, ObstacleField>>,
}

impl WorldSpace<'_, '_> {
    /// Выполняет `f` с активным backend'ом
    pub fn scope<R>(&self, f: impl FnOnce(&dyn SpatialQuery) -> R) -> R {
        if let Some(field) = self.obstacles.as_deref() {
            return f(field);
        }

        match self.rapier.single() {
            Ok(context) => f(&RapierSpatial::new(&context)),
            Err(_) => f(&EmptySpace),
        }
    }
}
