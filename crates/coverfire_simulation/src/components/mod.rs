//! ECS Components, общие для всех акторов
//!
//! Организация по доменам:
//! - actor: фракция, здоровье, смерть
//! - movement: скорости и фактическая velocity
//!
//! Доменные компоненты (оружие, укрытия, AI, камера) живут в своих модулях.

pub mod actor;
pub mod movement;

pub use actor::*;
pub use movement::*;
