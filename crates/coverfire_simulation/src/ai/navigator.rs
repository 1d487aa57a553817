//! Navigator — непрозрачная навигация для AI
//!
//! FSM только запрашивает "иди к точке" и спрашивает "дошёл?".
//! Поиск пути — забота backend'а (navmesh в игре, прямая линия в headless).

use bevy::prelude::*;
use std::fmt;

pub trait Navigator: Send + Sync + 'static {
    fn move_to(&mut self, destination: Vec3);

    fn stop(&mut self);

    fn has_reached_destination(&self) -> bool;

    /// Продвигает агента из `position` на один тик; возвращает новую позицию
    fn step(&mut self, position: Vec3, delta: f32) -> Vec3;
}

/// Headless navigator: прямая линия по XZ, без препятствий
#[derive(Debug, Clone, PartialEq)]
pub struct StraightLineNavigator {
    pub speed: f32,
    pub arrival_tolerance: f32,
    destination: Option<Vec3>,
}

impl Default for StraightLineNavigator {
    fn default() -> Self {
        Self::new(3.5)
    }
}

impl StraightLineNavigator {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            arrival_tolerance: 0.3,
            destination: None,
        }
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }
}

impl Navigator for StraightLineNavigator {
    fn move_to(&mut self, destination: Vec3) {
        self.destination = Some(destination);
    }

    fn stop(&mut self) {
        self.destination = None;
    }

    fn has_reached_destination(&self) -> bool {
        self.destination.is_none()
    }

    fn step(&mut self, position: Vec3, delta: f32) -> Vec3 {
        let Some(destination) = self.destination else {
            return position;
        };

        let to_target = Vec3::new(destination.x - position.x, 0.0, destination.z - position.z);
        let distance = to_target.length();
        if distance <= self.arrival_tolerance {
            self.destination = None;
            return position;
        }

        let travel = (self.speed * delta).min(distance);
        let next = position + to_target / distance * travel;
        if distance - travel <= self.arrival_tolerance {
            self.destination = None;
        }
        next
    }
}

/// Компонент: navigator актора + счётчик запросов (для бюджета pathfinding)
#[derive(Component)]
pub struct NavAgent {
    navigator: Box<dyn Navigator>,
    requests: u32,
}

impl fmt::Debug for NavAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavAgent")
            .field("requests", &self.requests)
            .field("reached", &self.navigator.has_reached_destination())
            .finish()
    }
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::new(StraightLineNavigator::default())
    }
}

impl NavAgent {
    pub fn new(navigator: impl Navigator) -> Self {
        Self {
            navigator: Box::new(navigator),
            requests: 0,
        }
    }

    pub fn move_to(&mut self, destination: Vec3) {
        self.requests += 1;
        self.navigator.move_to(destination);
    }

    pub fn stop(&mut self) {
        self.navigator.stop();
    }

    pub fn has_reached_destination(&self) -> bool {
        self.navigator.has_reached_destination()
    }

    pub fn step(&mut self, position: Vec3, delta: f32) -> Vec3 {
        self.navigator.step(position, delta)
    }

    /// Сколько раз запрашивался путь
    pub fn requests(&self) -> u32 {
        self.requests
    }
}
