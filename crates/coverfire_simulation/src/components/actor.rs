//! Базовые компоненты акторов: Actor, Health, Dead, Player

use bevy::prelude::*;

/// Актор (игрок, враг) — базовый компонент для живых существ
///
/// Автоматически добавляет Health, PhysicsBody, Transform и Hurtbox через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, crate::components::PhysicsBody, Transform, crate::physics::Hurtbox)]
pub struct Actor {
    /// Stable ID фракции
    pub faction_id: u64,
}

/// Маркер: актор управляется игроком
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Возвращает реально снятый урон
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.current);
        self.current -= dealt;
        dealt
    }

    /// Возвращает реально восстановленное здоровье
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max.saturating_sub(self.current));
        self.current += healed;
        healed
    }

    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }
}

/// Компонент-маркер: актор мёртв (Health == 0)
///
/// FSM актора останавливается (teardown), урон/лечение игнорируются.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Актор удаляется через `delay` секунд после смерти (враги).
/// Без этого компонента труп остаётся в мире (игрок).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DespawnOnDeath {
    pub delay: f32,
}

impl Default for DespawnOnDeath {
    fn default() -> Self {
        Self { delay: 2.0 }
    }
}

/// Таймер деспавна (вешается системой смерти)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DespawnAfter {
    pub remaining: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);

        assert_eq!(health.take_damage(30), 30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        // Saturating: снимается только остаток
        assert_eq!(health.take_damage(100), 70);
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.take_damage(50);

        assert_eq!(health.heal(30), 30);
        assert_eq!(health.current, 80);

        assert_eq!(health.heal(100), 20); // Clamped to max
        assert_eq!(health.current, 100);
        assert_eq!(health.fraction(), 1.0);
    }

    #[test]
    fn test_heal_above_max_is_noop() {
        let mut health = Health { current: 120, max: 100 };

        assert_eq!(health.heal(10), 0);
        assert_eq!(health.current, 120);
    }
}
