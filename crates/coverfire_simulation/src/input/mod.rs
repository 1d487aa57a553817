//! Player input snapshot
//!
//! Хост (клавиатура, геймпад, replay, тесты) заполняет `PlayerInput` один раз
//! перед тиком. Симуляция читает его в Decide/Camera, а edge-флаги
//! (`*_down`, `fire_up`, look delta, weapon select) гасит в конце тика.

use bevy::prelude::*;

/// Входные данные игрока за один тик
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    /// Движение (x = strafe, y = forward), длина ≤ 1
    pub move_axis: Vec2,
    /// Дельта обзора (x = yaw, y = pitch)
    pub look: Vec2,
    pub fire_down: bool,
    pub fire_held: bool,
    pub fire_up: bool,
    pub aim_held: bool,
    pub sprint_held: bool,
    pub cover_down: bool,
    pub reload_down: bool,
    pub shoulder_switch_down: bool,
    /// Выбор слота оружия (None = без смены)
    pub weapon_select: Option<usize>,
}

/// Порог "есть движение" для guards
pub const MOVE_THRESHOLD: f32 = 0.1;

impl PlayerInput {
    pub fn move_magnitude(&self) -> f32 {
        self.move_axis.length()
    }

    pub fn is_moving(&self) -> bool {
        self.move_magnitude() > MOVE_THRESHOLD
    }

    /// Fire нажат на этом тике или удерживается
    pub fn fire_pressed(&self) -> bool {
        self.fire_down || self.fire_held
    }

    /// Сброс одноразовых флагов (после того как все потребители прочитали тик)
    pub fn release_edges(&mut self) {
        self.look = Vec2::ZERO;
        self.fire_down = false;
        self.fire_up = false;
        self.cover_down = false;
        self.reload_down = false;
        self.shoulder_switch_down = false;
        self.weapon_select = None;
    }
}

/// Система: гасит edge-флаги в конце тика (held-флаги остаются)
pub fn release_input_edges(mut inputs: Query<&mut PlayerInput>) {
    for mut input in inputs.iter_mut() {
        input.release_edges();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_threshold() {
        let mut input = PlayerInput::default();
        assert!(!input.is_moving());

        input.move_axis = Vec2::new(0.1, 0.0);
        assert!(!input.is_moving()); // ровно порог — ещё не движение

        input.move_axis = Vec2::new(0.0, 0.5);
        assert!(input.is_moving());
    }

    #[test]
    fn test_release_edges_keeps_held_flags() {
        let mut input = PlayerInput {
            move_axis: Vec2::Y,
            look: Vec2::ONE,
            fire_down: true,
            fire_held: true,
            aim_held: true,
            cover_down: true,
            weapon_select: Some(1),
            ..default()
        };

        input.release_edges();

        assert!(input.fire_held);
        assert!(input.aim_held);
        assert_eq!(input.move_axis, Vec2::Y);
        assert!(!input.fire_down);
        assert!(!input.cover_down);
        assert_eq!(input.look, Vec2::ZERO);
        assert_eq!(input.weapon_select, None);
    }
}
