//! Animation parameters (выход для внешнего animator'а)
//!
//! Симуляция не проигрывает анимации, только выставляет параметры:
//! Speed / InputX / InputY (damped), IsAiming, InCover, триггеры Reload / Shoot.
//! Актор без `AnimatorParams` просто ничего не публикует.

use bevy::prelude::*;

/// Время демпфирования float параметров (секунды)
pub const PARAM_DAMP_TIME: f32 = 0.1;

#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimatorParams {
    pub speed: f32,
    pub input_x: f32,
    pub input_y: f32,
    pub is_aiming: bool,
    pub in_cover: bool,
    reload_trigger: bool,
    shoot_trigger: bool,
}

impl AnimatorParams {
    /// Экспоненциальное сглаживание к целевым значениям
    pub fn drive_locomotion(&mut self, speed: f32, input: Vec2, delta: f32) {
        let t = damp_factor(delta);
        self.speed += (speed - self.speed) * t;
        self.input_x += (input.x - self.input_x) * t;
        self.input_y += (input.y - self.input_y) * t;
    }

    pub fn trigger_reload(&mut self) {
        self.reload_trigger = true;
    }

    pub fn trigger_shoot(&mut self) {
        self.shoot_trigger = true;
    }

    /// Animator забирает триггер (one-shot)
    pub fn consume_reload(&mut self) -> bool {
        std::mem::take(&mut self.reload_trigger)
    }

    pub fn consume_shoot(&mut self) -> bool {
        std::mem::take(&mut self.shoot_trigger)
    }

    pub fn reload_pending(&self) -> bool {
        self.reload_trigger
    }

    pub fn shoot_pending(&self) -> bool {
        self.shoot_trigger
    }
}

fn damp_factor(delta: f32) -> f32 {
    if delta <= 0.0 {
        return 0.0;
    }
    1.0 - (-delta / PARAM_DAMP_TIME).exp()
}
