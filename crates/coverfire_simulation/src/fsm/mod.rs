//! Generic finite state machine
//!
//! Движок без знания о конкретных состояниях:
//! - `StateMachine<S>` хранит ровно одно текущее состояние (+ предыдущее для revert)
//! - `S: FsmState<C>` — tagged enum, каждая ветка реализует enter/update/exit
//! - `C` — контекст тика (ссылки на компоненты актора), собирается системой-владельцем
//!
//! Переходы атомарны: exit текущего всегда завершается до enter нового.
//! Переход в тот же вариант (по discriminant) — no-op без side effects.

use bevy::prelude::*;
use std::fmt::Debug;
use std::mem::discriminant;

/// Состояние конечного автомата.
///
/// `next` — guards (чистая функция, первый выполненный guard побеждает),
/// `update` — действие на тик, `enter`/`exit` — одноразовые хуки.
pub trait FsmState<C: ?Sized>: Clone + Debug {
    fn name(&self) -> &'static str;

    fn enter(&mut self, _ctx: &mut C) {}

    fn exit(&mut self, _ctx: &mut C) {}

    /// Guards: куда перейти на этом тике (None = остаёмся)
    fn next(&self, ctx: &C) -> Option<Self>;

    fn update(&mut self, _ctx: &mut C) {}

    /// Отдельный fixed-rate шаг (физика). По умолчанию пустой.
    fn fixed_update(&mut self, _ctx: &mut C) {}
}

/// Конечный автомат (ECS component, generic по состоянию)
#[derive(Component, Debug, Clone)]
pub struct StateMachine<S: Send + Sync + 'static> {
    current: S,
    previous: Option<S>,
    initialized: bool,
    torn_down: bool,
    transitions: u32,
}

impl<S: Clone + Debug + Send + Sync + 'static> StateMachine<S> {
    /// Создаёт автомат с начальным состоянием. `enter` вызовется в `initialize`.
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            previous: None,
            initialized: false,
            torn_down: false,
            transitions: 0,
        }
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn previous(&self) -> Option<&S> {
        self.previous.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Сколько реальных переходов было (diagnostics)
    pub fn transitions(&self) -> u32 {
        self.transitions
    }

    /// Тот же вариант enum'а (данные внутри не сравниваются)
    pub fn is_in(&self, state: &S) -> bool {
        discriminant(&self.current) == discriminant(state)
    }

    /// Вызывает `enter` начального состояния ровно один раз
    pub fn initialize<C: ?Sized>(&mut self, ctx: &mut C)
    where
        S: FsmState<C>,
    {
        if self.initialized || self.torn_down {
            return;
        }
        self.initialized = true;
        self.current.enter(ctx);
    }

    /// Переход в `next`.
    ///
    /// No-op (возвращает `false`) если `next` пустой или совпадает по варианту с текущим.
    pub fn change_state<C: ?Sized>(&mut self, next: impl Into<Option<S>>, ctx: &mut C) -> bool
    where
        S: FsmState<C>,
    {
        let Some(next) = next.into() else {
            return false;
        };
        if self.torn_down || self.is_in(&next) {
            return false;
        }
        if !self.initialized {
            self.initialize(ctx);
        }

        self.current.exit(ctx);
        let previous = std::mem::replace(&mut self.current, next);
        self.current.enter(ctx);
        self.transitions += 1;

        crate::log(&format!("FSM: {} → {}", previous.name(), self.current.name()));
        self.previous = Some(previous);
        true
    }

    /// Возврат в предыдущее состояние (если было)
    pub fn revert_to_previous<C: ?Sized>(&mut self, ctx: &mut C) -> bool
    where
        S: FsmState<C>,
    {
        let previous = self.previous.clone();
        self.change_state(previous, ctx)
    }

    /// Один тик: guards текущего состояния → (возможный переход) → update текущего
    pub fn tick<C: ?Sized>(&mut self, ctx: &mut C)
    where
        S: FsmState<C>,
    {
        if self.torn_down {
            return;
        }
        self.initialize(ctx);

        if let Some(next) = self.current.next(ctx) {
            self.change_state(next, ctx);
        }

        self.current.update(ctx);
    }

    pub fn fixed_tick<C: ?Sized>(&mut self, ctx: &mut C)
    where
        S: FsmState<C>,
    {
        if self.torn_down || !self.initialized {
            return;
        }
        self.current.fixed_update(ctx);
    }

    /// Останавливает автомат: `exit` текущего состояния, дальнейшие тики игнорируются
    pub fn teardown<C: ?Sized>(&mut self, ctx: &mut C)
    where
        S: FsmState<C>,
    {
        if self.torn_down {
            return;
        }
        if self.initialized {
            self.current.exit(ctx);
        }
        self.torn_down = true;
        crate::log(&format!("FSM: teardown in {}", self.current.name()));
    }
}

#[cfg(test)]
mod fsm_tests;
