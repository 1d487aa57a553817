//! Tests for the generic state machine engine.

use super::*;

/// Журнал хуков: (hook, state)
#[derive(Default)]
struct Journal {
    entries: Vec<(&'static str, &'static str)>,
    go_to_b: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Probe {
    A,
    B { ticks: u32 },
}

impl FsmState<Journal> for Probe {
    fn name(&self) -> &'static str {
        match self {
            Probe::A => "A",
            Probe::B { .. } => "B",
        }
    }

    fn enter(&mut self, ctx: &mut Journal) {
        ctx.entries.push(("enter", self.name()));
    }

    fn exit(&mut self, ctx: &mut Journal) {
        ctx.entries.push(("exit", self.name()));
    }

    fn next(&self, ctx: &Journal) -> Option<Self> {
        match self {
            Probe::A if ctx.go_to_b => Some(Probe::B { ticks: 0 }),
            Probe::B { .. } if !ctx.go_to_b => Some(Probe::A),
            _ => None,
        }
    }

    fn update(&mut self, ctx: &mut Journal) {
        if let Probe::B { ticks } = self {
            *ticks += 1;
        }
        ctx.entries.push(("update", self.name()));
    }
}

#[test]
fn test_initialize_enters_once() {
    let mut fsm = StateMachine::new(Probe::A);
    let mut journal = Journal::default();

    fsm.initialize(&mut journal);
    fsm.initialize(&mut journal);

    assert_eq!(journal.entries, vec![("enter", "A")]);
    assert!(fsm.is_initialized());
}

#[test]
fn test_change_state_runs_exit_before_enter() {
    let mut fsm = StateMachine::new(Probe::A);
    let mut journal = Journal::default();
    fsm.initialize(&mut journal);

    assert!(fsm.change_state(Probe::B { ticks: 0 }, &mut journal));

    assert_eq!(
        journal.entries,
        vec![("enter", "A"), ("exit", "A"), ("enter", "B")]
    );
    assert_eq!(fsm.previous(), Some(&Probe::A));
    assert_eq!(fsm.transitions(), 1);
}

#[test]
fn test_change_to_same_variant_is_noop() {
    let mut fsm = StateMachine::new(Probe::B { ticks: 3 });
    let mut journal = Journal::default();
    fsm.initialize(&mut journal);
    journal.entries.clear();

    // Тот же вариант с другими данными — всё равно no-op
    assert!(!fsm.change_state(Probe::B { ticks: 0 }, &mut journal));
    assert!(!fsm.change_state(None, &mut journal));

    assert!(journal.entries.is_empty());
    assert_eq!(fsm.current(), &Probe::B { ticks: 3 });
    assert_eq!(fsm.transitions(), 0);
}

#[test]
fn test_tick_evaluates_guards_then_updates_new_state() {
    let mut fsm = StateMachine::new(Probe::A);
    let mut journal = Journal::default();

    fsm.tick(&mut journal);
    journal.go_to_b = true;
    fsm.tick(&mut journal);

    assert_eq!(
        journal.entries,
        vec![
            ("enter", "A"),
            ("update", "A"),
            ("exit", "A"),
            ("enter", "B"),
            ("update", "B"),
        ]
    );
    assert_eq!(fsm.current(), &Probe::B { ticks: 1 });
}

#[test]
fn test_revert_to_previous() {
    let mut fsm = StateMachine::new(Probe::A);
    let mut journal = Journal::default();

    // Нет предыдущего — ничего не происходит
    assert!(!fsm.revert_to_previous(&mut journal));

    fsm.change_state(Probe::B { ticks: 0 }, &mut journal);
    assert!(fsm.revert_to_previous(&mut journal));
    assert_eq!(fsm.current(), &Probe::A);
}

#[test]
fn test_teardown_exits_and_stops_ticking() {
    let mut fsm = StateMachine::new(Probe::A);
    let mut journal = Journal::default();
    fsm.tick(&mut journal);

    fsm.teardown(&mut journal);
    fsm.teardown(&mut journal);
    journal.go_to_b = true;
    fsm.tick(&mut journal);

    assert_eq!(
        journal.entries,
        vec![("enter", "A"), ("update", "A"), ("exit", "A")]
    );
    assert!(fsm.is_torn_down());
    assert_eq!(fsm.current(), &Probe::A);
}
