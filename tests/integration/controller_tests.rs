//! Controller behaviour against a simulated clock: transition table
//! coverage, solid output, pulse and pattern timing, stale expiries.

use blinkfsm::error::UsageError;
use blinkfsm::events::{Event, EventKind, Identity, PulseSpec, TimerRef};
use blinkfsm::fsm::{Dispatch, StateId};

use crate::mock_hw::{PortCall, SIM_ID, SimBoard};

fn init_event() -> Event {
    Event::Init(Identity {
        id: SIM_ID,
        timer: TimerRef(SIM_ID.0),
    })
}

fn sample(kind: EventKind) -> Event {
    match kind {
        EventKind::Init => init_event(),
        EventKind::Pulse => Event::Pulse(PulseSpec::new(2, 50, 100, 200)),
        EventKind::On => Event::On,
        EventKind::Off => Event::Off,
        EventKind::Change => Event::Change,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Moves,
    Ignored,
    Violation,
}

// ── Table coverage ────────────────────────────────────────────

#[test]
fn every_state_event_pair_matches_protocol() {
    use Class::{Ignored as I, Moves as M, Violation as V};
    use StateId::*;

    // Columns: Init, Pulse, On, Off, Change
    let expected: [(StateId, [Class; 5]); StateId::COUNT] = [
        (Uninitialized, [M, I, I, I, I]),
        (Initializing, [I, I, I, I, I]),
        (SolidOff, [I, M, M, I, I]),
        (SolidOn, [I, M, I, M, I]),
        (PulseSetup, [V, V, V, V, I]),
        (RepInit, [V, V, V, V, I]),
        (PulseOnPhase, [I, M, M, M, M]),
        (PulseOffPhase, [I, M, M, M, M]),
        (RepDelay, [I, M, M, M, M]),
        (RepDecrement, [V, V, V, V, V]),
    ];

    for (state, row) in expected {
        for (kind, class) in EventKind::ALL.into_iter().zip(row) {
            let mut board = if state == Uninitialized {
                SimBoard::uninitialised()
            } else {
                SimBoard::new()
            };
            board.ctl.force_state(state);

            let got = match board.send(sample(kind)) {
                Dispatch::Transitioned { .. } => Class::Moves,
                Dispatch::Ignored => Class::Ignored,
                Dispatch::Violation(e) => {
                    assert_eq!(e, UsageError { state, event: kind });
                    Class::Violation
                }
            };
            assert_eq!(got, class, "{kind:?} in {state:?}");
            if class != Class::Moves {
                assert_eq!(board.ctl.state(), state, "{kind:?} in {state:?} moved");
            }
        }
    }
}

// ── Solid output ──────────────────────────────────────────────

#[test]
fn solid_on_is_idempotent_and_never_arms_the_timer() {
    let mut board = SimBoard::new();
    board.send(Event::On);
    assert_eq!(board.send(Event::On), Dispatch::Ignored);
    assert_eq!(board.ctl.state(), StateId::SolidOn);
    assert_eq!(board.port().outputs(), [(0, true)]);
    assert!(board.port().timer_periods().is_empty());

    board.send(Event::Off);
    assert_eq!(board.send(Event::Off), Dispatch::Ignored);
    assert_eq!(board.port().outputs(), [(0, true), (0, false)]);
    assert!(board.port().timer_periods().is_empty());
}

// ── Pattern timing ────────────────────────────────────────────

#[test]
fn three_reps_without_delay_restart_immediately() {
    let mut board = SimBoard::new();
    board.send(Event::Pulse(PulseSpec::new(3, 50, 100, 0)));
    board.run_until(550);

    assert_eq!(
        board.port().outputs(),
        [
            (0, true),
            (50, false),
            (150, true),
            (200, false),
            (300, true),
            (350, false),
            (450, true),
            (500, false),
        ]
    );
    // Never a zero-length or delay phase in between.
    assert!(board.port().timer_periods().iter().all(|&p| p == 50 || p == 100));
}

#[test]
fn heartbeat_inserts_one_delay_per_cycle() {
    let mut board = SimBoard::new();
    board.send(Event::Pulse(PulseSpec::new(2, 50, 350, 600)));
    board.run_until(1500);

    assert_eq!(
        board.port().outputs(),
        [(0, true), (50, false), (400, true), (450, false), (1400, true), (1450, false)]
    );
    assert_eq!(
        board.port().timer_periods(),
        [50, 350, 50, 350, 600, 50, 350]
    );
    assert!(
        board
            .port()
            .calls
            .contains(&PortCall::Timer { at_ms: 800, period_ms: 600 })
    );
}

#[test]
fn zero_reps_behaves_like_one() {
    let mut zero = SimBoard::new();
    let mut one = SimBoard::new();
    zero.send(Event::Pulse(PulseSpec::new(0, 20, 480, 999)));
    one.send(Event::Pulse(PulseSpec::new(1, 20, 480, 999)));
    zero.run_until(3000);
    one.run_until(3000);

    assert_eq!(zero.port().calls, one.port().calls);
    assert!(!zero.port().timer_periods().contains(&999));
    assert_eq!(zero.ctl.runtime().pulse, PulseSpec::single(20, 480));
}

#[test]
fn slow_blink_period_is_one_second() {
    let mut board = SimBoard::new();
    board.send(Event::Pulse(PulseSpec::single(20, 980)));
    board.run_until(3000);
    let ons: Vec<u64> = board
        .port()
        .outputs()
        .into_iter()
        .filter(|&(_, on)| on)
        .map(|(t, _)| t)
        .collect();
    assert_eq!(ons, [0, 1000, 2000, 3000]);
}

// ── Change absorption ─────────────────────────────────────────

#[test]
fn change_is_absorbed_outside_timed_states() {
    for state in [
        StateId::Uninitialized,
        StateId::Initializing,
        StateId::SolidOff,
        StateId::SolidOn,
        StateId::PulseSetup,
        StateId::RepInit,
    ] {
        let mut board = SimBoard::new();
        board.ctl.force_state(state);
        assert_eq!(board.send(Event::Change), Dispatch::Ignored, "{state:?}");
        assert_eq!(board.ctl.state(), state);
        assert!(board.port().calls.is_empty());
    }
}

#[test]
fn stale_expiry_after_switching_to_solid_is_ignored() {
    let mut board = SimBoard::new();
    board.send(Event::Pulse(PulseSpec::single(20, 480)));
    board.send(Event::On);
    assert_eq!(board.ctl.state(), StateId::SolidOn);

    // The on-phase timer is still pending and fires into SolidOn.
    assert_eq!(board.expire(), Some(Dispatch::Ignored));
    assert_eq!(board.ctl.state(), StateId::SolidOn);
    assert_eq!(board.port().outputs().last(), Some(&(0, true)));
}

#[test]
fn new_pattern_preempts_running_one() {
    let mut board = SimBoard::new();
    board.send(Event::Pulse(PulseSpec::new(2, 50, 350, 600)));
    board.run_until(60);
    assert_eq!(board.ctl.state(), StateId::PulseOffPhase);

    board.send(Event::Pulse(PulseSpec::single(20, 480)));
    assert_eq!(board.ctl.state(), StateId::PulseOnPhase);
    assert_eq!(board.ctl.runtime().pulse, PulseSpec::single(20, 480));
    assert_eq!(board.ctl.runtime().remaining_reps, 1);
    assert_eq!(board.port().armed, Some(20));
}

// ── Re-initialisation ─────────────────────────────────────────

#[test]
fn reinit_mid_pattern_is_a_violation_that_keeps_the_pattern() {
    for state in [StateId::RepInit, StateId::RepDecrement] {
        let mut board = SimBoard::new();
        board.send(Event::Pulse(PulseSpec::new(3, 50, 100, 0)));
        board.ctl.force_state(state);
        let reps_before = board.ctl.runtime().remaining_reps;

        let d = board.send(init_event());
        assert!(matches!(d, Dispatch::Violation(_)), "{state:?}");
        assert_eq!(board.ctl.state(), state);
        assert_eq!(board.ctl.runtime().remaining_reps, reps_before);
        assert_eq!(board.ctl.runtime().pulse, PulseSpec::new(3, 50, 100, 0));
        assert_eq!(board.ctl.stats().violations, 1);
    }
}

#[test]
fn reinit_in_settled_states_is_ignored() {
    let mut board = SimBoard::new();
    board.send(Event::Pulse(PulseSpec::single(20, 480)));
    assert_eq!(board.send(init_event()), Dispatch::Ignored);
    assert_eq!(board.ctl.state(), StateId::PulseOnPhase);
}

// ── Resource failures ─────────────────────────────────────────

#[test]
fn failed_timer_restart_leaves_indicator_waiting() {
    let mut board = SimBoard::new();
    board.ctl.port_mut().fail_timer = true;
    board.send(Event::Pulse(PulseSpec::single(20, 480)));

    assert_eq!(board.ctl.state(), StateId::PulseOnPhase);
    assert_eq!(board.ctl.stats().timer_failures, 1);
    assert_eq!(board.expire(), None);

    // Still controllable.
    board.send(Event::Off);
    assert_eq!(board.ctl.state(), StateId::SolidOff);
}

#[test]
fn stats_count_every_outcome() {
    let mut board = SimBoard::new();
    board.send(Event::Off);
    board.send(Event::Pulse(PulseSpec::single(20, 480)));
    board.ctl.force_state(StateId::RepInit);
    board.send(Event::On);

    let stats = board.ctl.stats();
    // Init: Initializing + SolidOff; Pulse: PulseSetup + RepInit + PulseOnPhase.
    assert_eq!(stats.transitions, 5);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.violations, 1);
}
