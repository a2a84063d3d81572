//! Concrete state entry actions and table builder.
//!
//! Each state is a single plain `fn` pointer with no captured data and no
//! heap.
//!
//! ```text
//!  Uninitialized ──Init──▶ Initializing ─ ─ ▶ SolidOff ◀──Off──▶ SolidOn
//!                                                │ Pulse           │ Pulse
//!                                                ▼                 ▼
//!                         ┌──────────────▶ PulseSetup ─ ─ ▶ RepInit ◀─ ─ ─ ─ ─ ─ ─┐
//!                         │                                    ╎                  │
//!                         │                                    ▼                  │
//!                         │         ┌ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─▶ PulseOnPhase           │
//!                         │         ╎                          │ Change           │
//!                         │         ╎                          ▼                  │
//!                         │         ╎                    PulseOffPhase            │
//!                         │         ╎                          │ Change           │
//!                         │         ╎   reps left              ▼          delay=0 ╎
//!                         │         └ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ RepDecrement ─ ─ ─ ─ ─ ─┘
//!                         │                                    ╎ delay>0          │
//!                         │                                    ▼                  │ Change
//!                         └──────────── Pulse ──────────── RepDelay ──────────────┘
//!
//!  ── external event (mailbox)     ─ ─ chained internally, same step
//! ```

use log::{debug, info};

use super::context::{ActuatorRuntime, TimerPhase};
use super::{StateDescriptor, StateId, Step};
use crate::events::Payload;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once per indicator at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Uninitialized,
            on_enter: uninitialized_enter,
        },
        StateDescriptor {
            id: StateId::Initializing,
            on_enter: initializing_enter,
        },
        StateDescriptor {
            id: StateId::SolidOff,
            on_enter: solid_off_enter,
        },
        StateDescriptor {
            id: StateId::SolidOn,
            on_enter: solid_on_enter,
        },
        StateDescriptor {
            id: StateId::PulseSetup,
            on_enter: pulse_setup_enter,
        },
        StateDescriptor {
            id: StateId::RepInit,
            on_enter: rep_init_enter,
        },
        StateDescriptor {
            id: StateId::PulseOnPhase,
            on_enter: pulse_on_enter,
        },
        StateDescriptor {
            id: StateId::PulseOffPhase,
            on_enter: pulse_off_enter,
        },
        StateDescriptor {
            id: StateId::RepDelay,
            on_enter: rep_delay_enter,
        },
        StateDescriptor {
            id: StateId::RepDecrement,
            on_enter: rep_decrement_enter,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Lifecycle
// ═══════════════════════════════════════════════════════════════════════════

/// The table never targets this state; it only exists to be left.
fn uninitialized_enter(_rt: &mut ActuatorRuntime, _payload: Payload) -> Step {
    Step::Settled
}

fn initializing_enter(rt: &mut ActuatorRuntime, payload: Payload) -> Step {
    let Payload::Init(identity) = payload else {
        panic!("Initializing entered without an identity payload: {payload:?}");
    };
    rt.identity = Some(identity);
    info!("{}: initialised (timer {})", identity.id, identity.timer.0);
    Step::Chain(StateId::SolidOff)
}

// ═══════════════════════════════════════════════════════════════════════════
//  Solid output
// ═══════════════════════════════════════════════════════════════════════════

fn solid_off_enter(rt: &mut ActuatorRuntime, _payload: Payload) -> Step {
    debug!("{}: off", rt.label());
    rt.set_output(false);
    Step::Settled
}

fn solid_on_enter(rt: &mut ActuatorRuntime, _payload: Payload) -> Step {
    debug!("{}: on", rt.label());
    rt.set_output(true);
    Step::Settled
}

// ═══════════════════════════════════════════════════════════════════════════
//  Pulse pattern
// ═══════════════════════════════════════════════════════════════════════════

fn pulse_setup_enter(rt: &mut ActuatorRuntime, payload: Payload) -> Step {
    let Payload::Pulse(spec) = payload else {
        panic!("PulseSetup entered without a pulse payload: {payload:?}");
    };
    rt.pulse = spec.normalized();

    let p = rt.pulse;
    if p.is_pattern() {
        debug!(
            "{}: pattern: {} ms on, {} ms off repeated {} times, delay {} ms",
            rt.label(),
            p.on_ms,
            p.off_ms,
            p.reps,
            p.delay_ms
        );
    } else {
        debug!("{}: pulse: {} ms on, {} ms off", rt.label(), p.on_ms, p.off_ms);
    }
    Step::Chain(StateId::RepInit)
}

fn rep_init_enter(rt: &mut ActuatorRuntime, _payload: Payload) -> Step {
    rt.remaining_reps = rt.pulse.reps;
    Step::Chain(StateId::PulseOnPhase)
}

fn pulse_on_enter(rt: &mut ActuatorRuntime, _payload: Payload) -> Step {
    rt.set_output(true);
    rt.arm_timer(TimerPhase::OnPulse, rt.pulse.on_ms);
    Step::Settled
}

fn pulse_off_enter(rt: &mut ActuatorRuntime, _payload: Payload) -> Step {
    rt.set_output(false);
    rt.arm_timer(TimerPhase::OffPulse, rt.pulse.off_ms);
    Step::Settled
}

/// Output stays off (it was switched off by the preceding off phase).
fn rep_delay_enter(rt: &mut ActuatorRuntime, _payload: Payload) -> Step {
    rt.arm_timer(TimerPhase::Delay, rt.pulse.delay_ms);
    Step::Settled
}

fn rep_decrement_enter(rt: &mut ActuatorRuntime, _payload: Payload) -> Step {
    rt.remaining_reps = rt.remaining_reps.saturating_sub(1);

    if rt.remaining_reps > 0 {
        Step::Chain(StateId::PulseOnPhase)
    } else if rt.pulse.delay_ms == 0 {
        Step::Chain(StateId::RepInit)
    } else {
        Step::Chain(StateId::RepDelay)
    }
}
