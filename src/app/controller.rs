//! Per-indicator controller: the FSM plus the port it drives.
//!
//! [`Controller`] owns one indicator's state machine and runtime.  Each
//! external event is dispatched to completion (chained transitions
//! included), then the commands the entry actions produced are applied
//! through the [`ActuatorPort`] in order.
//!
//! ```text
//!  Mailbox ──▶ ┌────────────────────────┐ ──▶ ActuatorPort
//!              │      Controller        │      (output, timer)
//!              │  Fsm · ActuatorRuntime │
//!              └────────────────────────┘
//! ```

use log::{debug, error, warn};

use crate::error::Result;
use crate::events::Event;
use crate::fsm::context::{ActuatorRuntime, ActuatorStats, Command};
use crate::fsm::states::build_state_table;
use crate::fsm::table::TransitionTable;
use crate::fsm::{Dispatch, Fsm, StateId};
use crate::mailbox::Mailbox;

use super::ports::ActuatorPort;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller<P> {
    fsm: Fsm,
    rt: ActuatorRuntime,
    port: P,
}

impl<P: ActuatorPort> Controller<P> {
    /// Build a controller in `Uninitialized`.  Fails only if the built-in
    /// tables do not validate.
    pub fn new(port: P) -> Result<Self> {
        let fsm = Fsm::new(build_state_table(), TransitionTable::standard()?)?;
        Ok(Self {
            fsm,
            rt: ActuatorRuntime::new(),
            port,
        })
    }

    // ── Event handling ────────────────────────────────────────

    /// Process one event to completion and apply its side effects.
    pub fn handle(&mut self, event: Event) -> Dispatch {
        let outcome = self.fsm.dispatch(&mut self.rt, event);
        for command in self.rt.take_commands() {
            self.apply(command);
        }
        outcome
    }

    /// Serve `mailbox` forever.  Runs on the indicator's own task.
    pub fn run(mut self, mailbox: &Mailbox) {
        loop {
            let event = mailbox.receive_blocking();
            self.handle(event);
        }
    }

    /// Diagnostic jump that bypasses entry actions.
    pub fn force_state(&mut self, state: StateId) {
        self.fsm.force_state(state);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn runtime(&self) -> &ActuatorRuntime {
        &self.rt
    }

    pub fn stats(&self) -> ActuatorStats {
        self.rt.stats
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply(&mut self, command: Command) {
        let Some(identity) = self.rt.identity else {
            // Only reachable through force_state before Init.
            error!("LED?: {:?} before init, dropped", command);
            return;
        };

        match command {
            Command::SetOutput(on) => self.port.set_output(identity.id, on),
            Command::ArmTimer { phase, period_ms } => {
                match self.port.restart_timer(identity.timer, period_ms) {
                    Ok(()) => debug!("{}: {} timer {} ms", identity.id, phase.label(), period_ms),
                    Err(e) => {
                        warn!("{}: {} timer restart failed: {}", identity.id, phase.label(), e);
                        self.rt.stats.timer_failures = self.rt.stats.timer_failures.wrapping_add(1);
                    }
                }
            }
        }
    }
}
