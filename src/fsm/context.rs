//! Per-indicator mutable state threaded through every entry action.
//!
//! `ActuatorRuntime` is owned by exactly one execution context, the
//! indicator's own task.  Entry actions never touch hardware: they push
//! [`Command`]s, and the controller applies them through its port once
//! the dispatch has settled.

use core::fmt;

use heapless::Vec;

use crate::events::{ActuatorId, Identity, PulseSpec};

/// Upper bound on commands produced by one dispatch (two per entered state).
pub const MAX_COMMANDS: usize = 2 * super::MAX_CHAIN;

// ---------------------------------------------------------------------------
// Commands (written by entry actions; applied by the controller)
// ---------------------------------------------------------------------------

/// Which waiting phase armed the delay timer.  Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    OnPulse,
    OffPulse,
    Delay,
}

impl TimerPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnPulse => "on pulse",
            Self::OffPulse => "off pulse",
            Self::Delay => "delay",
        }
    }
}

/// A side effect requested by an entry action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drive the physical output.
    SetOutput(bool),
    /// Reprogram and restart the delay timer.
    ArmTimer { phase: TimerPhase, period_ms: u16 },
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Running counters, written only by the owning task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorStats {
    /// States entered, including chained ones.
    pub transitions: u32,
    pub ignored: u32,
    pub violations: u32,
    pub timer_failures: u32,
}

// ---------------------------------------------------------------------------
// ActuatorRuntime
// ---------------------------------------------------------------------------

pub struct ActuatorRuntime {
    /// Set once by `Initializing`, then fixed.
    pub identity: Option<Identity>,
    /// Current (normalised) pulse pattern.
    pub pulse: PulseSpec,
    /// On/off cycles left before the delay or restart.
    pub remaining_reps: u8,
    pub stats: ActuatorStats,
    commands: Vec<Command, MAX_COMMANDS>,
}

impl Default for ActuatorRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorRuntime {
    pub fn new() -> Self {
        Self {
            identity: None,
            pulse: PulseSpec::default(),
            remaining_reps: 0,
            stats: ActuatorStats::default(),
            commands: Vec::new(),
        }
    }

    /// Log prefix: the indicator name once known.
    pub fn label(&self) -> Label {
        Label(self.identity.map(|identity| identity.id))
    }

    pub fn set_output(&mut self, on: bool) {
        self.push(Command::SetOutput(on));
    }

    pub fn arm_timer(&mut self, phase: TimerPhase, period_ms: u16) {
        self.push(Command::ArmTimer { phase, period_ms });
    }

    /// Drain the commands produced since the last call.
    pub fn take_commands(&mut self) -> Vec<Command, MAX_COMMANDS> {
        core::mem::take(&mut self.commands)
    }

    fn push(&mut self, command: Command) {
        if self.commands.push(command).is_err() {
            // Bounded by MAX_CHAIN; reaching this means a chain bug upstream.
            log::error!("{}: command buffer full, dropping {:?}", self.label(), command);
        }
    }
}

/// Display helper for log prefixes.
#[derive(Debug, Clone, Copy)]
pub struct Label(Option<ActuatorId>);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "LED?"),
        }
    }
}
