//! Port traits: the boundary between the indicator logic and hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (output pins, delay timers) implement these traits.  The
//! [`Controller`](super::controller::Controller) consumes them via generics,
//! so the state machine never touches hardware directly.

use crate::error::ResourceError;
use crate::events::{ActuatorId, TimerRef};

// ───────────────────────────────────────────────────────────────
// Output driver (external collaborator)
// ───────────────────────────────────────────────────────────────

/// Physical on/off primitive for one indicator.
///
/// Must be idempotent.  Has no return value: a driver that can fail
/// reports the failure itself.
pub trait OutputDriver {
    fn set_output(&mut self, id: ActuatorId, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Everything a controller needs from the outside world.
pub trait ActuatorPort {
    /// Drive the indicator output.
    fn set_output(&mut self, id: ActuatorId, on: bool);

    /// Reprogram and restart the indicator's one-shot delay timer.  Any
    /// pending expiry is superseded.
    fn restart_timer(&mut self, timer: TimerRef, period_ms: u16) -> Result<(), ResourceError>;
}
