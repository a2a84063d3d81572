//! Inbound indicator commands.
//!
//! These represent requests from the outside world (application code,
//! start-up configuration, bench tooling) that the
//! [`IndicatorService`](super::service::IndicatorService) turns into
//! mailbox events.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::events::{Event, PulseSpec};

/// Named patterns used across the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Off,
    On,
    /// Short blip once a second.
    Slow,
    /// Short blip twice a second.
    Fast,
    /// Double blink, then a pause.
    Heartbeat,
}

impl Preset {
    pub const fn command(self) -> IndicatorCommand {
        match self {
            Self::Off => IndicatorCommand::Off,
            Self::On => IndicatorCommand::On,
            Self::Slow => IndicatorCommand::Pulse {
                on_ms: 20,
                off_ms: 980,
            },
            Self::Fast => IndicatorCommand::Pulse {
                on_ms: 20,
                off_ms: 480,
            },
            Self::Heartbeat => IndicatorCommand::Pattern {
                reps: 2,
                on_ms: 50,
                off_ms: 350,
                delay_ms: 600,
            },
        }
    }
}

/// A request for one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum IndicatorCommand {
    Off,
    On,
    Pulse {
        on_ms: u16,
        off_ms: u16,
    },
    Pattern {
        reps: u8,
        on_ms: u16,
        off_ms: u16,
        delay_ms: u16,
    },
    Preset {
        preset: Preset,
    },
}

impl IndicatorCommand {
    /// The mailbox event carrying this request.
    pub const fn to_event(self) -> Event {
        match self {
            Self::Off => Event::Off,
            Self::On => Event::On,
            Self::Pulse { on_ms, off_ms } => Event::Pulse(PulseSpec::single(on_ms, off_ms)),
            Self::Pattern {
                reps,
                on_ms,
                off_ms,
                delay_ms,
            } => Event::Pulse(PulseSpec::new(reps, on_ms, off_ms, delay_ms)),
            Self::Preset { preset } => preset.command().to_event(),
        }
    }

    /// Reject timed commands whose every phase is zero length; they would
    /// keep the indicator and its timer spinning.
    pub fn validate(&self) -> Result<()> {
        if let Event::Pulse(spec) = self.to_event() {
            let spec = spec.normalized();
            if spec.on_ms == 0 && spec.off_ms == 0 && spec.delay_ms == 0 {
                return Err(Error::Config("pulse with all phases zero"));
            }
        }
        Ok(())
    }
}
