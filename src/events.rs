//! Events delivered to an indicator state machine.
//!
//! Events are produced by:
//! - Application code and interrupt sources (via the control plane)
//! - Delay timer expiry (the `Change` bridge event)
//!
//! Events are consumed by the owning indicator's execution context, one
//! at a time, in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ Application │────▶│              │     │                  │
//! │ GPIO ISR    │────▶│   Mailbox    │────▶│  Indicator task  │
//! │ Timer expiry│────▶│  (bounded)   │     │  (single reader) │
//! └─────────────┘     └──────────────┘     └──────────────────┘
//! ```
//!
//! Every event is `Copy` and small enough to pass by value through the
//! mailbox, so nothing is allocated when crossing context boundaries.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Stable index of an indicator in the service arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActuatorId(pub u8);

impl ActuatorId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActuatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Matches the silkscreen numbering (LED1..LEDn).
        write!(f, "LED{}", self.0 as u16 + 1)
    }
}

/// Handle of the one-shot delay timer owned by an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerRef(pub u8);

impl TimerRef {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Immutable identity recorded by the `Initializing` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: ActuatorId,
    pub timer: TimerRef,
}

/// On/off timing of a pulse pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PulseSpec {
    /// Number of on/off cycles before the optional delay.
    pub reps: u8,
    /// Time the output is on in each cycle (ms).
    pub on_ms: u16,
    /// Time the output is off in each cycle (ms).
    pub off_ms: u16,
    /// Pause between pattern repetitions (ms).  Ignored for single pulses.
    pub delay_ms: u16,
}

impl PulseSpec {
    pub const fn new(reps: u8, on_ms: u16, off_ms: u16, delay_ms: u16) -> Self {
        Self {
            reps,
            on_ms,
            off_ms,
            delay_ms,
        }
    }

    /// A single repeating on/off pulse with no inter-pattern delay.
    pub const fn single(on_ms: u16, off_ms: u16) -> Self {
        Self::new(1, on_ms, off_ms, 0)
    }

    /// `true` if this spec describes more than one on/off cycle.
    pub const fn is_pattern(&self) -> bool {
        self.reps > 1
    }

    /// Collapse `reps <= 1` to a single pulse with no delay.
    pub const fn normalized(self) -> Self {
        if self.is_pattern() {
            self
        } else {
            Self::single(self.on_ms, self.off_ms)
        }
    }
}

/// Payload-free event discriminant used for transition-table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    Init = 0,
    Pulse = 1,
    On = 2,
    Off = 3,
    /// Timer bridge event.  Only ever produced by delay timer expiry.
    Change = 4,
}

impl EventKind {
    pub const COUNT: usize = 5;

    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::Init,
        EventKind::Pulse,
        EventKind::On,
        EventKind::Off,
        EventKind::Change,
    ];
}

/// An event as posted to a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Init(Identity),
    Pulse(PulseSpec),
    On,
    Off,
    Change,
}

impl Event {
    pub const fn kind(&self) -> EventKind {
        match self {
            Event::Init(_) => EventKind::Init,
            Event::Pulse(_) => EventKind::Pulse,
            Event::On => EventKind::On,
            Event::Off => EventKind::Off,
            Event::Change => EventKind::Change,
        }
    }

    /// The data handed to the entry action of the state this event leads to.
    pub const fn payload(&self) -> Payload {
        match *self {
            Event::Init(identity) => Payload::Init(identity),
            Event::Pulse(spec) => Payload::Pulse(spec),
            Event::On | Event::Off | Event::Change => Payload::None,
        }
    }
}

/// Data passed to a state's entry action.
///
/// Internal (chained) transitions always carry [`Payload::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    None,
    Init(Identity),
    Pulse(PulseSpec),
}
