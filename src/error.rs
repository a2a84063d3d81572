//! Unified error types for the indicator firmware.
//!
//! A single `Error` enum that every subsystem converts into.  All variants
//! are `Copy` so they can be logged, counted, and returned from start-up
//! paths without allocation.  Runtime conditions inside an indicator task
//! are resolved where they are detected; only start-up and the control
//! plane's internal plumbing ever see an `Error` value.

use core::fmt;

use crate::events::{ActuatorId, EventKind};
use crate::fsm::StateId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An event was delivered in a state where it cannot happen.
    Usage(UsageError),
    /// A bounded resource (mailbox slot, timer) was unavailable.
    Resource(ResourceError),
    /// The transition table failed start-up validation.
    Table(TableError),
    /// A control-plane call named an indicator that does not exist.
    UnknownActuator(u8),
    /// A control-plane call arrived before `init` for that indicator.
    NotInitialized(ActuatorId),
    /// Task or peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(e) => write!(f, "usage: {e}"),
            Self::Resource(e) => write!(f, "resource: {e}"),
            Self::Table(e) => write!(f, "transition table: {e}"),
            Self::UnknownActuator(raw) => write!(f, "unknown indicator index {raw}"),
            Self::NotInitialized(id) => write!(f, "{id} not initialised"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Usage errors (table `Violation` outcomes)
// ---------------------------------------------------------------------------

/// An event arrived in a state where the protocol says it cannot happen.
///
/// Reported and discarded; the indicator keeps running in `state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageError {
    pub state: StateId,
    pub event: EventKind,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} event cannot happen in {}", self.event, self.state.name())
    }
}

impl From<UsageError> for Error {
    fn from(e: UsageError) -> Self {
        Self::Usage(e)
    }
}

// ---------------------------------------------------------------------------
// Resource exhaustion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    /// Mailbox has no free slot; the event was dropped.
    MailboxFull,
    /// The delay timer could not be reprogrammed.
    TimerUnavailable,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MailboxFull => write!(f, "mailbox full"),
            Self::TimerUnavailable => write!(f, "delay timer unavailable"),
        }
    }
}

impl From<ResourceError> for Error {
    fn from(e: ResourceError) -> Self {
        Self::Resource(e)
    }
}

// ---------------------------------------------------------------------------
// Transition table validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// No rule covers this (state, event) cell.
    MissingCell { state: StateId, event: EventKind },
    /// More than one rule covers this cell.
    DuplicateCell { state: StateId, event: EventKind },
    /// A rule targets `Uninitialized`, which is never entered.
    EntersPlaceholder { state: StateId, event: EventKind },
    /// A state descriptor sits at the wrong index.
    DescriptorOrder { index: usize, state: StateId },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCell { state, event } => {
                write!(f, "no outcome for {:?} in {}", event, state.name())
            }
            Self::DuplicateCell { state, event } => {
                write!(f, "duplicate outcome for {:?} in {}", event, state.name())
            }
            Self::EntersPlaceholder { state, event } => write!(
                f,
                "{:?} in {} targets the Uninitialized placeholder",
                event,
                state.name()
            ),
            Self::DescriptorOrder { index, state } => {
                write!(f, "descriptor {} found at index {}", state.name(), index)
            }
        }
    }
}

impl From<TableError> for Error {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
