//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern, driven by events instead of ticks:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  TransitionTable  (state × event → Next | Ignored | Violation)│
//! ├──────────────────────────────────────────────────────────────┤
//! │  StateTable                                                  │
//! │  ┌───────────────┬──────────────────────────────────────┐    │
//! │  │ StateId       │ on_enter(rt, payload) -> Step        │    │
//! │  ├───────────────┼──────────────────────────────────────┤    │
//! │  │ Initializing  │ record identity   → Chain(SolidOff)  │    │
//! │  │ PulseOnPhase  │ on + arm timer    → Settled          │    │
//! │  │ RepDecrement  │ count down        → Chain(..)        │    │
//! │  │ ...           │                                      │    │
//! │  └───────────────┴──────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! An external event is looked up in the [`TransitionTable`].  A `Next`
//! outcome enters the target state by calling its `on_enter`.  If that
//! returns [`Step::Chain`], the engine enters the named state right away,
//! within the same dispatch, and keeps going until a handler returns
//! [`Step::Settled`].  Chains are capped at [`MAX_CHAIN`] entries.
//!
//! A chain names a *state*, never an event, so an entry action cannot
//! synthesise the timer `Change` event.  Waiting states arm the delay
//! timer and settle; only timer expiry moves them on.

pub mod context;
pub mod states;
pub mod table;

use context::ActuatorRuntime;
use log::{debug, trace, warn};

use crate::error::{Result, TableError, UsageError};
use crate::events::{Event, Payload};
use table::{Outcome, TransitionTable};

/// Maximum number of states entered while handling one external event.
pub const MAX_CHAIN: usize = 8;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all indicator states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    /// Placeholder before `Init`; never executes a body.
    Uninitialized = 0,
    Initializing = 1,
    SolidOff = 2,
    SolidOn = 3,
    PulseSetup = 4,
    RepInit = 5,
    PulseOnPhase = 6,
    PulseOffPhase = 7,
    RepDelay = 8,
    RepDecrement = 9,
}

impl StateId {
    /// Total number of states; sizes the table arrays.
    pub const COUNT: usize = 10;

    pub const ALL: [StateId; Self::COUNT] = [
        StateId::Uninitialized,
        StateId::Initializing,
        StateId::SolidOff,
        StateId::SolidOn,
        StateId::PulseSetup,
        StateId::RepInit,
        StateId::PulseOnPhase,
        StateId::PulseOffPhase,
        StateId::RepDelay,
        StateId::RepDecrement,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initializing => "Initializing",
            Self::SolidOff => "SolidOff",
            Self::SolidOn => "SolidOn",
            Self::PulseSetup => "PulseSetup",
            Self::RepInit => "RepInit",
            Self::PulseOnPhase => "PulseOnPhase",
            Self::PulseOffPhase => "PulseOffPhase",
            Self::RepDelay => "RepDelay",
            Self::RepDecrement => "RepDecrement",
        }
    }

    /// States that end their step waiting for a timer expiry.
    pub const fn is_timed(self) -> bool {
        matches!(
            self,
            Self::PulseOnPhase | Self::PulseOffPhase | Self::RepDelay
        )
    }
}

// ---------------------------------------------------------------------------
// Handler signature
// ---------------------------------------------------------------------------

/// What an entry action wants the engine to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Stay in the state just entered and wait for the next external event.
    Settled,
    /// Enter another state immediately, without going through the mailbox.
    Chain(StateId),
}

/// Signature for a state's entry action.
pub type StateEnterFn = fn(&mut ActuatorRuntime, Payload) -> Step;

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array, indexed by `StateId`.
pub struct StateDescriptor {
    pub id: StateId,
    pub on_enter: StateEnterFn,
}

// ---------------------------------------------------------------------------
// Dispatch result
// ---------------------------------------------------------------------------

/// How an external event was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The event moved the machine; `to` is the state it settled in.
    Transitioned { from: StateId, to: StateId },
    /// Valid but not applicable right now; discarded.
    Ignored,
    /// Protocol violation; reported and discarded.
    Violation(UsageError),
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The event-driven finite state machine engine.
///
/// Owns the state table and the transition table.  The mutable
/// [`ActuatorRuntime`] lives outside so the controller can drain the
/// commands it accumulates.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    states: [StateDescriptor; StateId::COUNT],
    table: TransitionTable,
    current: StateId,
}

impl Fsm {
    /// Construct an FSM in `Uninitialized`.  Rejects a state table whose
    /// descriptors are not at their own index.
    pub fn new(states: [StateDescriptor; StateId::COUNT], table: TransitionTable) -> Result<Self> {
        for (index, descriptor) in states.iter().enumerate() {
            if descriptor.id as usize != index {
                return Err(TableError::DescriptorOrder {
                    index,
                    state: descriptor.id,
                }
                .into());
            }
        }
        Ok(Self {
            states,
            table,
            current: StateId::Uninitialized,
        })
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Deliver one external event.
    ///
    /// Runs every chained internal transition before returning.
    pub fn dispatch(&mut self, rt: &mut ActuatorRuntime, event: Event) -> Dispatch {
        let kind = event.kind();
        match self.table.lookup(self.current, kind) {
            Outcome::Ignored => {
                debug!(
                    "{}: {:?} ignored in {}",
                    rt.label(),
                    kind,
                    self.current.name()
                );
                rt.stats.ignored = rt.stats.ignored.wrapping_add(1);
                Dispatch::Ignored
            }
            Outcome::Violation => {
                let err = UsageError {
                    state: self.current,
                    event: kind,
                };
                warn!("{}: {}", rt.label(), err);
                rt.stats.violations = rt.stats.violations.wrapping_add(1);
                Dispatch::Violation(err)
            }
            Outcome::Next(next) => {
                let from = self.current;
                self.run_chain(rt, next, event.payload());
                Dispatch::Transitioned {
                    from,
                    to: self.current,
                }
            }
        }
    }

    /// Jump to `state` without running any entry action.
    ///
    /// Diagnostic hook for bench tooling and tests; normal operation only
    /// moves through [`dispatch`](Self::dispatch).
    pub fn force_state(&mut self, state: StateId) {
        debug!("FSM forced: {} -> {}", self.current.name(), state.name());
        self.current = state;
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Trampoline over chained entry actions.
    fn run_chain(&mut self, rt: &mut ActuatorRuntime, first: StateId, payload: Payload) {
        let mut next = first;
        let mut payload = payload;
        for _ in 0..MAX_CHAIN {
            trace!(
                "{}: {} -> {}",
                rt.label(),
                self.current.name(),
                next.name()
            );
            self.current = next;
            rt.stats.transitions = rt.stats.transitions.wrapping_add(1);

            match (self.states[next as usize].on_enter)(rt, payload) {
                Step::Settled => return,
                Step::Chain(successor) => {
                    next = successor;
                    payload = Payload::None;
                }
            }
        }
        panic!(
            "{}: internal transition chain exceeded {} states (stopped in {})",
            rt.label(),
            MAX_CHAIN,
            self.current.name()
        );
    }
}
