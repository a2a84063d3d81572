//! Explicit `(state, event) → outcome` transition table.
//!
//! Rules are written event by event, each naming the set of states it
//! covers.  [`TransitionTable::build`] compiles them into a dense grid and
//! rejects the rule set unless every cell is covered exactly once, so the
//! table is checked at start-up instead of trusting declaration order.
//!
//! ```text
//!  Event  │ Uninit  Initz  SOff   SOn    Setup  RInit  POn    POff   RDly   RDec
//! ────────┼───────────────────────────────────────────────────────────────────────
//!  Init   │ Initz   —      —      —      V      V      —      —      —      V
//!  Pulse  │ —       —      Setup  Setup  V      V      Setup  Setup  Setup  V
//!  On     │ —       —      SOn    —      V      V      SOn    SOn    SOn    V
//!  Off    │ —       —      —      SOff   V      V      SOff   SOff   SOff   V
//!  Change │ —       —      —      —      —      —      POff   RDec   RInit  V
//! ```

use crate::error::{Result, TableError};
use crate::events::EventKind;

use super::StateId;
use super::StateId::{
    Initializing, PulseOffPhase, PulseOnPhase, PulseSetup, RepDecrement, RepDelay, RepInit,
    SolidOff, SolidOn, Uninitialized,
};

/// Result of looking up an external event in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Next(StateId),
    Ignored,
    Violation,
}

/// One line of the rule set: `event` in any of `from` yields `outcome`.
pub struct Rule {
    pub event: EventKind,
    pub from: &'static [StateId],
    pub outcome: Outcome,
}

const fn rule(event: EventKind, from: &'static [StateId], outcome: Outcome) -> Rule {
    Rule {
        event,
        from,
        outcome,
    }
}

/// The indicator protocol.
pub const RULES: &[Rule] = &[
    // ── Init ──────────────────────────────────────────────────
    rule(EventKind::Init, &[Uninitialized], Outcome::Next(Initializing)),
    rule(
        EventKind::Init,
        &[Initializing, SolidOff, SolidOn, PulseOnPhase, PulseOffPhase, RepDelay],
        Outcome::Ignored,
    ),
    rule(EventKind::Init, &[PulseSetup, RepInit, RepDecrement], Outcome::Violation),
    // ── Pulse ─────────────────────────────────────────────────
    rule(EventKind::Pulse, &[Uninitialized, Initializing], Outcome::Ignored),
    rule(
        EventKind::Pulse,
        &[SolidOff, SolidOn, PulseOnPhase, PulseOffPhase, RepDelay],
        Outcome::Next(PulseSetup),
    ),
    rule(EventKind::Pulse, &[PulseSetup, RepInit, RepDecrement], Outcome::Violation),
    // ── On ────────────────────────────────────────────────────
    rule(EventKind::On, &[Uninitialized, Initializing, SolidOn], Outcome::Ignored),
    rule(
        EventKind::On,
        &[SolidOff, PulseOnPhase, PulseOffPhase, RepDelay],
        Outcome::Next(SolidOn),
    ),
    rule(EventKind::On, &[PulseSetup, RepInit, RepDecrement], Outcome::Violation),
    // ── Off ───────────────────────────────────────────────────
    rule(EventKind::Off, &[Uninitialized, Initializing, SolidOff], Outcome::Ignored),
    rule(
        EventKind::Off,
        &[SolidOn, PulseOnPhase, PulseOffPhase, RepDelay],
        Outcome::Next(SolidOff),
    ),
    rule(EventKind::Off, &[PulseSetup, RepInit, RepDecrement], Outcome::Violation),
    // ── Change (timer expiry) ─────────────────────────────────
    rule(
        EventKind::Change,
        &[Uninitialized, Initializing, SolidOff, SolidOn, PulseSetup, RepInit],
        Outcome::Ignored,
    ),
    rule(EventKind::Change, &[PulseOnPhase], Outcome::Next(PulseOffPhase)),
    rule(EventKind::Change, &[PulseOffPhase], Outcome::Next(RepDecrement)),
    rule(EventKind::Change, &[RepDelay], Outcome::Next(RepInit)),
    rule(EventKind::Change, &[RepDecrement], Outcome::Violation),
];

/// Dense, validated lookup grid.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    cells: [[Outcome; EventKind::COUNT]; StateId::COUNT],
}

impl TransitionTable {
    /// Compile and validate the indicator protocol.
    pub fn standard() -> Result<Self> {
        Self::build(RULES)
    }

    /// Compile `rules` into a grid, checking that every cell is covered
    /// exactly once and that nothing targets the `Uninitialized` placeholder.
    pub fn build(rules: &[Rule]) -> Result<Self> {
        let mut grid: [[Option<Outcome>; EventKind::COUNT]; StateId::COUNT] =
            [[None; EventKind::COUNT]; StateId::COUNT];

        for r in rules {
            for &state in r.from {
                if r.outcome == Outcome::Next(Uninitialized) {
                    return Err(TableError::EntersPlaceholder {
                        state,
                        event: r.event,
                    }
                    .into());
                }
                let cell = &mut grid[state as usize][r.event as usize];
                if cell.is_some() {
                    return Err(TableError::DuplicateCell {
                        state,
                        event: r.event,
                    }
                    .into());
                }
                *cell = Some(r.outcome);
            }
        }

        let mut cells = [[Outcome::Ignored; EventKind::COUNT]; StateId::COUNT];
        for state in StateId::ALL {
            for event in EventKind::ALL {
                cells[state as usize][event as usize] = grid[state as usize][event as usize]
                    .ok_or(TableError::MissingCell { state, event })?;
            }
        }
        Ok(Self { cells })
    }

    pub fn lookup(&self, state: StateId, event: EventKind) -> Outcome {
        self.cells[state as usize][event as usize]
    }
}
