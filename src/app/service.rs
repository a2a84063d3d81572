//! Indicator service: the arena of indicators and the control plane.
//!
//! [`IndicatorService`] builds one mailbox, controller task and delay
//! timer per configured indicator, then exposes a non-blocking API that
//! any thread may call.  Every request is turned into a mailbox event and
//! the call returns immediately; failures are logged and counted, never
//! returned.
//!
//! ```text
//!  caller ──▶ ┌──────────────────┐   Event   ┌─────────┐   ┌────────────┐
//!             │ IndicatorService │─────────▶│ Mailbox │──▶│ Controller │──▶ OutputDriver
//!             │  slot per LED    │           └─────────┘   └─────┬──────┘
//!             └──────────────────┘                ▲ Change       │ restart
//!                                                 └── TimerBank ◀┘
//! ```

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use heapless::{String, Vec};
use log::{error, info, warn};

use crate::adapters::hardware::HardwarePort;
use crate::config::{IndicatorConfig, MAX_ACTUATORS, SystemConfig};
use crate::drivers::delay_timer::{ExpiryBridge, TimerBank};
use crate::drivers::task_pin::spawn_task;
use crate::error::{Error, Result};
use crate::events::{ActuatorId, Event, Identity, PulseSpec, TimerRef};
use crate::mailbox::Mailbox;

use super::commands::{IndicatorCommand, Preset};
use super::controller::Controller;
use super::ports::OutputDriver;

struct Slot {
    name: String<8>,
    mailbox: Arc<Mailbox>,
    initialized: AtomicBool,
}

// ───────────────────────────────────────────────────────────────
// IndicatorService
// ───────────────────────────────────────────────────────────────

pub struct IndicatorService {
    slots: Vec<Slot, MAX_ACTUATORS>,
    /// Requests refused at the API boundary (unknown id, not initialised).
    rejected: AtomicU32,
}

impl IndicatorService {
    /// Validate `config`, build one controller per indicator, start the
    /// delay timer service, then spawn the controller tasks.
    ///
    /// `make_driver` builds the output driver for each indicator, in table
    /// order.  No task is spawned unless every driver and controller was
    /// built.  Indicators start `Uninitialized`; call [`init`](Self::init)
    /// or [`init_all`](Self::init_all) next.
    pub fn start<D, F>(config: &SystemConfig, mut make_driver: F) -> Result<Self>
    where
        D: OutputDriver + Send + 'static,
        F: FnMut(ActuatorId, &IndicatorConfig) -> Result<D>,
    {
        config.validate()?;

        let bank = TimerBank::new(config.indicators.len())?;
        let mut slots = Vec::new();
        let mut bridges = Vec::new();
        let mut controllers: Vec<_, MAX_ACTUATORS> = Vec::new();

        // Build every controller before spawning anything; a failure here
        // drops the drivers built so far.
        for (index, ind) in config.indicators.iter().enumerate() {
            let raw = u8::try_from(index).map_err(|_| Error::Config("too many indicators"))?;
            let id = ActuatorId(raw);
            let mailbox = Arc::new(Mailbox::new());

            let driver = make_driver(id, ind)?;
            let controller = Controller::new(HardwarePort::new(driver, bank.handle()))?;

            if controllers.push((controller, mailbox.clone())).is_err()
                || bridges.push(ExpiryBridge::new(id, mailbox.clone())).is_err()
                || slots
                    .push(Slot {
                        name: ind.name.clone(),
                        mailbox,
                        initialized: AtomicBool::new(false),
                    })
                    .is_err()
            {
                return Err(Error::Config("too many indicators"));
            }
        }

        bank.start(bridges, &config.timer_task)?;

        for ((controller, inbox), slot) in controllers.into_iter().zip(slots.iter()) {
            spawn_task(slot.name.as_str(), &config.task, move || controller.run(&inbox))?;
        }

        info!("Indicator service started ({} indicators)", slots.len());

        Ok(Self {
            slots,
            rejected: AtomicU32::new(0),
        })
    }

    // ── Control plane ─────────────────────────────────────────

    /// Give the indicator its identity.  Required once before anything else.
    pub fn init(&self, id: ActuatorId) {
        let Some(slot) = self.slot(id) else { return };
        slot.initialized.store(true, Ordering::Release);
        self.post(
            id,
            Event::Init(Identity {
                id,
                timer: TimerRef(id.0),
            }),
        );
    }

    pub fn init_all(&self) {
        for id in self.ids() {
            self.init(id);
        }
    }

    /// Solid on (`true`) or off.
    pub fn set_solid(&self, id: ActuatorId, on: bool) {
        self.post(id, if on { Event::On } else { Event::Off });
    }

    /// Repeating single pulse: `on_ms` on, `off_ms` off.
    pub fn pulse(&self, id: ActuatorId, on_ms: u16, off_ms: u16) {
        self.pattern(id, 1, on_ms, off_ms, 0);
    }

    /// `reps` pulses, then `delay_ms` off, repeated forever.
    pub fn pattern(&self, id: ActuatorId, reps: u8, on_ms: u16, off_ms: u16, delay_ms: u16) {
        self.post(id, Event::Pulse(PulseSpec::new(reps, on_ms, off_ms, delay_ms)));
    }

    pub fn preset(&self, id: ActuatorId, preset: Preset) {
        self.apply(id, preset.command());
    }

    pub fn apply(&self, id: ActuatorId, command: IndicatorCommand) {
        self.post(id, command.to_event());
    }

    /// Post every configured start-up command.
    pub fn apply_startup(&self, config: &SystemConfig) {
        for (id, ind) in self.ids().zip(config.indicators.iter()) {
            if let Some(command) = ind.startup {
                self.apply(id, command);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn name(&self, id: ActuatorId) -> Option<&str> {
        self.slots.get(id.index()).map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ActuatorId> + use<> {
        (0..self.slots.len() as u8).map(ActuatorId)
    }

    /// Events dropped because the indicator's mailbox was full.
    pub fn dropped_posts(&self, id: ActuatorId) -> u32 {
        self.slots.get(id.index()).map_or(0, |s| s.mailbox.dropped())
    }

    pub fn rejected(&self) -> u32 {
        self.rejected.load(Ordering::Relaxed)
    }

    // ── Internal ──────────────────────────────────────────────

    fn slot(&self, id: ActuatorId) -> Option<&Slot> {
        let slot = self.slots.get(id.index());
        if slot.is_none() {
            error!("{}", Error::UnknownActuator(id.0));
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
        slot
    }

    fn post(&self, id: ActuatorId, event: Event) {
        let Some(slot) = self.slot(id) else { return };

        if !slot.initialized.load(Ordering::Acquire) {
            warn!("{}, dropping {:?}", Error::NotInitialized(id), event);
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return;
        }

        if let Err(e) = slot.mailbox.post(event) {
            error!("{}: {}, dropping {:?}", id, e, event);
        }
    }
}
