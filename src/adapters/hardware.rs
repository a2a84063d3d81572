//! Hardware adapter: bridges an output driver and the delay timer service
//! to the [`ActuatorPort`] a controller drives.
//!
//! One instance per indicator, moved into that indicator's task.

use crate::app::ports::{ActuatorPort, OutputDriver};
use crate::drivers::delay_timer::TimerHandle;
use crate::error::ResourceError;
use crate::events::{ActuatorId, TimerRef};

/// Concrete adapter combining an output pin with the shared timer bank.
pub struct HardwarePort<D> {
    driver: D,
    timers: TimerHandle,
}

impl<D: OutputDriver> HardwarePort<D> {
    pub fn new(driver: D, timers: TimerHandle) -> Self {
        Self { driver, timers }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D: OutputDriver> ActuatorPort for HardwarePort<D> {
    fn set_output(&mut self, id: ActuatorId, on: bool) {
        self.driver.set_output(id, on);
    }

    fn restart_timer(&mut self, timer: TimerRef, period_ms: u16) -> Result<(), ResourceError> {
        self.timers.restart(timer, period_ms)
    }
}
