//! Indicator output over any embedded-hal 1.0 push-pull pin.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::OutputDriver;
use crate::events::ActuatorId;

/// Drives one indicator pin, optionally inverted for active-low wiring.
pub struct PinOutput<P> {
    pin: P,
    active_low: bool,
    lit: Option<bool>,
}

impl<P: OutputPin> PinOutput<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            lit: None,
        }
    }

    /// Last commanded state; `None` until the first write.
    pub fn is_lit(&self) -> Option<bool> {
        self.lit
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> OutputDriver for PinOutput<P> {
    fn set_output(&mut self, id: ActuatorId, on: bool) {
        let high = on != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match res {
            Ok(()) => self.lit = Some(on),
            Err(e) => warn!("{}: pin write failed: {:?}", id, e),
        }
    }
}
