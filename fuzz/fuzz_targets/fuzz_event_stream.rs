//! Fuzz target: `Controller::handle`
//!
//! Decodes arbitrary bytes into a stream of mailbox events (including
//! payloads with any timing values) and asserts that
//! the controller never panics, only ever settles in a resting state, and
//! keeps `remaining_reps` within the stored pattern.
//!
//! cargo fuzz run fuzz_event_stream

#![no_main]

use blinkfsm::app::controller::Controller;
use blinkfsm::app::ports::ActuatorPort;
use blinkfsm::error::ResourceError;
use blinkfsm::events::{ActuatorId, Event, Identity, PulseSpec, TimerRef};
use blinkfsm::fsm::StateId;
use libfuzzer_sys::fuzz_target;

struct NullPort;

impl ActuatorPort for NullPort {
    fn set_output(&mut self, _id: ActuatorId, _on: bool) {}

    fn restart_timer(&mut self, _timer: TimerRef, _period_ms: u16) -> Result<(), ResourceError> {
        Ok(())
    }
}

fn word(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fuzz_target!(|data: &[u8]| {
    let Ok(mut ctl) = Controller::new(NullPort) else {
        return;
    };

    let mut rest = data;
    while let Some((&op, tail)) = rest.split_first() {
        rest = tail;
        let event = match op % 6 {
            0 => Event::Init(Identity {
                id: ActuatorId(op >> 4),
                timer: TimerRef(op >> 4),
            }),
            1 if rest.len() >= 7 => {
                let spec = PulseSpec::new(rest[0], word(&rest[1..]), word(&rest[3..]), word(&rest[5..]));
                rest = &rest[7..];
                Event::Pulse(spec)
            }
            2 => Event::On,
            3 => Event::Off,
            _ => Event::Change,
        };
        ctl.handle(event);

        let state = ctl.state();
        assert!(
            !matches!(
                state,
                StateId::Initializing | StateId::PulseSetup | StateId::RepInit | StateId::RepDecrement
            ),
            "settled in transient state {state:?}"
        );
        let rt = ctl.runtime();
        assert!(rt.remaining_reps <= rt.pulse.reps);
    }
});
