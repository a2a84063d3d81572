//! BlinkFSM firmware entry point (ESP-IDF).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  main task:  logger → config → IndicatorService::start       │
//! │              → init_all → start-up patterns → park           │
//! │                                                              │
//! │  LED1 task   LED2 task   LED3 task   LED4 task   timer task  │
//! │  (mailbox)   (mailbox)   (mailbox)   (mailbox)   (executor)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};
use log::{error, info};

use blinkfsm::Error;
use blinkfsm::app::service::IndicatorService;
use blinkfsm::config::SystemConfig;
use blinkfsm::drivers::output::PinOutput;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let profile = if cfg!(debug_assertions) { "debug" } else { "release" };
    info!("BlinkFSM v{} ({})", env!("CARGO_PKG_VERSION"), profile);

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;

    // ── 3. Indicator tasks + delay timers ─────────────────────
    let service = IndicatorService::start(&config, |id, ind| {
        // SAFETY: a validated config assigns each GPIO once, so no other
        // driver in the firmware owns this pin.
        let pin = unsafe { AnyOutputPin::new(ind.gpio) };
        let driver = PinDriver::output(pin).map_err(|e| {
            error!("{}: GPIO{} output init failed: {}", id, ind.gpio, e);
            Error::Init("gpio output")
        })?;
        Ok(PinOutput::new(driver, ind.active_low))
    })?;

    // ── 4. Initial patterns ───────────────────────────────────
    service.init_all();
    service.apply_startup(&config);
    for id in service.ids() {
        info!("{} ready as '{}'", id, service.name(id).unwrap_or("?"));
    }

    // Everything from here on runs in the indicator and timer tasks.
    loop {
        std::thread::park();
    }
}
