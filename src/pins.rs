//! GPIO assignments for the indicator board.
//!
//! Single source of truth for the default configuration.  Pins can still
//! be overridden per indicator through [`SystemConfig`](crate::config::SystemConfig).

// ---------------------------------------------------------------------------
// Indicator LEDs (discrete, active HIGH through 330 Ω)
// ---------------------------------------------------------------------------

pub const LED1_GPIO: i32 = 4;
pub const LED2_GPIO: i32 = 5;
pub const LED3_GPIO: i32 = 6;
pub const LED4_GPIO: i32 = 7;

/// In silkscreen order.
pub const INDICATOR_GPIOS: [i32; 4] = [LED1_GPIO, LED2_GPIO, LED3_GPIO, LED4_GPIO];

/// Log and task names, matching the silkscreen.
pub const INDICATOR_NAMES: [&str; 4] = ["LED1", "LED2", "LED3", "LED4"];
