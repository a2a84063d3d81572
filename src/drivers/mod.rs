//! Indicator output pins, delay timers and task spawning.

pub mod delay_timer;
pub mod output;
pub mod task_pin;
