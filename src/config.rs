//! System configuration parameters
//!
//! Indicator table and task parameters.  The defaults describe the stock
//! board; a JSON document can override any part of it.

use heapless::{String, Vec};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::commands::{IndicatorCommand, Preset};
use crate::drivers::task_pin::Core;
use crate::error::{Error, Result};
use crate::pins;

/// Indicators a single service can drive.
pub const MAX_ACTUATORS: usize = 4;

/// Thread parameters for a spawned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Stack size (KiB)
    pub stack_kb: u16,
    /// FreeRTOS priority
    pub priority: u8,
    pub core: Core,
}

/// One indicator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Name used in logs and task names
    pub name: String<8>,
    pub gpio: i32,
    /// Output is lit when the pin is LOW
    #[serde(default)]
    pub active_low: bool,
    /// Request posted right after `init`
    #[serde(default)]
    pub startup: Option<IndicatorCommand>,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Indicator table; position is the indicator's id
    pub indicators: Vec<IndicatorConfig, MAX_ACTUATORS>,
    /// Per-indicator controller tasks
    pub task: TaskConfig,
    /// Delay timer service task
    pub timer_task: TaskConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let startup = [Preset::On, Preset::Slow, Preset::Fast, Preset::Heartbeat];
        let mut indicators = Vec::new();
        let board = pins::INDICATOR_NAMES.into_iter().zip(pins::INDICATOR_GPIOS);
        for ((label, gpio), preset) in board.zip(startup) {
            let mut name = String::new();
            let fits = name.push_str(label).is_ok();
            debug_assert!(fits, "indicator name {label} exceeds its capacity");
            let pushed = indicators
                .push(IndicatorConfig {
                    name,
                    gpio,
                    active_low: false,
                    startup: Some(IndicatorCommand::Preset { preset }),
                })
                .is_ok();
            debug_assert!(pushed, "default board exceeds MAX_ACTUATORS");
        }

        Self {
            indicators,
            task: TaskConfig {
                stack_kb: 4,
                priority: 5,
                core: Core::App,
            },
            timer_task: TaskConfig {
                stack_kb: 4,
                priority: 6,
                core: Core::App,
            },
        }
    }
}

impl SystemConfig {
    /// Parse and validate a JSON override.  Missing top-level fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            warn!("config: rejected JSON: {}", e);
            Error::Config("malformed JSON")
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indicators.is_empty() {
            return Err(Error::Config("no indicators configured"));
        }
        for (i, ind) in self.indicators.iter().enumerate() {
            if ind.name.is_empty() {
                return Err(Error::Config("indicator name is empty"));
            }
            if ind.gpio < 0 {
                return Err(Error::Config("negative gpio number"));
            }
            let earlier = &self.indicators[..i];
            if earlier.iter().any(|other| other.name == ind.name) {
                return Err(Error::Config("duplicate indicator name"));
            }
            if earlier.iter().any(|other| other.gpio == ind.gpio) {
                return Err(Error::Config("gpio assigned twice"));
            }
            if let Some(cmd) = &ind.startup {
                cmd.validate()?;
            }
        }
        if self.task.stack_kb == 0 || self.timer_task.stack_kb == 0 {
            return Err(Error::Config("task stack size is zero"));
        }
        Ok(())
    }
}
