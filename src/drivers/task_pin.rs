//! Core-pinned thread spawning for the indicator and timer tasks.
//!
//! Wraps `esp_pthread_set_cfg()` so that `std::thread` creates a FreeRTOS
//! task pinned to a specific CPU core with explicit priority and stack
//! size.  On non-ESP targets, falls back to a plain thread with the
//! requested stack.
//!
//! `esp_pthread_set_cfg()` applies to the *next* `pthread_create()` from
//! the calling thread, so the config→spawn pair must not be interleaved
//! with other thread creation on the same thread.

use serde::{Deserialize, Serialize};

use crate::config::TaskConfig;
use crate::error::{Error, Result};

/// CPU core identifiers for the ESP32-S3 dual-core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU), shared with the protocol stacks.
    Pro = 0,
    /// Core 1 (APP_CPU).
    App = 1,
}

/// Spawn a named task with the core, priority and stack from `task`.
#[cfg(target_os = "espidf")]
pub fn spawn_task(
    name: &str,
    task: &TaskConfig,
    f: impl FnOnce() + Send + 'static,
) -> Result<std::thread::JoinHandle<()>> {
    // FreeRTOS copies the name into the TCB, so the C string only has to
    // outlive the spawn call below.
    let c_name = std::ffi::CString::new(name).map_err(|_| Error::Init("task name contains NUL"))?;

    // SAFETY: `cfg` is fully initialised by the IDF default constructor and
    // `c_name` stays alive until the thread has been created.
    unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = task.core as i32;
        cfg.prio = i32::from(task.priority);
        cfg.stack_size = (usize::from(task.stack_kb) * 1024) as i32;
        cfg.thread_name = c_name.as_ptr();
        let ret = esp_idf_sys::esp_pthread_set_cfg(&cfg);
        if ret != esp_idf_sys::ESP_OK as i32 {
            log::error!("esp_pthread_set_cfg failed for '{}': {}", name, ret);
            return Err(Error::Init("esp_pthread_set_cfg"));
        }
    }

    log::info!(
        "Spawning '{}' on {:?} (pri={}, stack={}KB)",
        name,
        task.core,
        task.priority,
        task.stack_kb
    );

    std::thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}

/// Host fallback: ignores core affinity and priority.
#[cfg(not(target_os = "espidf"))]
pub fn spawn_task(
    name: &str,
    task: &TaskConfig,
    f: impl FnOnce() + Send + 'static,
) -> Result<std::thread::JoinHandle<()>> {
    log::info!(
        "Spawning '{}' (sim, no core pinning, stack={}KB)",
        name,
        task.stack_kb
    );

    std::thread::Builder::new()
        .name(name.into())
        .stack_size(usize::from(task.stack_kb) * 1024)
        .spawn(f)
        .map_err(|_| Error::Init("thread creation failed"))
}
