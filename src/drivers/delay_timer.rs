//! One-shot delay timers and the expiry → mailbox bridge.
//!
//! Every indicator owns one reprogrammable one-shot timer.  All timers run
//! as cooperative tasks on a single service thread:
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │  Timer service thread                                        │
//!  │  ┌────────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                          │  │
//!  │  │  ┌────────────┐ ┌────────────┐       ┌────────────┐    │  │
//!  │  │  │ timer 0    │ │ timer 1    │  ...  │ timer n    │    │  │
//!  │  │  │ rearm ⚑/⏱ │ │ rearm ⚑/⏱ │       │ rearm ⚑/⏱ │    │  │
//!  │  │  └─────┬──────┘ └─────┬──────┘       └─────┬──────┘    │  │
//!  │  └────────┼──────────────┼────────────────────┼───────────┘  │
//!  └───────────┼──────────────┼────────────────────┼──────────────┘
//!              ▼ Change       ▼ Change             ▼ Change
//!          mailbox 0      mailbox 1            mailbox n
//! ```
//!
//! Restarting a timer stores the new period in a latest-value `Signal`.
//! The timer task races that signal against the running deadline, so a
//! restart always supersedes a pending expiry.  The expiry side only holds
//! an [`ExpiryBridge`], which can post `Change` and nothing else.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use heapless::Vec;
use log::{error, info, trace};

use crate::config::{MAX_ACTUATORS, TaskConfig};
use crate::error::{Error, ResourceError, Result};
use crate::events::{ActuatorId, Event, TimerRef};
use crate::mailbox::Mailbox;

use super::task_pin::spawn_task;

type Rearm = Signal<CriticalSectionRawMutex, u16>;

struct Shared {
    slots: [Rearm; MAX_ACTUATORS],
    count: usize,
    running: AtomicBool,
}

// ---------------------------------------------------------------------------
// Handle (held by every indicator port)
// ---------------------------------------------------------------------------

/// Cloneable handle used to reprogram timers from any thread.
#[derive(Clone)]
pub struct TimerHandle {
    shared: Arc<Shared>,
}

impl TimerHandle {
    /// Reprogram `timer` to expire `period_ms` from now, superseding any
    /// pending expiry.
    pub fn restart(&self, timer: TimerRef, period_ms: u16) -> core::result::Result<(), ResourceError> {
        if !self.shared.running.load(Ordering::Acquire) || timer.index() >= self.shared.count {
            return Err(ResourceError::TimerUnavailable);
        }
        self.shared.slots[timer.index()].signal(period_ms);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Expiry bridge (held by the timer task)
// ---------------------------------------------------------------------------

/// The only capability a timer has: post `Change` to its owner's mailbox.
pub struct ExpiryBridge {
    owner: ActuatorId,
    mailbox: Arc<Mailbox>,
}

impl ExpiryBridge {
    pub fn new(owner: ActuatorId, mailbox: Arc<Mailbox>) -> Self {
        Self { owner, mailbox }
    }

    pub fn fire(&self) {
        if let Err(e) = self.mailbox.post(Event::Change) {
            error!("{}: timer expiry lost: {}", self.owner, e);
        }
    }
}

// ---------------------------------------------------------------------------
// Bank (owns the timers until the service starts)
// ---------------------------------------------------------------------------

pub struct TimerBank {
    shared: Arc<Shared>,
}

impl TimerBank {
    /// Allocate `count` timers, addressed `TimerRef(0)..TimerRef(count)`.
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 || count > MAX_ACTUATORS {
            return Err(Error::Init("timer count out of range"));
        }
        Ok(Self {
            shared: Arc::new(Shared {
                slots: core::array::from_fn(|_| Signal::new()),
                count,
                running: AtomicBool::new(false),
            }),
        })
    }

    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            shared: self.shared.clone(),
        }
    }

    /// Start the service thread.  `bridges[i]` receives the expiries of
    /// `TimerRef(i)`.
    pub fn start(
        self,
        bridges: Vec<ExpiryBridge, MAX_ACTUATORS>,
        task: &TaskConfig,
    ) -> Result<std::thread::JoinHandle<()>> {
        if bridges.len() != self.shared.count {
            return Err(Error::Init("one expiry bridge per timer required"));
        }

        // Restarts are accepted from here on; the first ones wait in their
        // signal until the executor polls the timer task.
        self.shared.running.store(true, Ordering::Release);
        let shared = self.shared.clone();
        spawn_task("delay-timers", task, move || run_timer_service(shared, bridges)).inspect_err(
            |_| {
                self.shared.running.store(false, Ordering::Release);
            },
        )
    }
}

/// Clears `running` if the service thread ever unwinds.
struct RunningGuard(Arc<Shared>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::Release);
        error!("Delay timer service stopped");
    }
}

fn run_timer_service(shared: Arc<Shared>, bridges: Vec<ExpiryBridge, MAX_ACTUATORS>) {
    let _guard = RunningGuard(shared.clone());
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    for (index, bridge) in bridges.into_iter().enumerate() {
        let shared = shared.clone();
        executor
            .spawn(async move { run_timer(&shared.slots[index], TimerRef(index as u8), &bridge).await })
            .detach();
    }

    info!("Delay timer service started ({} timers)", shared.count);
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// One timer: idle until armed, then expire unless rearmed first.
async fn run_timer(rearm: &Rearm, timer: TimerRef, bridge: &ExpiryBridge) {
    let mut period_ms = rearm.wait().await;
    loop {
        let restarted = future::or(async { Some(rearm.wait().await) }, async {
            async_io_mini::Timer::after(Duration::from_millis(u64::from(period_ms))).await;
            None
        })
        .await;

        match restarted {
            Some(next) => {
                trace!("timer {}: restarted ({} ms)", timer.0, next);
                period_ms = next;
            }
            None => {
                trace!("timer {}: expired after {} ms", timer.0, period_ms);
                bridge.fire();
                period_ms = rearm.wait().await;
            }
        }
    }
}
