//! Per-indicator event mailbox.
//!
//! A bounded `embassy-sync` channel bridging every producer (control-plane
//! callers on any thread, the timer service) with the indicator's single
//! consumer task.  Posting never blocks; a full mailbox drops the event and
//! counts it.
//!
//! ```text
//! ┌──────────────┐   post()   ┌──────────────┐  receive()  ┌────────────┐
//! │ control plane│──────────▶│              │────────────▶│ Controller │
//! │ ExpiryBridge │──────────▶│ Channel<4>   │             │ (1 reader) │
//! └──────────────┘            └──────────────┘             └────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::error::ResourceError;
use crate::events::Event;

/// Events that may be queued per indicator.
pub const MAILBOX_DEPTH: usize = 4;

pub struct Mailbox {
    channel: Channel<CriticalSectionRawMutex, Event, MAILBOX_DEPTH>,
    dropped: AtomicU32,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue without blocking.  Safe from any thread.
    pub fn post(&self, event: Event) -> Result<(), ResourceError> {
        self.channel.try_send(event).map_err(|_| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            ResourceError::MailboxFull
        })
    }

    /// Wait for the next event.
    pub async fn receive(&self) -> Event {
        self.channel.receive().await
    }

    /// Park the calling thread until an event arrives.
    pub fn receive_blocking(&self) -> Event {
        futures_lite::future::block_on(self.receive())
    }

    pub fn try_receive(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Posts rejected because the mailbox was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
