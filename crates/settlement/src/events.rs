//! Event sinks.

use dropcraft_core::hex_encode;
use parking_lot::Mutex;
use tracing::info;

use crate::{Claimed, EventSink};

/// Records every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct EventLog {
    claimed: Mutex<Vec<Claimed>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all `Claimed` events so far.
    pub fn claimed_events(&self) -> Vec<Claimed> {
        self.claimed.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.claimed.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.lock().is_empty()
    }
}

impl EventSink for EventLog {
    fn claimed(&self, event: &Claimed) {
        self.claimed.lock().push(*event);
    }
}

/// Logs each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn claimed(&self, event: &Claimed) {
        info!(
            token = %hex_encode(event.token),
            index = event.index,
            account = %hex_encode(event.account),
            amount = %event.amount,
            "Claimed",
        );
    }
}
