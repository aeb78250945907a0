//! Per-building debounce timers.
//!
//! Each accepted report arms a timer for its building that fires once the
//! report window has passed, so the building is re-evaluated when the report
//! stops counting. Arming replaces any pending timer for the same building.
//! Fired building names are delivered on a channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Timers {
    pending: HashMap<String, PendingTimer>,
    next_generation: u64,
}

/// Debounced re-evaluation timers keyed by building name.
#[derive(Clone)]
pub struct UpdateScheduler {
    delay: Duration,
    timers: Arc<Mutex<Timers>>,
    fire_tx: mpsc::UnboundedSender<String>,
}

impl UpdateScheduler {
    /// Create a scheduler and the receiver on which fired buildings arrive.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (fire_tx, fire_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            delay,
            timers: Arc::new(Mutex::new(Timers::default())),
            fire_tx,
        };
        (scheduler, fire_rx)
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer for `building`, cancelling the pending one if any.
    pub async fn arm(&self, building: &str) {
        let mut timers = self.timers.lock().await;
        timers.next_generation += 1;
        let generation = timers.next_generation;

        let handle = tokio::spawn(fire_after(
            self.delay,
            building.to_string(),
            generation,
            Arc::clone(&self.timers),
            self.fire_tx.clone(),
        ));

        if let Some(previous) = timers
            .pending
            .insert(building.to_string(), PendingTimer { generation, handle })
        {
            previous.handle.abort();
            debug!(building, "Pending update timer replaced");
        } else {
            debug!(building, "Update timer armed");
        }
    }

    /// Cancel the pending timer for `building`. Returns true if one existed.
    pub async fn cancel(&self, building: &str) -> bool {
        let removed = self.timers.lock().await.pending.remove(building);
        removed.is_some_and(|timer| {
            timer.handle.abort();
            true
        })
    }

    pub async fn is_pending(&self, building: &str) -> bool {
        self.timers.lock().await.pending.contains_key(building)
    }

    pub async fn pending_count(&self) -> usize {
        self.timers.lock().await.pending.len()
    }
}

async fn fire_after(
    delay: Duration,
    building: String,
    generation: u64,
    timers: Arc<Mutex<Timers>>,
    fire_tx: mpsc::UnboundedSender<String>,
) {
    tokio::time::sleep(delay).await;

    let mut timers = timers.lock().await;
    // A newer arm may have replaced this timer after the sleep finished but
    // before the abort landed.
    if timers
        .pending
        .get(&building)
        .is_none_or(|t| t.generation != generation)
    {
        return;
    }
    timers.pending.remove(&building);
    drop(timers);

    debug!(building = %building, "Update timer fired");
    if fire_tx.send(building).is_err() {
        warn!("Update timer fired with no receiver");
    }
}
