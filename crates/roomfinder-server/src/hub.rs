//! Fan-out of live updates to connected WebSocket clients.
//!
//! Each client gets a bounded queue. Sends never wait: a full queue drops the
//! message for that client only, and a closed queue drops the client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Text sent to every client on each heartbeat tick.
pub const HEARTBEAT_MESSAGE: &str = "ping";

/// Messages queued per client before further sends are dropped.
pub const CLIENT_QUEUE_CAPACITY: usize = 32;

/// Handle a transport holds for one registered client.
pub struct ClientHandle {
    pub id: Uuid,
    pub rx: mpsc::Receiver<Arc<str>>,
}

/// Thread-safe set of connected live clients.
#[derive(Clone, Default)]
pub struct BroadcastHub {
    clients: Arc<RwLock<HashMap<Uuid, mpsc::Sender<Arc<str>>>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new client and return its receiving end.
    pub async fn register(&self) -> ClientHandle {
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
        let id = Uuid::new_v4();
        let count = {
            let mut clients = self.clients.write().await;
            clients.insert(id, tx);
            clients.len()
        };
        info!(client_id = %id, clients = count, "Live client registered");
        ClientHandle { id, rx }
    }

    pub async fn unregister(&self, id: Uuid) {
        if self.clients.write().await.remove(&id).is_some() {
            info!(client_id = %id, "Live client unregistered");
        }
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Queue a message for a single client. Returns false if it was not
    /// delivered.
    pub async fn send_to(&self, id: Uuid, message: impl Into<Arc<str>>) -> bool {
        let Some(tx) = self.clients.read().await.get(&id).cloned() else {
            return false;
        };
        match tx.try_send(message.into()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(client_id = %id, "Live client queue full, message dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.unregister(id).await;
                false
            }
        }
    }

    /// Queue a message for every client. Returns how many accepted it.
    pub async fn broadcast(&self, message: impl Into<Arc<str>>) -> usize {
        let message = message.into();
        let mut delivered = 0;
        let mut closed = Vec::new();
        {
            let clients = self.clients.read().await;
            for (id, tx) in clients.iter() {
                match tx.try_send(Arc::clone(&message)) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(client_id = %id, "Live client queue full, message dropped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }
        if !closed.is_empty() {
            let mut clients = self.clients.write().await;
            for id in &closed {
                clients.remove(id);
            }
            debug!(removed = closed.len(), "Dropped closed live clients");
        }
        delivered
    }

    /// Send [`HEARTBEAT_MESSAGE`] to every client once per `interval`.
    pub fn spawn_heartbeat(&self, interval: Duration) -> JoinHandle<()> {
        let hub = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                let delivered = hub.broadcast(HEARTBEAT_MESSAGE).await;
                debug!(delivered, "Heartbeat sent");
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_client() {
        let hub = BroadcastHub::new();
        let mut a = hub.register().await;
        let mut b = hub.register().await;

        assert_eq!(hub.broadcast("hello").await, 2);
        assert_eq!(&*a.rx.recv().await.unwrap(), "hello");
        assert_eq!(&*b.rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn send_to_targets_one_client() {
        let hub = BroadcastHub::new();
        let mut a = hub.register().await;
        let mut b = hub.register().await;

        assert!(hub.send_to(a.id, "only a").await);
        assert_eq!(&*a.rx.recv().await.unwrap(), "only a");
        assert!(b.rx.try_recv().is_err());
        assert!(!hub.send_to(Uuid::new_v4(), "nobody").await);
    }

    #[tokio::test]
    async fn closed_clients_are_dropped() {
        let hub = BroadcastHub::new();
        let gone = hub.register().await;
        let mut alive = hub.register().await;
        drop(gone.rx);

        assert_eq!(hub.broadcast("x").await, 1);
        assert_eq!(hub.client_count().await, 1);
        assert_eq!(&*alive.rx.recv().await.unwrap(), "x");
    }

    #[tokio::test]
    async fn slow_client_does_not_block_others() {
        let hub = BroadcastHub::new();
        let _slow = hub.register().await;
        let mut fast = hub.register().await;

        for i in 0..CLIENT_QUEUE_CAPACITY {
            hub.broadcast(format!("m{i}")).await;
            fast.rx.recv().await.unwrap();
        }
        // The slow client's queue is now full; the fast one still receives.
        assert_eq!(hub.broadcast("late").await, 1);
        assert_eq!(&*fast.rx.recv().await.unwrap(), "late");
        assert_eq!(hub.client_count().await, 2);
    }

    #[tokio::test]
    async fn unregister_removes_client() {
        let hub = BroadcastHub::new();
        let client = hub.register().await;
        hub.unregister(client.id).await;
        assert_eq!(hub.client_count().await, 0);
        assert_eq!(hub.broadcast("x").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_pings_on_interval() {
        let hub = BroadcastHub::new();
        let mut client = hub.register().await;
        let task = hub.spawn_heartbeat(Duration::from_secs(29));

        tokio::time::sleep(Duration::from_secs(28)).await;
        assert!(client.rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(&*client.rx.recv().await.unwrap(), HEARTBEAT_MESSAGE);

        task.abort();
    }
}
