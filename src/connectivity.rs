// ABOUTME: Explicit connectivity signal consulted by the offline services and the sync engine
// ABOUTME: Online flag plus a watch channel broadcasting the pending mutation count
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::errors::AppResult;
use crate::sync::SyncQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Shared online flag and pending-count broadcaster
///
/// Clones share state. The host application feeds network changes in through
/// [`Connectivity::set_online`]; nothing here polls the network.
#[derive(Clone, Debug)]
pub struct Connectivity {
    online: Arc<AtomicBool>,
    pending: Arc<watch::Sender<i64>>,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity {
    /// Signal starting in the given state with no pending mutations
    #[must_use]
    pub fn new(online: bool) -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            online: Arc::new(AtomicBool::new(online)),
            pending: Arc::new(pending),
        }
    }

    /// Whether the network is believed reachable
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Record a network change; returns `true` when the state flipped
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            info!(online, "Connectivity changed");
        }
        previous != online
    }

    /// Last published pending count
    #[must_use]
    pub fn pending_count(&self) -> i64 {
        *self.pending.borrow()
    }

    /// Receiver notified whenever the pending count changes
    #[must_use]
    pub fn subscribe_pending(&self) -> watch::Receiver<i64> {
        self.pending.subscribe()
    }

    /// Publish a pending count
    pub fn set_pending(&self, count: i64) {
        self.pending.send_if_modified(|current| {
            if *current == count {
                false
            } else {
                *current = count;
                true
            }
        });
    }

    /// Re-read the pending count from the queue and publish it
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be read
    pub async fn refresh_pending(&self, queue: &SyncQueue) -> AppResult<i64> {
        let count = queue.pending_count().await?;
        self.set_pending(count);
        debug!(pending = count, "Pending count refreshed");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_online_reports_transitions() {
        let connectivity = Connectivity::new(true);
        assert!(!connectivity.set_online(true));
        assert!(connectivity.set_online(false));
        assert!(!connectivity.is_online());
    }

    #[tokio::test]
    async fn test_pending_count_notifies_subscribers() {
        let connectivity = Connectivity::default();
        let mut rx = connectivity.subscribe_pending();
        connectivity.set_pending(3);
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(*rx.borrow_and_update(), 3);

        connectivity.set_pending(3);
        assert!(!rx.has_changed().unwrap_or(true));
    }
}
