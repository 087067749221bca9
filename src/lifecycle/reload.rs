//! One-bit reload request shared by every trigger.
//!
//! Triggers (signal task, reload path, file watcher) only [`ReloadFlag::request`];
//! the serving loop is the single consumer that [`ReloadFlag::take`]s the bit
//! and rebuilds the table.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct ReloadFlag {
    requested: AtomicBool,
    wake: Notify,
}

impl ReloadFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a reload. Repeated requests before the next take coalesce.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Consume a pending request.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::SeqCst)
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolve once a request has been made since the last wakeup.
    pub async fn notified(&self) {
        self.wake.notified().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn take_clears_the_flag() {
        let flag = ReloadFlag::new();
        assert!(!flag.take());
        flag.request();
        flag.request();
        assert!(flag.is_requested());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[tokio::test]
    async fn request_wakes_waiter() {
        let flag = Arc::new(ReloadFlag::new());
        let waiter = {
            let flag = Arc::clone(&flag);
            tokio::spawn(async move { flag.notified().await })
        };
        flag.request();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn request_before_wait_is_not_lost() {
        let flag = ReloadFlag::new();
        flag.request();
        tokio::time::timeout(Duration::from_secs(1), flag.notified())
            .await
            .unwrap();
    }
}
