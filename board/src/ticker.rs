use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use kamotsu_common::channel::Channel;

use crate::board::Board;
use crate::clock::Clock;
use crate::store::Store;

const TICK: Duration = Duration::from_secs(1);

/// Once-a-second countdown for a channel's rate-limit block.
///
/// Publishes the remaining seconds (`None` until the first tick) and stops
/// after publishing zero. Dropping the ticker stops it; the stored block is
/// left as it was.
#[derive(Debug)]
pub struct BlockTicker {
    remaining: watch::Receiver<Option<u64>>,
    handle: JoinHandle<()>,
}

impl BlockTicker {
    pub fn spawn<S, C>(board: Arc<Mutex<Board<S, C>>>, channel: Channel) -> Self
    where
        S: Store + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            loop {
                interval.tick().await;
                let remaining = match board.lock().await.tick_rate_limit(channel) {
                    Ok(status) => status.remaining_secs(),
                    Err(e) => {
                        tracing::error!("rate limit countdown stopped: {e}");
                        return;
                    }
                };
                tx.send_if_modified(|current| {
                    if *current == Some(remaining) {
                        return false;
                    }
                    *current = Some(remaining);
                    true
                });
                if remaining == 0 {
                    tracing::debug!(channel = channel.label(), "rate limit block cleared");
                    return;
                }
            }
        });
        Self { remaining: rx, handle }
    }

    /// Last published remaining seconds.
    pub fn remaining_secs(&self) -> Option<u64> {
        *self.remaining.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.remaining.clone()
    }

    /// Wait for the block to clear. Returns false if the countdown stopped
    /// without clearing it.
    pub async fn wait_until_clear(&mut self) -> bool {
        self.remaining.wait_for(|r| *r == Some(0)).await.is_ok()
    }
}

impl Drop for BlockTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
