//! Background eviction of expired websites.
//!
//! Runs on its own single-worker tokio runtime thread. A crossbeam receiver
//! carries the Ctrl+C shutdown signal; it is polled between ticks.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, TryRecvError};
use tokio::time::MissedTickBehavior;

use super::ArchiveStore;
use crate::{debug, log};

/// How often the shutdown channel is checked.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// Spawn the sweeper thread.
pub fn spawn_sweeper(
    store: Arc<ArchiveStore>,
    interval: Duration,
    shutdown_rx: Receiver<()>,
) -> Result<JoinHandle<()>> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("sweeper")
        .enable_time()
        .build()
        .context("Failed to create sweeper runtime")?;

    Ok(thread::spawn(move || {
        rt.block_on(run(store, interval, shutdown_rx));
    }))
}

/// Sweep every `interval` until shutdown is signalled or the sender drops.
pub async fn run(store: Arc<ArchiveStore>, interval: Duration, shutdown_rx: Receiver<()>) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately; nothing can be expired yet.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = wait_for_shutdown(&shutdown_rx) => {
                debug!("archive"; "sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                let removed = store.sweep();
                if removed > 0 {
                    log!("archive"; "evicted {} expired website(s)", removed);
                }
            }
        }
    }
}

async fn wait_for_shutdown(rx: &Receiver<()>) {
    loop {
        match rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return,
            Err(TryRecvError::Empty) => tokio::time::sleep(SHUTDOWN_POLL).await,
        }
    }
}

/// Wait for the sweeper to finish (max 2 seconds).
pub fn wait_for_sweeper(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WebsiteType;
    use crate::package::ManualClock;
    use std::collections::BTreeMap;
    use std::time::{Instant, SystemTime};

    #[test]
    fn test_sweeper_evicts_and_stops() {
        let clock = Arc::new(ManualClock::new(SystemTime::UNIX_EPOCH));
        let store = Arc::new(ArchiveStore::with_clock(Duration::from_secs(60), clock.clone()));
        store.create(BTreeMap::new(), WebsiteType::Blog, Vec::new());
        clock.advance(Duration::from_secs(61));

        let (tx, rx) = crossbeam::channel::unbounded();
        let handle = spawn_sweeper(store.clone(), Duration::from_millis(20), rx).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !store.is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(store.is_empty());

        tx.send(()).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(handle.is_finished());
    }

    #[test]
    fn test_sweeper_stops_when_sender_dropped() {
        let store = Arc::new(ArchiveStore::new(Duration::from_secs(60)));
        let (tx, rx) = crossbeam::channel::unbounded::<()>();
        let handle = spawn_sweeper(store, Duration::from_secs(3600), rx).unwrap();
        drop(tx);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(handle.is_finished());
    }
}
