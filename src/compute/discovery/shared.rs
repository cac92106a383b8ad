//! Thread-safe engine handle with a background cleanup timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::schema::InteractionEvent;

use super::archive::DiscoveryRecord;
use super::engine::{CleanupStats, DiscoveryEngine};

/// Cloneable handle serializing ingestion and cleanup on one engine.
#[derive(Clone)]
pub struct SharedDiscoveryEngine {
    inner: Arc<Mutex<DiscoveryEngine>>,
}

impl SharedDiscoveryEngine {
    pub fn new(engine: DiscoveryEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn ingest(&self, event: InteractionEvent) -> Vec<DiscoveryRecord> {
        self.lock().ingest(event)
    }

    pub fn cleanup(&self, now: f64) -> CleanupStats {
        self.lock().cleanup(now)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut DiscoveryEngine) -> R) -> R {
        f(&mut self.lock())
    }

    /// Run cleanup every `interval`, reading the current time from `clock`.
    ///
    /// The timer stops when the returned handle is stopped or dropped.
    pub fn spawn_cleanup<C>(&self, interval: Duration, clock: C) -> CleanupHandle
    where
        C: Fn() -> f64 + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let engine = self.clone();
        let flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                thread::park_timeout(interval);
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                let stats = engine.cleanup(clock());
                if stats != CleanupStats::default() {
                    log::debug!(
                        "Cleanup evicted {} events, {} trackers",
                        stats.events_evicted,
                        stats.trackers_evicted
                    );
                }
            }
        });

        CleanupHandle {
            stop,
            thread: Some(thread),
        }
    }

    // A panicking sink must not wedge the page
    fn lock(&self) -> MutexGuard<'_, DiscoveryEngine> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Stops the cleanup timer when stopped or dropped.
pub struct CleanupHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl CleanupHandle {
    /// Stop the timer and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                log::warn!("Cleanup thread panicked");
            }
        }
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EngineConfig, PatternLibrary};
    use std::sync::atomic::AtomicU64;
    use std::time::Instant;

    #[test]
    fn test_concurrent_ingest() {
        let engine =
            DiscoveryEngine::new(EngineConfig::default(), PatternLibrary::builtin()).unwrap();
        let shared = SharedDiscoveryEngine::new(engine);

        let workers: Vec<_> = (0..4)
            .map(|w| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        shared.ingest(InteractionEvent::tick((w * 50 + i) as f64));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(shared.with(|e| e.stats().events_ingested), 200);
    }

    #[test]
    fn test_cleanup_timer() {
        let engine =
            DiscoveryEngine::new(EngineConfig::default(), PatternLibrary::builtin()).unwrap();
        let shared = SharedDiscoveryEngine::new(engine);
        shared.ingest(InteractionEvent::tick(0.0));
        shared.ingest(InteractionEvent::tick(1.0));

        // Clock far past retention
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let handle = shared.spawn_cleanup(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::Relaxed);
            1e9
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        while !shared.with(|e| e.buffer().is_empty()) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        handle.stop();

        assert!(shared.with(|e| e.buffer().is_empty()));
        let after_stop = calls.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(calls.load(Ordering::Relaxed), after_stop);
    }
}
