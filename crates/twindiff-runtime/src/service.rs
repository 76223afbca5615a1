#![forbid(unsafe_code)]

//! Background diff computation service.
//!
//! [`DiffService`] owns a single worker thread. Callers hand it the
//! latest `(left, right)` snapshot on every edit; the worker sleeps on a
//! condition variable until the scheduler's deadline, computes on the
//! snapshot current *at fire time*, and publishes each [`DiffResult`]
//! over a channel. One worker means results are published in snapshot
//! order - a stale pair can never overwrite a newer one.
//!
//! A failed computation is logged and dropped; the previously published
//! result stands. The worker is stopped and joined on
//! [`shutdown`](DiffService::shutdown) or drop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use twindiff_core::{DiffResult, compute_diff};

use crate::scheduler::{ChangeKind, RecomputeScheduler, SchedulerConfig};

struct Inner {
    scheduler: RecomputeScheduler,
    left: Arc<str>,
    right: Arc<str>,
    stopped: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    cond: Condvar,
}

/// Debounced, asynchronous diff computation over a live text pair.
pub struct DiffService {
    shared: Arc<Shared>,
    computing: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<Arc<DiffResult>>>>,
    results: mpsc::Receiver<Arc<DiffResult>>,
    worker: Option<JoinHandle<()>>,
}

impl DiffService {
    /// Start the service with the given scheduling policy.
    #[must_use]
    pub fn new(cfg: SchedulerConfig) -> Self {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                scheduler: RecomputeScheduler::new(cfg),
                left: Arc::from(""),
                right: Arc::from(""),
                stopped: false,
            }),
            cond: Condvar::new(),
        });
        let computing = Arc::new(AtomicBool::new(false));
        let latest = Arc::new(Mutex::new(None));
        let (tx, rx) = mpsc::channel();

        let worker = {
            let shared = shared.clone();
            let computing = computing.clone();
            let latest = latest.clone();
            thread::spawn(move || worker_loop(&shared, &computing, &latest, &tx))
        };

        Self {
            shared,
            computing,
            latest,
            results: rx,
            worker: Some(worker),
        }
    }

    /// Record the latest text pair after an edit.
    ///
    /// Supersedes any previously armed timer; the worker will compute on
    /// whatever pair is current when the debounce window elapses.
    pub fn submit(&self, left: &str, right: &str, kind: ChangeKind) {
        let line_count = left.lines().count().max(right.lines().count());
        let mut inner = self.shared.inner.lock().unwrap();
        inner.left = Arc::from(left);
        inner.right = Arc::from(right);
        inner.scheduler.note_change(Instant::now(), kind, line_count);
        drop(inner);
        self.shared.cond.notify_all();
    }

    /// Take the next published result, if one is ready.
    #[must_use]
    pub fn try_recv(&self) -> Option<Arc<DiffResult>> {
        self.results.try_recv().ok()
    }

    /// The most recently published result.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<DiffResult>> {
        self.latest.lock().unwrap().clone()
    }

    /// Whether a computation is in flight (for UI feedback).
    #[must_use]
    pub fn is_computing(&self) -> bool {
        self.computing.load(Ordering::SeqCst)
    }

    /// Stop the worker thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            inner.stopped = true;
        }
        self.shared.cond.notify_all();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DiffService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    shared: &Shared,
    computing: &AtomicBool,
    latest: &Mutex<Option<Arc<DiffResult>>>,
    tx: &mpsc::Sender<Arc<DiffResult>>,
) {
    while let Some((left, right)) = next_job(shared, computing) {
        let outcome = compute_diff(&left, &right);
        let mut inner = shared.inner.lock().unwrap();
        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                *latest.lock().unwrap() = Some(result.clone());
                // A closed receiver just means nobody is listening yet.
                let _ = tx.send(result);
            }
            Err(err) => {
                tracing::warn!(error = %err, "diff computation failed; keeping previous result");
            }
        }
        inner.scheduler.complete(Instant::now());
        computing.store(false, Ordering::SeqCst);
    }
}

/// Block until the scheduler fires or the service stops.
///
/// Returns the snapshot to compute, taken at fire time under the lock.
fn next_job(shared: &Shared, computing: &AtomicBool) -> Option<(Arc<str>, Arc<str>)> {
    let mut inner = shared.inner.lock().unwrap();
    loop {
        if inner.stopped {
            return None;
        }
        let now = Instant::now();
        if inner.scheduler.poll(now) {
            computing.store(true, Ordering::SeqCst);
            return Some((inner.left.clone(), inner.right.clone()));
        }
        match inner.scheduler.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(now);
                let (guard, _) = shared.cond.wait_timeout(inner, wait).unwrap();
                inner = guard;
            }
            None => {
                inner = shared.cond.wait(inner).unwrap();
            }
        }
    }
}
