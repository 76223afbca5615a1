#![forbid(unsafe_code)]

//! Debounced recompute policy.
//!
//! [`RecomputeScheduler`] is a small state machine - `Idle`, `Pending`,
//! `Computing` - that decides when a stream of text changes should
//! trigger a diff computation. It takes the current `Instant` as an
//! argument everywhere instead of reading a clock, so every transition is
//! deterministic under test.
//!
//! # Policy
//!
//! - Any change while idle or pending restarts the debounce timer. A
//!   burst of N changes inside the window yields exactly one computation.
//! - Typing uses a long window (highlight thrash while composing is worse
//!   than latency); a paste is a discrete, complete edit and uses a
//!   window two orders of magnitude shorter.
//! - Above a line-count threshold the coarse large-input window applies
//!   regardless of the change kind, bounding worst-case CPU.
//! - A change arriving mid-computation marks the run dirty; completion
//!   re-enters `Pending` with a fresh timer. An armed timer is cancelled
//!   outright by a superseding change - computation is never started and
//!   then abandoned.

use std::time::{Duration, Instant};

/// How a text change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Incremental keystrokes.
    Typing,
    /// A bulk paste.
    Paste,
}

/// Debounce intervals and the large-input gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Window applied to incremental typing.
    pub typing_debounce: Duration,
    /// Window applied after a bulk paste.
    pub paste_debounce: Duration,
    /// Line count above which the large-input window applies.
    pub large_input_lines: usize,
    /// Window applied to large inputs, regardless of change kind.
    pub large_input_debounce: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            typing_debounce: Duration::from_millis(1000),
            paste_debounce: Duration::from_millis(120),
            large_input_lines: 10_000,
            large_input_debounce: Duration::from_millis(3000),
        }
    }
}

impl SchedulerConfig {
    /// Set the typing debounce window.
    #[must_use]
    pub fn with_typing_debounce(mut self, window: Duration) -> Self {
        self.typing_debounce = window;
        self
    }

    /// Set the paste debounce window.
    #[must_use]
    pub fn with_paste_debounce(mut self, window: Duration) -> Self {
        self.paste_debounce = window;
        self
    }

    /// Set the large-input line threshold.
    #[must_use]
    pub fn with_large_input_lines(mut self, lines: usize) -> Self {
        self.large_input_lines = lines;
        self
    }

    /// Set the large-input debounce window.
    #[must_use]
    pub fn with_large_input_debounce(mut self, window: Duration) -> Self {
        self.large_input_debounce = window;
        self
    }

    /// The window for a change of `kind` over `line_count` input lines.
    #[must_use]
    pub fn debounce_for(&self, kind: ChangeKind, line_count: usize) -> Duration {
        if line_count > self.large_input_lines {
            return self.large_input_debounce;
        }
        match kind {
            ChangeKind::Typing => self.typing_debounce,
            ChangeKind::Paste => self.paste_debounce,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Pending { fire_at: Instant },
    Computing,
}

/// The debounce state machine.
#[derive(Debug, Clone)]
pub struct RecomputeScheduler {
    cfg: SchedulerConfig,
    phase: Phase,
    /// Change that arrived while computing, to re-arm on completion.
    dirty: Option<(ChangeKind, usize)>,
}

impl RecomputeScheduler {
    /// Create a scheduler with the given policy.
    #[must_use]
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            phase: Phase::Idle,
            dirty: None,
        }
    }

    /// The configured policy.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Record a text change at `now`.
    ///
    /// While idle or pending this cancels any armed timer and arms a
    /// fresh one; while computing it marks the run dirty so completion
    /// immediately re-enters `Pending`.
    pub fn note_change(&mut self, now: Instant, kind: ChangeKind, line_count: usize) {
        match self.phase {
            Phase::Idle | Phase::Pending { .. } => {
                let window = self.cfg.debounce_for(kind, line_count);
                self.phase = Phase::Pending {
                    fire_at: now + window,
                };
                tracing::trace!(?kind, line_count, ?window, "debounce armed");
            }
            Phase::Computing => {
                self.dirty = Some((kind, line_count));
            }
        }
    }

    /// Check whether the armed timer has fired.
    ///
    /// Returns `true` exactly once per debounce window; the caller must
    /// then snapshot the *latest* texts (not the texts at arm time) and
    /// start a computation, calling [`complete`](Self::complete) when it
    /// finishes.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Pending { fire_at } if now >= fire_at => {
                self.phase = Phase::Computing;
                true
            }
            _ => false,
        }
    }

    /// Record that the in-flight computation finished at `now`.
    ///
    /// Returns to `Idle`, or re-enters `Pending` when a change arrived
    /// during the computation.
    pub fn complete(&mut self, now: Instant) {
        debug_assert_eq!(self.phase, Phase::Computing, "complete without poll");
        self.phase = Phase::Idle;
        if let Some((kind, line_count)) = self.dirty.take() {
            self.note_change(now, kind, line_count);
        }
    }

    /// Deadline of the armed timer, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Pending { fire_at } => Some(fire_at),
            _ => None,
        }
    }

    /// Whether a computation is in flight.
    #[must_use]
    pub fn is_computing(&self) -> bool {
        self.phase == Phase::Computing
    }

    /// Whether nothing is armed or running.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn typing_scheduler() -> RecomputeScheduler {
        RecomputeScheduler::new(SchedulerConfig::default())
    }

    #[test]
    fn idle_until_first_change() {
        let mut s = typing_scheduler();
        let now = Instant::now();
        assert!(s.is_idle());
        assert!(!s.poll(now));
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn burst_of_changes_triggers_one_computation() {
        let mut s = typing_scheduler();
        let start = Instant::now();

        // Ten keystrokes, 50ms apart - all inside the 1s window.
        let mut fired = 0;
        for i in 0..10 {
            let now = start + ms(i * 50);
            s.note_change(now, ChangeKind::Typing, 3);
            if s.poll(now) {
                fired += 1;
            }
        }
        assert_eq!(fired, 0, "window keeps resetting during the burst");

        // Quiet period elapses after the last keystroke.
        let after = start + ms(9 * 50) + ms(1001);
        assert!(s.poll(after));
        assert_eq!(fired, 0);
        assert!(s.is_computing());

        // No double fire.
        assert!(!s.poll(after + ms(1)));
    }

    #[test]
    fn change_rearms_the_pending_timer() {
        let mut s = typing_scheduler();
        let start = Instant::now();
        s.note_change(start, ChangeKind::Typing, 1);
        let first = s.next_deadline().unwrap();
        s.note_change(start + ms(500), ChangeKind::Typing, 1);
        let second = s.next_deadline().unwrap();
        assert!(second > first, "superseding change cancels the old timer");
        assert!(!s.poll(first), "old deadline no longer fires");
        assert!(s.poll(second));
    }

    #[test]
    fn paste_window_is_much_shorter() {
        let cfg = SchedulerConfig::default();
        assert!(cfg.paste_debounce * 5 < cfg.typing_debounce);

        let mut s = RecomputeScheduler::new(cfg);
        let start = Instant::now();
        s.note_change(start, ChangeKind::Paste, 10);
        assert!(!s.poll(start + ms(100)));
        assert!(s.poll(start + ms(121)));
    }

    #[test]
    fn large_inputs_gate_to_the_coarse_window() {
        let cfg = SchedulerConfig::default();
        // Even a paste waits for the coarse window on huge inputs.
        assert_eq!(
            cfg.debounce_for(ChangeKind::Paste, 50_000),
            cfg.large_input_debounce
        );
        assert_eq!(
            cfg.debounce_for(ChangeKind::Typing, 50_000),
            cfg.large_input_debounce
        );
        assert_eq!(
            cfg.debounce_for(ChangeKind::Typing, 100),
            cfg.typing_debounce
        );
    }

    #[test]
    fn change_during_computation_rearms_on_complete() {
        let mut s = typing_scheduler();
        let start = Instant::now();
        s.note_change(start, ChangeKind::Typing, 1);
        assert!(s.poll(start + ms(1001)));

        // A keystroke lands while the worker is busy.
        s.note_change(start + ms(1100), ChangeKind::Typing, 1);
        assert!(s.is_computing());
        assert!(!s.poll(start + ms(3000)), "no overlap while computing");

        let done = start + ms(1200);
        s.complete(done);
        assert!(!s.is_idle(), "dirty run re-enters pending");
        assert_eq!(s.next_deadline(), Some(done + ms(1000)));
        assert!(s.poll(done + ms(1001)));
    }

    #[test]
    fn clean_completion_returns_to_idle() {
        let mut s = typing_scheduler();
        let start = Instant::now();
        s.note_change(start, ChangeKind::Typing, 1);
        assert!(s.poll(start + ms(1001)));
        s.complete(start + ms(1100));
        assert!(s.is_idle());
        assert!(!s.poll(start + ms(5000)));
    }

    #[test]
    fn builder_setters_override_defaults() {
        let cfg = SchedulerConfig::default()
            .with_typing_debounce(ms(200))
            .with_paste_debounce(ms(10))
            .with_large_input_lines(100)
            .with_large_input_debounce(ms(500));
        assert_eq!(cfg.debounce_for(ChangeKind::Typing, 5), ms(200));
        assert_eq!(cfg.debounce_for(ChangeKind::Paste, 5), ms(10));
        assert_eq!(cfg.debounce_for(ChangeKind::Paste, 101), ms(500));
    }
}
