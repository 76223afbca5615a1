#![forbid(unsafe_code)]

//! Cursor-preserving reconciliation.
//!
//! When a new [`DiffResult`] arrives for a side, the pane's run structure
//! is discarded and rebuilt from the classified lines - but the caret
//! must come back to the same absolute offset, and a surface the user is
//! actively typing into must not have its structure rebuilt under the
//! keystroke. [`Reconciler`] implements both policies:
//!
//! - a focused surface defers reconciliation; the stashed result is
//!   applied on blur or once a discrete paste completes
//! - an unfocused surface reconciles immediately
//! - focus is never granted by reconciliation, only observed
//!
//! Reconciliation never fails outward: if the surface rejects the rebuilt
//! structure or the caret cannot be placed, the reconciler degrades to a
//! caret at end of content and carries on.

use std::sync::Arc;

use twindiff_core::{DiffResult, Side};

use crate::runs::build_runs;
use crate::surface::StructuredSurface;

/// Re-applies classified highlights into one side's editable surface.
#[derive(Debug)]
pub struct Reconciler {
    side: Side,
    deferred: Option<Arc<DiffResult>>,
}

impl Reconciler {
    /// Create a reconciler for one side.
    #[must_use]
    pub fn new(side: Side) -> Self {
        Self {
            side,
            deferred: None,
        }
    }

    /// The side this reconciler serves.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Whether a result is stashed awaiting blur or paste completion.
    #[must_use]
    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Deliver a freshly computed result.
    ///
    /// Applied immediately when the surface is unfocused; stashed
    /// otherwise so highlight rebuilding never fights an in-progress
    /// keystroke. A newer result replaces any stashed one.
    pub fn on_result(&mut self, surface: &mut dyn StructuredSurface, result: Arc<DiffResult>) {
        if surface.has_focus() {
            tracing::trace!(side = ?self.side, "deferring reconciliation while focused");
            self.deferred = Some(result);
        } else {
            self.apply(surface, &result);
        }
    }

    /// The surface lost focus; apply any stashed result.
    pub fn on_blur(&mut self, surface: &mut dyn StructuredSurface) {
        if let Some(result) = self.deferred.take() {
            self.apply(surface, &result);
        }
    }

    /// A discrete paste finished; apply any stashed result even though
    /// the surface keeps focus.
    pub fn on_paste_complete(&mut self, surface: &mut dyn StructuredSurface) {
        if let Some(result) = self.deferred.take() {
            self.apply(surface, &result);
        }
    }

    /// Rebuild the surface's run structure and restore the caret.
    ///
    /// The caret is recorded only when the surface holds focus, and focus
    /// is never granted here. Failures degrade to a caret at end of
    /// content.
    pub fn apply(&self, surface: &mut dyn StructuredSurface, result: &DiffResult) {
        let recorded = if surface.has_focus() {
            surface.caret_offset().ok()
        } else {
            None
        };

        let nodes = build_runs(result.side_lines(self.side));
        if let Err(err) = surface.replace_structure(nodes) {
            tracing::warn!(side = ?self.side, error = %err, "structure rebuild failed");
            let end = surface.char_len();
            let _ = surface.set_caret_offset(end);
            return;
        }

        if let Some(offset) = recorded {
            if surface.set_caret_offset(offset).is_err() {
                let end = surface.char_len();
                let _ = surface.set_caret_offset(end);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::RunNode;
    use crate::surface::{RunSurface, SurfaceError};
    use twindiff_core::compute_diff;

    fn result_for(left: &str, right: &str) -> Arc<DiffResult> {
        Arc::new(compute_diff(left, right).unwrap())
    }

    #[test]
    fn unfocused_surface_reconciles_immediately() {
        let mut surface = RunSurface::from_text("a\nb");
        let mut reconciler = Reconciler::new(Side::Left);
        reconciler.on_result(&mut surface, result_for("a\nb", "a\nc"));
        assert!(!reconciler.has_deferred());
        assert_eq!(surface.plain_text(), "a\nb");
    }

    #[test]
    fn focused_surface_defers_until_blur() {
        let mut surface = RunSurface::from_text("a\nb");
        surface.set_focus(true);
        let mut reconciler = Reconciler::new(Side::Left);
        let before = surface.nodes().to_vec();

        reconciler.on_result(&mut surface, result_for("a\nb", "a\nc"));
        assert!(reconciler.has_deferred());
        assert_eq!(surface.nodes(), &before[..], "structure untouched while focused");

        surface.set_focus(false);
        reconciler.on_blur(&mut surface);
        assert!(!reconciler.has_deferred());
    }

    #[test]
    fn paste_completion_flushes_while_still_focused() {
        let mut surface = RunSurface::from_text("x");
        surface.set_focus(true);
        let mut reconciler = Reconciler::new(Side::Right);
        reconciler.on_result(&mut surface, result_for("y", "x"));
        assert!(reconciler.has_deferred());
        reconciler.on_paste_complete(&mut surface);
        assert!(!reconciler.has_deferred());
        assert!(surface.has_focus(), "paste flush keeps focus");
    }

    #[test]
    fn newer_result_replaces_a_stashed_one() {
        let mut surface = RunSurface::from_text("v2");
        surface.set_focus(true);
        let mut reconciler = Reconciler::new(Side::Left);
        reconciler.on_result(&mut surface, result_for("v1", "v1"));
        reconciler.on_result(&mut surface, result_for("v2", "v2"));
        surface.set_focus(false);
        reconciler.on_blur(&mut surface);
        assert_eq!(surface.plain_text(), "v2");
    }

    #[test]
    fn caret_survives_reconciliation() {
        let mut surface = RunSurface::from_text("hello world\nsecond");
        surface.set_focus(true);
        surface.set_caret_offset(8).unwrap();

        let reconciler = Reconciler::new(Side::Left);
        reconciler.apply(&mut surface, &result_for("hello world\nsecond", "hello there\nsecond"));
        assert_eq!(surface.caret_offset().unwrap(), 8);
        assert_eq!(surface.plain_text(), "hello world\nsecond");
    }

    #[test]
    fn caret_beyond_content_lands_at_end() {
        let mut surface = RunSurface::from_text("long text here");
        surface.set_focus(true);
        surface.set_caret_offset(14).unwrap();

        let reconciler = Reconciler::new(Side::Left);
        // The computed result is for a shorter left text than the caret
        // position (the surface text raced ahead of the snapshot).
        reconciler.apply(&mut surface, &result_for("short", "short"));
        assert_eq!(surface.plain_text(), "short");
        assert_eq!(surface.caret_offset().unwrap(), 5);
    }

    #[test]
    fn reconciliation_is_idempotent() {
        let mut surface = RunSurface::from_text("a\nb\nc");
        surface.set_focus(true);
        surface.set_caret_offset(3).unwrap();
        let result = result_for("a\nb\nc", "a\nx\nc");

        let reconciler = Reconciler::new(Side::Left);
        reconciler.apply(&mut surface, &result);
        let nodes_once = surface.nodes().to_vec();
        let caret_once = surface.caret_offset().unwrap();

        reconciler.apply(&mut surface, &result);
        assert_eq!(surface.nodes(), &nodes_once[..]);
        assert_eq!(surface.caret_offset().unwrap(), caret_once);
    }

    #[test]
    fn unfocused_caret_is_not_recorded_or_moved() {
        let mut surface = RunSurface::from_text("abc");
        surface.set_caret_offset(2).unwrap();
        let reconciler = Reconciler::new(Side::Left);
        reconciler.apply(&mut surface, &result_for("abc", "abc"));
        assert!(!surface.has_focus(), "reconciliation never grants focus");
    }

    #[test]
    fn highlights_land_in_the_structure() {
        let mut surface = RunSurface::from_text("a\nb\nc");
        let reconciler = Reconciler::new(Side::Right);
        reconciler.apply(&mut surface, &result_for("a\nb\nc", "a\nx\nc"));
        // The right side of the result replaces the pane's structure.
        assert_eq!(surface.plain_text(), "a\nx\nc");
        assert!(
            surface
                .nodes()
                .iter()
                .any(|n| matches!(n, RunNode::Run(run) if run.kind.is_changed()))
        );
    }

    /// Surface whose structure replacement always fails, to exercise the
    /// degradation path.
    struct BrokenSurface {
        inner: RunSurface,
    }

    impl StructuredSurface for BrokenSurface {
        fn plain_text(&self) -> String {
            self.inner.plain_text()
        }
        fn char_len(&self) -> usize {
            self.inner.char_len()
        }
        fn caret_offset(&self) -> Result<usize, SurfaceError> {
            self.inner.caret_offset()
        }
        fn replace_structure(&mut self, _nodes: Vec<RunNode>) -> Result<(), SurfaceError> {
            Err(SurfaceError::Structure("broken on purpose".into()))
        }
        fn set_caret_offset(&mut self, offset: usize) -> Result<(), SurfaceError> {
            self.inner.set_caret_offset(offset)
        }
        fn has_focus(&self) -> bool {
            self.inner.has_focus()
        }
        fn set_focus(&mut self, focus: bool) {
            self.inner.set_focus(focus)
        }
    }

    #[test]
    fn rebuild_failure_degrades_to_caret_at_end() {
        let mut surface = BrokenSurface {
            inner: RunSurface::from_text("abc"),
        };
        surface.set_focus(true);
        surface.set_caret_offset(1).unwrap();

        let reconciler = Reconciler::new(Side::Left);
        // Does not panic, does not propagate; caret falls back to end.
        reconciler.apply(&mut surface, &result_for("abc", "abd"));
        assert_eq!(surface.caret_offset().unwrap(), 3);
        assert_eq!(surface.plain_text(), "abc");
    }
}
