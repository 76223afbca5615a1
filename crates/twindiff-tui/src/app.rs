#![forbid(unsafe_code)]

//! Application model: two editable panes wired to the diff service.
//!
//! Each pane owns a [`RunSurface`] and its [`Reconciler`]. Key events go
//! to the focused pane; every edit submits the latest text pair to the
//! [`DiffService`], and published results are fed through both
//! reconcilers - applied immediately on the unfocused pane, deferred on
//! the focused one until blur or paste completion.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use twindiff_core::{DiffResult, Side};
use twindiff_runtime::{ChangeKind, DiffService, SchedulerConfig};
use twindiff_surface::{Reconciler, RunSurface, StructuredSurface};

/// Lines moved by PageUp/PageDown.
const PAGE_STRIDE: usize = 20;

/// One editable pane.
pub struct Pane {
    /// Header label.
    pub label: &'static str,
    /// The editable content.
    pub surface: RunSurface,
    reconciler: Reconciler,
}

impl Pane {
    fn new(label: &'static str, side: Side, text: &str) -> Self {
        Self {
            label,
            surface: RunSurface::from_text(text),
            reconciler: Reconciler::new(side),
        }
    }
}

/// The whole editor state.
pub struct App {
    left: Pane,
    right: Pane,
    focus: Side,
    service: DiffService,
    result: Option<Arc<DiffResult>>,
    /// First visible line, shared by both panes.
    pub scroll_top: usize,
    should_quit: bool,
}

impl App {
    /// Build the app and kick off the initial computation.
    #[must_use]
    pub fn new(cfg: SchedulerConfig, left_text: &str, right_text: &str) -> Self {
        let mut left = Pane::new("Original", Side::Left, left_text);
        left.surface.set_focus(true);
        let right = Pane::new("Modified", Side::Right, right_text);

        let service = DiffService::new(cfg);
        // Initial content is a discrete, complete edit - same as a paste.
        service.submit(left_text, right_text, ChangeKind::Paste);

        Self {
            left,
            right,
            focus: Side::Left,
            service,
            result: None,
            scroll_top: 0,
            should_quit: false,
        }
    }

    /// The focused side.
    #[must_use]
    pub fn focus(&self) -> Side {
        self.focus
    }

    /// The pane for a side.
    #[must_use]
    pub fn pane(&self, side: Side) -> &Pane {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn pane_mut(&mut self, side: Side) -> &mut Pane {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn focused_surface(&mut self) -> &mut RunSurface {
        let side = self.focus;
        &mut self.pane_mut(side).surface
    }

    /// The last published result, if any.
    #[must_use]
    pub fn result(&self) -> Option<&Arc<DiffResult>> {
        self.result.as_ref()
    }

    /// Whether a recomputation is in flight.
    #[must_use]
    pub fn is_computing(&self) -> bool {
        self.service.is_computing()
    }

    /// Whether the user asked to quit.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Handle a terminal event. Returns `true` if a redraw is needed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key)
                if key.kind == KeyEventKind::Press || key.kind == KeyEventKind::Repeat =>
            {
                self.handle_key(key)
            }
            Event::Paste(text) => {
                self.focused_surface().insert_str(text);
                self.on_edit(ChangeKind::Paste);
                let pane = self.pane_mut(self.focus);
                let Pane {
                    surface,
                    reconciler,
                    ..
                } = pane;
                reconciler.on_paste_complete(surface);
                true
            }
            Event::Resize(..) => true,
            _ => false,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q' | 'c') if ctrl => {
                self.should_quit = true;
                true
            }
            KeyCode::Tab => {
                self.toggle_focus();
                true
            }
            KeyCode::Char(c) if !ctrl => {
                self.focused_surface().insert_char(c);
                self.on_edit(ChangeKind::Typing);
                true
            }
            KeyCode::Enter => {
                self.focused_surface().insert_char('\n');
                self.on_edit(ChangeKind::Typing);
                true
            }
            KeyCode::Backspace => {
                if self.focused_surface().delete_backward() {
                    self.on_edit(ChangeKind::Typing);
                }
                true
            }
            KeyCode::Delete => {
                if self.focused_surface().delete_forward() {
                    self.on_edit(ChangeKind::Typing);
                }
                true
            }
            KeyCode::Left => {
                self.focused_surface().move_left();
                true
            }
            KeyCode::Right => {
                self.focused_surface().move_right();
                true
            }
            KeyCode::Up => {
                self.focused_surface().move_up();
                true
            }
            KeyCode::Down => {
                self.focused_surface().move_down();
                true
            }
            KeyCode::Home => {
                self.focused_surface().move_line_start();
                true
            }
            KeyCode::End => {
                self.focused_surface().move_line_end();
                true
            }
            KeyCode::PageUp => {
                for _ in 0..PAGE_STRIDE {
                    self.focused_surface().move_up();
                }
                true
            }
            KeyCode::PageDown => {
                for _ in 0..PAGE_STRIDE {
                    self.focused_surface().move_down();
                }
                true
            }
            _ => false,
        }
    }

    /// Move focus to the other pane. Blurring flushes any reconciliation
    /// deferred while the pane was being edited.
    fn toggle_focus(&mut self) {
        let old = self.focus;
        let pane = self.pane_mut(old);
        pane.surface.set_focus(false);
        let Pane {
            surface,
            reconciler,
            ..
        } = pane;
        reconciler.on_blur(surface);

        self.focus = match old {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        let side = self.focus;
        self.pane_mut(side).surface.set_focus(true);
    }

    /// Submit the latest text pair after an edit.
    fn on_edit(&mut self, kind: ChangeKind) {
        let left = self.left.surface.plain_text();
        let right = self.right.surface.plain_text();
        self.service.submit(&left, &right, kind);
    }

    /// Feed newly published results through both reconcilers.
    ///
    /// Returns `true` if anything changed.
    pub fn drain_results(&mut self) -> bool {
        let mut changed = false;
        while let Some(result) = self.service.try_recv() {
            for pane in [&mut self.left, &mut self.right] {
                let Pane {
                    surface,
                    reconciler,
                    ..
                } = pane;
                reconciler.on_result(surface, result.clone());
            }
            self.result = Some(result);
            changed = true;
        }
        changed
    }

    /// Keep the focused caret inside the shared viewport.
    pub fn ensure_caret_visible(&mut self, viewport_rows: usize) {
        if viewport_rows == 0 {
            return;
        }
        let (line, _) = self.pane(self.focus).surface.caret_line_col();
        if line < self.scroll_top {
            self.scroll_top = line;
        } else if line >= self.scroll_top + viewport_rows {
            self.scroll_top = line + 1 - viewport_rows;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn app() -> App {
        // Long windows so tests never race a recompute.
        let cfg = SchedulerConfig::default().with_typing_debounce(Duration::from_secs(60));
        App::new(cfg, "left", "right")
    }

    #[test]
    fn typing_lands_in_the_focused_pane() {
        let mut app = app();
        app.focused_surface().move_line_end();
        app.handle_event(&key(KeyCode::Char('!')));
        assert_eq!(app.pane(Side::Left).surface.plain_text(), "left!");
        assert_eq!(app.pane(Side::Right).surface.plain_text(), "right");
    }

    #[test]
    fn tab_switches_focus_and_transfers_edit_target() {
        let mut app = app();
        app.handle_event(&key(KeyCode::Tab));
        assert_eq!(app.focus(), Side::Right);
        assert!(!app.pane(Side::Left).surface.has_focus());
        assert!(app.pane(Side::Right).surface.has_focus());

        app.handle_event(&key(KeyCode::Char('x')));
        assert_eq!(app.pane(Side::Right).surface.plain_text(), "xright");
    }

    #[test]
    fn ctrl_q_quits() {
        let mut app = app();
        assert!(!app.should_quit());
        app.handle_event(&ctrl('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn paste_inserts_whole_text() {
        let mut app = app();
        app.handle_event(&Event::Paste("two\nlines".into()));
        assert_eq!(app.pane(Side::Left).surface.plain_text(), "two\nlinesleft");
    }

    #[test]
    fn backspace_and_enter_edit_text() {
        let mut app = app();
        app.focused_surface().move_line_end();
        app.handle_event(&key(KeyCode::Backspace));
        app.handle_event(&key(KeyCode::Enter));
        assert_eq!(app.pane(Side::Left).surface.plain_text(), "lef\n");
    }

    #[test]
    fn scrolling_follows_the_caret() {
        let text: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let cfg = SchedulerConfig::default().with_typing_debounce(Duration::from_secs(60));
        let mut app = App::new(cfg, &text, "");
        for _ in 0..30 {
            app.focused_surface().move_down();
        }
        app.ensure_caret_visible(10);
        assert_eq!(app.scroll_top, 21);
        for _ in 0..30 {
            app.focused_surface().move_up();
        }
        app.ensure_caret_visible(10);
        assert_eq!(app.scroll_top, 0);
    }
}
