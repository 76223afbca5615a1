#![forbid(unsafe_code)]

//! The structured surface capability trait and its in-memory
//! implementation.
//!
//! [`StructuredSurface`] is the contract the reconciler is written
//! against: expose plain text, report and place an absolute caret, and
//! accept a wholesale structure replacement. [`RunSurface`] implements it
//! as a retained run list and adds the editing operations a live pane
//! needs - grapheme-aware insert, delete, and caret movement that mutate
//! the run structure in place so existing highlights survive typing.
//!
//! Absolute offsets count Unicode scalar values; a line break counts as
//! one. Editing never changes the focus state.

use std::fmt;

use twindiff_core::SegmentKind;
use unicode_segmentation::UnicodeSegmentation;

use crate::runs::{Run, RunNode, nodes_char_len, nodes_text};

/// Failures surfaced by a structured surface implementation.
#[derive(Debug)]
pub enum SurfaceError {
    /// The surface cannot report a caret position.
    CaretUnavailable,
    /// The proposed structure is malformed.
    Structure(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::CaretUnavailable => write!(f, "caret position unavailable"),
            SurfaceError::Structure(msg) => write!(f, "invalid run structure: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Capabilities of an editable surface that renders structured runs.
///
/// Any implementation with these operations - retained-mode tree,
/// immutable rope, terminal pane - can host reconciled highlights.
pub trait StructuredSurface {
    /// The full text currently held by the surface.
    fn plain_text(&self) -> String;

    /// Total content length in chars.
    fn char_len(&self) -> usize;

    /// Absolute caret offset in chars.
    fn caret_offset(&self) -> Result<usize, SurfaceError>;

    /// Replace the whole run structure.
    ///
    /// Must not be used to alter the text itself - callers pass runs
    /// whose concatenation equals the surface's current text.
    fn replace_structure(&mut self, nodes: Vec<RunNode>) -> Result<(), SurfaceError>;

    /// Place the caret at an absolute offset, clamping to end of content.
    fn set_caret_offset(&mut self, offset: usize) -> Result<(), SurfaceError>;

    /// Whether the surface currently holds edit focus.
    fn has_focus(&self) -> bool;

    /// Grant or remove edit focus.
    fn set_focus(&mut self, focus: bool);
}

/// In-memory structured surface: a run list, a caret, and a focus flag.
#[derive(Debug, Clone, Default)]
pub struct RunSurface {
    nodes: Vec<RunNode>,
    caret: usize,
    focused: bool,
}

/// Byte offset of the `chars`-th char of `text` (or its end).
fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(byte, _)| byte)
}

impl RunSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface holding `text` as plain runs, caret at the start.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut nodes = Vec::new();
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                nodes.push(RunNode::Break);
            }
            if !part.is_empty() {
                nodes.push(RunNode::Run(Run::new(part, SegmentKind::Unchanged)));
            }
        }
        Self {
            nodes,
            caret: 0,
            focused: false,
        }
    }

    /// The current run structure.
    #[must_use]
    pub fn nodes(&self) -> &[RunNode] {
        &self.nodes
    }

    /// Runs grouped into visual lines (breaks removed).
    #[must_use]
    pub fn visual_lines(&self) -> Vec<Vec<&Run>> {
        let mut lines: Vec<Vec<&Run>> = vec![Vec::new()];
        for node in &self.nodes {
            match node {
                RunNode::Run(run) => {
                    if let Some(last) = lines.last_mut() {
                        last.push(run);
                    }
                }
                RunNode::Break => lines.push(Vec::new()),
            }
        }
        lines
    }

    /// Number of visual lines (a trailing break opens one more line).
    #[must_use]
    pub fn line_count(&self) -> usize {
        1 + self
            .nodes
            .iter()
            .filter(|n| matches!(n, RunNode::Break))
            .count()
    }

    /// `(start_char, char_len)` of every visual line.
    #[must_use]
    pub fn line_spans(&self) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut start = 0;
        let mut len = 0;
        for node in &self.nodes {
            match node {
                RunNode::Run(run) => len += run.char_len(),
                RunNode::Break => {
                    spans.push((start, len));
                    start += len + 1;
                    len = 0;
                }
            }
        }
        spans.push((start, len));
        spans
    }

    /// Caret position as `(line, char_column)`.
    #[must_use]
    pub fn caret_line_col(&self) -> (usize, usize) {
        let spans = self.line_spans();
        for (i, &(start, len)) in spans.iter().enumerate() {
            if self.caret <= start + len {
                return (i, self.caret - start);
            }
        }
        let last = spans.len() - 1;
        (last, spans[last].1)
    }

    /// Node index and char residual the caret falls into.
    ///
    /// Walks the runs in order, accumulating a running char count until it
    /// reaches the offset; a position at a run boundary belongs to the run
    /// it ends. Offsets past the content map to one past the last node.
    #[must_use]
    pub fn caret_location(&self) -> (usize, usize) {
        self.locate(self.caret)
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let mut cum = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                RunNode::Run(run) => {
                    let len = run.char_len();
                    if offset <= cum + len {
                        return (i, offset - cum);
                    }
                    cum += len;
                }
                RunNode::Break => {
                    if offset <= cum {
                        return (i, 0);
                    }
                    cum += 1;
                }
            }
        }
        (self.nodes.len(), 0)
    }

    /// Drop empty runs and merge adjacent same-kind runs.
    ///
    /// Text and caret offsets are unaffected.
    fn normalize(&mut self) {
        self.nodes
            .retain(|n| !matches!(n, RunNode::Run(run) if run.text.is_empty()));
        let mut i = 1;
        while i < self.nodes.len() {
            let mergeable = matches!(
                (&self.nodes[i - 1], &self.nodes[i]),
                (RunNode::Run(a), RunNode::Run(b)) if a.kind == b.kind
            );
            if mergeable {
                if let RunNode::Run(b) = self.nodes.remove(i) {
                    if let RunNode::Run(a) = &mut self.nodes[i - 1] {
                        a.text.push_str(&b.text);
                    }
                }
            } else {
                i += 1;
            }
        }
    }

    // ── Editing operations ─────────────────────────────────────────

    /// Insert text at the caret, splitting runs and lines as needed.
    ///
    /// Inserted text inherits the kind of the run it lands in, so stale
    /// highlighting stays visually coherent until the next recompute.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let (idx, residual) = self.locate(self.caret);
        let added = s.chars().count();

        let (kind, before, after, replace_existing) = match self.nodes.get(idx) {
            Some(RunNode::Run(run)) => {
                let byte = char_to_byte(&run.text, residual);
                (
                    run.kind,
                    run.text[..byte].to_string(),
                    run.text[byte..].to_string(),
                    true,
                )
            }
            _ => (SegmentKind::Unchanged, String::new(), String::new(), false),
        };

        let parts: Vec<&str> = s.split('\n').collect();
        let mut replacement: Vec<RunNode> = Vec::new();
        if parts.len() == 1 {
            replacement.push(RunNode::Run(Run::new(format!("{before}{s}{after}"), kind)));
        } else {
            let first = format!("{before}{}", parts[0]);
            if !first.is_empty() {
                replacement.push(RunNode::Run(Run::new(first, kind)));
            }
            for middle in &parts[1..parts.len() - 1] {
                replacement.push(RunNode::Break);
                if !middle.is_empty() {
                    replacement.push(RunNode::Run(Run::new(*middle, kind)));
                }
            }
            replacement.push(RunNode::Break);
            let last = format!("{}{after}", parts[parts.len() - 1]);
            if !last.is_empty() {
                replacement.push(RunNode::Run(Run::new(last, kind)));
            }
        }

        if replace_existing {
            self.nodes.splice(idx..=idx, replacement);
        } else {
            self.nodes.splice(idx..idx, replacement);
        }
        self.caret += added;
        self.normalize();
    }

    /// Insert a single character at the caret.
    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    /// Delete the grapheme before the caret. Returns `true` if anything
    /// was deleted.
    pub fn delete_backward(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let (idx, residual) = self.locate(self.caret);
        if residual > 0 {
            let Some(RunNode::Run(run)) = self.nodes.get_mut(idx) else {
                return false;
            };
            let byte = char_to_byte(&run.text, residual);
            let Some((start, grapheme)) = run.text[..byte].grapheme_indices(true).last() else {
                return false;
            };
            let removed = grapheme.chars().count();
            run.text.replace_range(start..byte, "");
            self.caret -= removed;
        } else {
            // At a line start the previous node is the break to remove.
            if idx == 0 || !matches!(self.nodes[idx - 1], RunNode::Break) {
                return false;
            }
            self.nodes.remove(idx - 1);
            self.caret -= 1;
        }
        self.normalize();
        true
    }

    /// Delete the grapheme after the caret. Returns `true` if anything
    /// was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.caret >= self.char_len() {
            return false;
        }
        let (idx, residual) = self.locate(self.caret);
        let (target, byte) = match &self.nodes[idx] {
            RunNode::Run(run) => {
                let byte = char_to_byte(&run.text, residual);
                if byte < run.text.len() {
                    (idx, byte)
                } else {
                    (idx + 1, 0)
                }
            }
            RunNode::Break => (idx, 0),
        };
        if matches!(self.nodes[target], RunNode::Break) {
            self.nodes.remove(target);
        } else if let RunNode::Run(run) = &mut self.nodes[target] {
            let Some(grapheme) = run.text[byte..].graphemes(true).next() else {
                return false;
            };
            let end = byte + grapheme.len();
            run.text.replace_range(byte..end, "");
        }
        self.normalize();
        true
    }

    // ── Caret movement ─────────────────────────────────────────────

    /// Move one grapheme left.
    pub fn move_left(&mut self) {
        if self.caret == 0 {
            return;
        }
        let (idx, residual) = self.locate(self.caret);
        if residual > 0 {
            if let Some(RunNode::Run(run)) = self.nodes.get(idx) {
                let byte = char_to_byte(&run.text, residual);
                if let Some((_, grapheme)) = run.text[..byte].grapheme_indices(true).last() {
                    self.caret -= grapheme.chars().count();
                    return;
                }
            }
        }
        self.caret -= 1;
    }

    /// Move one grapheme right.
    pub fn move_right(&mut self) {
        if self.caret >= self.char_len() {
            return;
        }
        let (idx, residual) = self.locate(self.caret);
        match &self.nodes[idx] {
            RunNode::Break => self.caret += 1,
            RunNode::Run(run) => {
                let byte = char_to_byte(&run.text, residual);
                if byte < run.text.len() {
                    if let Some(grapheme) = run.text[byte..].graphemes(true).next() {
                        self.caret += grapheme.chars().count();
                    }
                } else {
                    match self.nodes.get(idx + 1) {
                        Some(RunNode::Run(next)) => {
                            if let Some(grapheme) = next.text.graphemes(true).next() {
                                self.caret += grapheme.chars().count();
                            }
                        }
                        Some(RunNode::Break) => self.caret += 1,
                        None => {}
                    }
                }
            }
        }
    }

    /// Move to the previous line, keeping the column where possible.
    pub fn move_up(&mut self) {
        let (line, col) = self.caret_line_col();
        if line == 0 {
            return;
        }
        let (start, len) = self.line_spans()[line - 1];
        self.caret = start + col.min(len);
        self.snap_caret();
    }

    /// Move to the next line, keeping the column where possible.
    pub fn move_down(&mut self) {
        let spans = self.line_spans();
        let (line, col) = self.caret_line_col();
        if line + 1 >= spans.len() {
            return;
        }
        let (start, len) = spans[line + 1];
        self.caret = start + col.min(len);
        self.snap_caret();
    }

    /// Move to the start of the current line.
    pub fn move_line_start(&mut self) {
        let (line, _) = self.caret_line_col();
        self.caret = self.line_spans()[line].0;
    }

    /// Move to the end of the current line.
    pub fn move_line_end(&mut self) {
        let (line, _) = self.caret_line_col();
        let (start, len) = self.line_spans()[line];
        self.caret = start + len;
    }

    /// Pull the caret back to a grapheme boundary after column-preserving
    /// vertical movement.
    fn snap_caret(&mut self) {
        let (idx, residual) = self.locate(self.caret);
        if residual == 0 {
            return;
        }
        if let Some(RunNode::Run(run)) = self.nodes.get(idx) {
            let mut cum = 0;
            for grapheme in run.text.graphemes(true) {
                let next = cum + grapheme.chars().count();
                if next > residual {
                    self.caret -= residual - cum;
                    return;
                }
                cum = next;
            }
        }
    }
}

impl StructuredSurface for RunSurface {
    fn plain_text(&self) -> String {
        nodes_text(&self.nodes)
    }

    fn char_len(&self) -> usize {
        nodes_char_len(&self.nodes)
    }

    fn caret_offset(&self) -> Result<usize, SurfaceError> {
        Ok(self.caret)
    }

    fn replace_structure(&mut self, nodes: Vec<RunNode>) -> Result<(), SurfaceError> {
        for node in &nodes {
            if let RunNode::Run(run) = node {
                if run.text.contains('\n') {
                    return Err(SurfaceError::Structure(
                        "run text contains a line break".into(),
                    ));
                }
            }
        }
        self.nodes = nodes;
        let len = self.char_len();
        if self.caret > len {
            self.caret = len;
        }
        Ok(())
    }

    fn set_caret_offset(&mut self, offset: usize) -> Result<(), SurfaceError> {
        self.caret = offset.min(self.char_len());
        Ok(())
    }

    fn has_focus(&self) -> bool {
        self.focused
    }

    fn set_focus(&mut self, focus: bool) {
        self.focused = focus;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_round_trips() {
        let surface = RunSurface::from_text("a\n\nbc");
        assert_eq!(surface.plain_text(), "a\n\nbc");
        assert_eq!(surface.char_len(), 5);
        assert_eq!(surface.line_count(), 3);
    }

    #[test]
    fn insert_at_caret_extends_text() {
        let mut surface = RunSurface::from_text("helo");
        surface.set_caret_offset(3).unwrap();
        surface.insert_str("l");
        assert_eq!(surface.plain_text(), "hello");
        assert_eq!(surface.caret_offset().unwrap(), 4);
    }

    #[test]
    fn insert_multiline_splits_the_line() {
        let mut surface = RunSurface::from_text("ab");
        surface.set_caret_offset(1).unwrap();
        surface.insert_str("1\n2");
        assert_eq!(surface.plain_text(), "a1\n2b");
        assert_eq!(surface.caret_offset().unwrap(), 4);
        assert_eq!(surface.line_count(), 2);
    }

    #[test]
    fn insert_into_empty_surface() {
        let mut surface = RunSurface::new();
        surface.insert_str("x\ny");
        assert_eq!(surface.plain_text(), "x\ny");
        assert_eq!(surface.caret_offset().unwrap(), 3);
    }

    #[test]
    fn insert_newline_at_line_start() {
        let mut surface = RunSurface::from_text("ab");
        surface.set_caret_offset(0).unwrap();
        surface.insert_char('\n');
        assert_eq!(surface.plain_text(), "\nab");
        assert_eq!(surface.caret_offset().unwrap(), 1);
    }

    #[test]
    fn delete_backward_removes_a_char() {
        let mut surface = RunSurface::from_text("abc");
        surface.set_caret_offset(2).unwrap();
        assert!(surface.delete_backward());
        assert_eq!(surface.plain_text(), "ac");
        assert_eq!(surface.caret_offset().unwrap(), 1);
    }

    #[test]
    fn delete_backward_joins_lines() {
        let mut surface = RunSurface::from_text("ab\ncd");
        surface.set_caret_offset(3).unwrap();
        assert!(surface.delete_backward());
        assert_eq!(surface.plain_text(), "abcd");
        assert_eq!(surface.caret_offset().unwrap(), 2);
        assert_eq!(surface.line_count(), 1);
    }

    #[test]
    fn delete_backward_at_start_is_a_no_op() {
        let mut surface = RunSurface::from_text("ab");
        surface.set_caret_offset(0).unwrap();
        assert!(!surface.delete_backward());
        assert_eq!(surface.plain_text(), "ab");
    }

    #[test]
    fn delete_forward_removes_the_next_char() {
        let mut surface = RunSurface::from_text("abc");
        surface.set_caret_offset(1).unwrap();
        assert!(surface.delete_forward());
        assert_eq!(surface.plain_text(), "ac");
        assert_eq!(surface.caret_offset().unwrap(), 1);
    }

    #[test]
    fn delete_forward_joins_lines() {
        let mut surface = RunSurface::from_text("ab\ncd");
        surface.set_caret_offset(2).unwrap();
        assert!(surface.delete_forward());
        assert_eq!(surface.plain_text(), "abcd");
    }

    #[test]
    fn delete_forward_at_end_is_a_no_op() {
        let mut surface = RunSurface::from_text("ab");
        surface.set_caret_offset(2).unwrap();
        assert!(!surface.delete_forward());
    }

    #[test]
    fn grapheme_aware_backspace() {
        // é as a combining sequence: 'e' + U+0301 is one grapheme, two chars.
        let mut surface = RunSurface::from_text("ae\u{301}b");
        surface.set_caret_offset(3).unwrap();
        assert!(surface.delete_backward());
        assert_eq!(surface.plain_text(), "ab");
        assert_eq!(surface.caret_offset().unwrap(), 1);
    }

    #[test]
    fn caret_movement_crosses_line_breaks() {
        let mut surface = RunSurface::from_text("a\nb");
        surface.set_caret_offset(1).unwrap();
        surface.move_right();
        assert_eq!(surface.caret_offset().unwrap(), 2);
        surface.move_left();
        assert_eq!(surface.caret_offset().unwrap(), 1);
    }

    #[test]
    fn vertical_movement_preserves_column() {
        let mut surface = RunSurface::from_text("abcdef\nxy\nlonger");
        surface.set_caret_offset(4).unwrap(); // line 0, col 4
        surface.move_down();
        assert_eq!(surface.caret_line_col(), (1, 2)); // clamped to "xy"
        surface.move_down();
        assert_eq!(surface.caret_line_col(), (2, 2));
        surface.move_up();
        surface.move_up();
        assert_eq!(surface.caret_line_col(), (0, 2));
    }

    #[test]
    fn line_start_and_end() {
        let mut surface = RunSurface::from_text("abc\ndef");
        surface.set_caret_offset(5).unwrap();
        surface.move_line_start();
        assert_eq!(surface.caret_offset().unwrap(), 4);
        surface.move_line_end();
        assert_eq!(surface.caret_offset().unwrap(), 7);
    }

    #[test]
    fn set_caret_clamps_to_end() {
        let mut surface = RunSurface::from_text("abc");
        surface.set_caret_offset(100).unwrap();
        assert_eq!(surface.caret_offset().unwrap(), 3);
    }

    #[test]
    fn replace_structure_rejects_embedded_breaks() {
        let mut surface = RunSurface::new();
        let err = surface
            .replace_structure(vec![RunNode::Run(Run {
                text: "a\nb".into(),
                kind: SegmentKind::Unchanged,
            })])
            .unwrap_err();
        assert!(matches!(err, SurfaceError::Structure(_)));
    }

    #[test]
    fn replace_structure_clamps_a_dangling_caret() {
        let mut surface = RunSurface::from_text("abcdef");
        surface.set_caret_offset(6).unwrap();
        surface
            .replace_structure(vec![RunNode::Run(Run::new("ab", SegmentKind::Unchanged))])
            .unwrap();
        assert_eq!(surface.caret_offset().unwrap(), 2);
    }

    #[test]
    fn editing_keeps_focus_untouched() {
        let mut surface = RunSurface::from_text("ab");
        surface.set_focus(true);
        surface.insert_str("x");
        surface.delete_backward();
        assert!(surface.has_focus());
    }

    #[test]
    fn typed_text_inherits_surrounding_run_kind() {
        let mut surface = RunSurface::new();
        surface
            .replace_structure(vec![RunNode::Run(Run::new("add", SegmentKind::Added))])
            .unwrap();
        surface.set_caret_offset(3).unwrap();
        surface.insert_str("ed");
        assert_eq!(surface.plain_text(), "added");
        assert_eq!(surface.nodes().len(), 1);
        assert!(matches!(
            &surface.nodes()[0],
            RunNode::Run(run) if run.kind == SegmentKind::Added
        ));
    }

    #[test]
    fn visual_lines_group_runs() {
        let surface = RunSurface::from_text("ab\n\ncd");
        let lines = surface.visual_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 1);
        assert!(lines[1].is_empty());
        assert_eq!(lines[2][0].text, "cd");
    }
}
