#![forbid(unsafe_code)]

//! Line/segment decomposition of an edit script.
//!
//! The classifier walks a script operation by operation and rebuilds the
//! per-side line structure: each side keeps a pending line buffer that
//! accumulates segments until a newline in some operation closes it. Line
//! boundaries that fall inside or across operations are handled by
//! splitting each operation's text on `\n` - every part except the last
//! finalizes a line, the last part stays pending for the next operation.
//! A final flush emits the trailing line (a text need not end with a
//! newline; one that does yields a trailing empty line, keeping the
//! reconstruction exact).

use smallvec::smallvec;

use crate::model::{DiffLine, DiffResult, DiffSegment, SegmentKind, Segments, Side};
use crate::script::{EditScript, OpTag};

/// Accumulates one side's lines as the script is walked.
struct LineBuilder {
    side: Side,
    next_number: u32,
    lines: Vec<DiffLine>,
    pending: Segments,
    /// Whether this side received any text at all.
    has_content: bool,
    /// Kind of the last operation that touched this side; closes a
    /// trailing empty line with the right classification.
    last_kind: SegmentKind,
}

impl LineBuilder {
    fn new(side: Side) -> Self {
        Self {
            side,
            next_number: 1,
            lines: Vec::new(),
            pending: smallvec![],
            has_content: false,
            last_kind: SegmentKind::Unchanged,
        }
    }

    fn push_segment(&mut self, text: &str, kind: SegmentKind) {
        if !text.is_empty() {
            self.pending.push(DiffSegment::new(text, kind));
        }
    }

    /// Close the pending line. An empty buffer still yields a line - the
    /// newline that closed it proves the source has one - carrying a
    /// single empty segment of the closing kind.
    fn finalize(&mut self, closing_kind: SegmentKind) {
        let segments = if self.pending.is_empty() {
            smallvec![DiffSegment::new("", closing_kind)]
        } else {
            std::mem::take(&mut self.pending)
        };
        self.lines
            .push(DiffLine::from_segments(self.next_number, self.side, segments));
        self.next_number += 1;
    }

    fn finish(mut self) -> Vec<DiffLine> {
        if self.has_content {
            let kind = self.last_kind;
            self.finalize(kind);
        }
        self.lines
    }
}

/// Decompose a script into per-line diff structures for both sides.
#[must_use]
pub fn classify(script: &EditScript) -> DiffResult {
    let mut left = LineBuilder::new(Side::Left);
    let mut right = LineBuilder::new(Side::Right);

    for op in script.ops() {
        if op.text.is_empty() {
            continue;
        }
        match op.tag {
            OpTag::Equal => {
                walk(&mut left, &op.text, SegmentKind::Unchanged);
                walk(&mut right, &op.text, SegmentKind::Unchanged);
            }
            OpTag::Delete => walk(&mut left, &op.text, SegmentKind::Removed),
            OpTag::Insert => walk(&mut right, &op.text, SegmentKind::Added),
        }
    }

    DiffResult {
        left_lines: left.finish(),
        right_lines: right.finish(),
    }
}

/// Feed one operation's text into a side: every `\n` closes the pending
/// line, the remainder stays pending.
fn walk(builder: &mut LineBuilder, text: &str, kind: SegmentKind) {
    builder.has_content = true;
    builder.last_kind = kind;
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            builder.finalize(kind);
        }
        builder.push_segment(part, kind);
    }
}
