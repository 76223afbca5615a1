#![forbid(unsafe_code)]

//! Classified diff output types.
//!
//! A [`DiffResult`] holds one ordered sequence of [`DiffLine`]s per side.
//! Each line owns its [`DiffSegment`]s; segments are the smallest unit of
//! classified text and are immutable once produced. A result is built
//! atomically for one text pair and superseded wholesale by the next
//! computation - there is no incremental patching.

use smallvec::SmallVec;

/// Classification of a segment or line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Text present on both sides.
    Unchanged,
    /// Text present only on the right side.
    Added,
    /// Text present only on the left side.
    Removed,
}

impl SegmentKind {
    /// Whether this kind marks changed text.
    #[must_use]
    pub fn is_changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Which pane of the comparison a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The original text.
    Left,
    /// The modified text.
    Right,
}

impl Side {
    /// The changed-segment kind for this side.
    ///
    /// A line is never partially added and partially removed on the same
    /// side: left-side changes are removals, right-side changes additions.
    #[must_use]
    pub fn changed_kind(self) -> SegmentKind {
        match self {
            Self::Left => SegmentKind::Removed,
            Self::Right => SegmentKind::Added,
        }
    }
}

/// A contiguous run of classified text within one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSegment {
    /// Segment text. Never contains a line break.
    pub text: String,
    /// Classification of this run.
    pub kind: SegmentKind,
}

impl DiffSegment {
    /// Create a segment.
    #[must_use]
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Storage for a line's segments; most lines hold only a few.
pub type Segments = SmallVec<[DiffSegment; 4]>;

/// One classified line on one side of the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// 1-based line number, contiguous per side. A line present only on
    /// one side does not consume a number on the other.
    pub line_number: u32,
    /// Concatenation of the segment texts, in order.
    pub content: String,
    /// `Unchanged` iff every segment is unchanged, otherwise the side's
    /// changed kind.
    pub kind: SegmentKind,
    /// Ordered segments making up the line.
    pub segments: Segments,
}

impl DiffLine {
    /// Build a line from its segments, deriving `content` and `kind`.
    #[must_use]
    pub fn from_segments(line_number: u32, side: Side, segments: Segments) -> Self {
        debug_assert!(!segments.is_empty(), "a line always carries a segment");
        let content: String = segments.iter().map(|s| s.text.as_str()).collect();
        let kind = if segments.iter().all(|s| s.kind == SegmentKind::Unchanged) {
            SegmentKind::Unchanged
        } else {
            side.changed_kind()
        };
        Self {
            line_number,
            content,
            kind,
            segments,
        }
    }
}

/// The classified difference between one (left, right) text pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Lines of the left (original) text.
    pub left_lines: Vec<DiffLine>,
    /// Lines of the right (modified) text.
    pub right_lines: Vec<DiffLine>,
}

impl DiffResult {
    /// Whether both sides are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left_lines.is_empty() && self.right_lines.is_empty()
    }

    /// Lines for one side.
    #[must_use]
    pub fn side_lines(&self, side: Side) -> &[DiffLine] {
        match side {
            Side::Left => &self.left_lines,
            Side::Right => &self.right_lines,
        }
    }

    /// Reconstruct one side's source text by joining line contents.
    ///
    /// For any input pair this equals the original side text exactly.
    #[must_use]
    pub fn side_text(&self, side: Side) -> String {
        let lines = self.side_lines(side);
        let mut out = String::with_capacity(lines.iter().map(|l| l.content.len() + 1).sum());
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.content);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn changed_kind_per_side() {
        assert_eq!(Side::Left.changed_kind(), SegmentKind::Removed);
        assert_eq!(Side::Right.changed_kind(), SegmentKind::Added);
    }

    #[test]
    fn line_kind_unchanged_when_all_segments_unchanged() {
        let line = DiffLine::from_segments(
            1,
            Side::Left,
            smallvec![
                DiffSegment::new("foo", SegmentKind::Unchanged),
                DiffSegment::new("bar", SegmentKind::Unchanged),
            ],
        );
        assert_eq!(line.kind, SegmentKind::Unchanged);
        assert_eq!(line.content, "foobar");
    }

    #[test]
    fn line_kind_is_dominant_changed_kind() {
        let left = DiffLine::from_segments(
            3,
            Side::Left,
            smallvec![
                DiffSegment::new("keep ", SegmentKind::Unchanged),
                DiffSegment::new("gone", SegmentKind::Removed),
            ],
        );
        assert_eq!(left.kind, SegmentKind::Removed);

        let right = DiffLine::from_segments(
            3,
            Side::Right,
            smallvec![
                DiffSegment::new("keep ", SegmentKind::Unchanged),
                DiffSegment::new("new", SegmentKind::Added),
            ],
        );
        assert_eq!(right.kind, SegmentKind::Added);
    }

    #[test]
    fn side_text_joins_with_newlines() {
        let result = DiffResult {
            left_lines: vec![
                DiffLine::from_segments(
                    1,
                    Side::Left,
                    smallvec![DiffSegment::new("a", SegmentKind::Unchanged)],
                ),
                DiffLine::from_segments(
                    2,
                    Side::Left,
                    smallvec![DiffSegment::new("", SegmentKind::Unchanged)],
                ),
            ],
            right_lines: vec![],
        };
        assert_eq!(result.side_text(Side::Left), "a\n");
        assert_eq!(result.side_text(Side::Right), "");
    }

    #[test]
    fn empty_result_is_empty() {
        assert!(DiffResult::default().is_empty());
    }
}
