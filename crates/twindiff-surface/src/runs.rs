#![forbid(unsafe_code)]

//! Run structure of a pane's visible content.
//!
//! Content is a flat sequence of [`RunNode`]s: text runs tagged with a
//! [`SegmentKind`] (unchanged text renders plain, added/removed text
//! renders highlighted) and line-break markers. Run text never contains a
//! line break - breaks are explicit nodes, and each counts as one
//! character in absolute offsets.

use twindiff_core::{DiffLine, SegmentKind};

/// A contiguous piece of single-line text with one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// The text. Never contains `\n`.
    pub text: String,
    /// `Unchanged` renders plain; `Added`/`Removed` render highlighted.
    pub kind: SegmentKind,
}

impl Run {
    /// Create a run.
    #[must_use]
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        let text = text.into();
        debug_assert!(!text.contains('\n'), "runs never span line breaks");
        Self { text, kind }
    }

    /// Length in chars.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// One node of a surface's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunNode {
    /// A piece of text.
    Run(Run),
    /// A line break (one character, `\n`, in absolute offsets).
    Break,
}

impl RunNode {
    /// Length in chars.
    #[must_use]
    pub fn char_len(&self) -> usize {
        match self {
            RunNode::Run(run) => run.char_len(),
            RunNode::Break => 1,
        }
    }
}

/// Build the run structure for one side's classified lines.
///
/// One run per non-empty segment, a [`RunNode::Break`] between lines and
/// none after the final line. The concatenated text equals the side's
/// source text.
#[must_use]
pub fn build_runs(lines: &[DiffLine]) -> Vec<RunNode> {
    let mut nodes = Vec::with_capacity(lines.len() * 2);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            nodes.push(RunNode::Break);
        }
        for segment in &line.segments {
            if !segment.text.is_empty() {
                nodes.push(RunNode::Run(Run::new(segment.text.clone(), segment.kind)));
            }
        }
    }
    nodes
}

/// Concatenate node text (breaks become `\n`).
#[must_use]
pub fn nodes_text(nodes: &[RunNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            RunNode::Run(run) => out.push_str(&run.text),
            RunNode::Break => out.push('\n'),
        }
    }
    out
}

/// Total length in chars.
#[must_use]
pub fn nodes_char_len(nodes: &[RunNode]) -> usize {
    nodes.iter().map(RunNode::char_len).sum()
}
