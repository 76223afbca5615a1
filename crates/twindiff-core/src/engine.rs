#![forbid(unsafe_code)]

//! The diff engine entry points.
//!
//! [`compute_diff`] is a pure, deterministic function of its two inputs.
//! Degenerate empty-side cases are handled by policy before the general
//! pipeline runs: differencer, script validation, semantic cleanup,
//! classification.

use smallvec::smallvec;

use crate::classify::classify;
use crate::cleanup::semantic_cleanup;
use crate::model::{DiffLine, DiffResult, DiffSegment, Side};
use crate::script::{DiffError, EditScript};

/// Compute the per-line classification of the differences between two
/// texts.
///
/// Edge cases, checked in order:
/// 1. both sides empty - an empty result;
/// 2. left empty - every right line is a single-segment added line;
/// 3. right empty - every left line is a single-segment removed line;
/// 4. otherwise the general character-level algorithm.
///
/// # Errors
///
/// [`DiffError::InconsistentScript`] when the external differencer
/// produces a script that fails the reconstruction check. The caller
/// should keep its previous result; this input pair cannot be classified.
pub fn compute_diff(left: &str, right: &str) -> Result<DiffResult, DiffError> {
    let _span = tracing::debug_span!(
        "compute_diff",
        left_bytes = left.len(),
        right_bytes = right.len()
    )
    .entered();

    if left.is_empty() && right.is_empty() {
        return Ok(DiffResult::default());
    }
    if left.is_empty() {
        return Ok(DiffResult {
            left_lines: Vec::new(),
            right_lines: whole_side_lines(right, Side::Right),
        });
    }
    if right.is_empty() {
        return Ok(DiffResult {
            left_lines: whole_side_lines(left, Side::Left),
            right_lines: Vec::new(),
        });
    }

    let script = EditScript::from_texts(left, right);
    script.validate(left, right)?;

    let cleaned = EditScript::from_ops(semantic_cleanup(script.into_ops()));
    debug_assert!(
        cleaned.validate(left, right).is_ok(),
        "semantic cleanup broke the reconstruction invariant"
    );

    let result = classify(&cleaned);
    tracing::trace!(
        left_lines = result.left_lines.len(),
        right_lines = result.right_lines.len(),
        "classified"
    );
    Ok(result)
}

/// Every line of a one-sided text, each a single segment of the side's
/// changed kind.
fn whole_side_lines(text: &str, side: Side) -> Vec<DiffLine> {
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            DiffLine::from_segments(
                idx as u32 + 1,
                side,
                smallvec![DiffSegment::new(line, side.changed_kind())],
            )
        })
        .collect()
}

/// Character-level classification of a single line pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineDiff {
    /// Segments of the left line (unchanged/removed).
    pub left: Vec<DiffSegment>,
    /// Segments of the right line (unchanged/added).
    pub right: Vec<DiffSegment>,
}

/// Diff two single lines into per-side segments.
///
/// Applies the same differencer and cleanup as [`compute_diff`] but skips
/// line decomposition; useful for refining a changed line pair in place.
#[must_use]
pub fn compute_inline_diff(left_line: &str, right_line: &str) -> InlineDiff {
    use crate::model::SegmentKind;
    use crate::script::OpTag;

    let ops = semantic_cleanup(EditScript::from_texts(left_line, right_line).into_ops());
    let mut inline = InlineDiff::default();
    for op in ops {
        match op.tag {
            OpTag::Equal => {
                inline
                    .left
                    .push(DiffSegment::new(op.text.clone(), SegmentKind::Unchanged));
                inline
                    .right
                    .push(DiffSegment::new(op.text, SegmentKind::Unchanged));
            }
            OpTag::Delete => inline
                .left
                .push(DiffSegment::new(op.text, SegmentKind::Removed)),
            OpTag::Insert => inline
                .right
                .push(DiffSegment::new(op.text, SegmentKind::Added)),
        }
    }
    inline
}
