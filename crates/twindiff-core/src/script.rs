#![forbid(unsafe_code)]

//! Character-level edit scripts.
//!
//! An [`EditScript`] is an ordered sequence of equal/delete/insert
//! operations whose equal+delete texts concatenate to the left input and
//! whose equal+insert texts concatenate to the right input. Scripts are
//! produced by the `similar` Myers differencer and validated against that
//! reconstruction invariant before any downstream pass consumes them: a
//! differencer that returns an inconsistent script fails the computation
//! rather than producing a corrupt classification.

use std::fmt;

use similar::{Algorithm, ChangeTag, TextDiff};

use crate::model::Side;

/// Operation tag in an edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    /// Text present on both sides.
    Equal,
    /// Text present only on the left side.
    Delete,
    /// Text present only on the right side.
    Insert,
}

impl OpTag {
    /// Whether an operation with this tag contributes to `side`'s text.
    #[must_use]
    pub fn applies_to(self, side: Side) -> bool {
        match self {
            Self::Equal => true,
            Self::Delete => side == Side::Left,
            Self::Insert => side == Side::Right,
        }
    }
}

/// One operation of an edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOp {
    /// What the operation does.
    pub tag: OpTag,
    /// The text it covers. May span line breaks.
    pub text: String,
}

impl ScriptOp {
    /// Create an operation.
    #[must_use]
    pub fn new(tag: OpTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }
}

/// Errors raised by diff computation.
#[derive(Debug)]
pub enum DiffError {
    /// The external differencer produced a script that does not
    /// reconstruct the named side's input text.
    InconsistentScript {
        /// The side whose reconstruction failed.
        side: Side,
    },
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffError::InconsistentScript { side } => {
                write!(f, "edit script does not reconstruct the {side:?} text")
            }
        }
    }
}

impl std::error::Error for DiffError {}

/// An ordered sequence of [`ScriptOp`]s over one text pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    ops: Vec<ScriptOp>,
}

impl EditScript {
    /// Compute a character-level script for `(left, right)`.
    ///
    /// Runs the Myers LCS differencer over characters and groups
    /// consecutive same-tag changes into operations. Within a replacement
    /// hunk, deletions precede insertions.
    #[must_use]
    pub fn from_texts(left: &str, right: &str) -> Self {
        let diff = TextDiff::configure()
            .algorithm(Algorithm::Myers)
            .diff_chars(left, right);

        let mut ops: Vec<ScriptOp> = Vec::new();
        for change in diff.iter_all_changes() {
            let tag = match change.tag() {
                ChangeTag::Equal => OpTag::Equal,
                ChangeTag::Delete => OpTag::Delete,
                ChangeTag::Insert => OpTag::Insert,
            };
            match ops.last_mut() {
                Some(last) if last.tag == tag => last.text.push_str(change.value()),
                _ => ops.push(ScriptOp::new(tag, change.value())),
            }
        }
        Self { ops }
    }

    /// Wrap an existing operation sequence.
    #[must_use]
    pub fn from_ops(ops: Vec<ScriptOp>) -> Self {
        Self { ops }
    }

    /// The operations, in order.
    #[must_use]
    pub fn ops(&self) -> &[ScriptOp] {
        &self.ops
    }

    /// Consume the script, returning its operations.
    #[must_use]
    pub fn into_ops(self) -> Vec<ScriptOp> {
        self.ops
    }

    /// Reconstruct one side's text from the script.
    #[must_use]
    pub fn side_text(&self, side: Side) -> String {
        let mut out = String::new();
        for op in &self.ops {
            if op.tag.applies_to(side) {
                out.push_str(&op.text);
            }
        }
        out
    }

    /// Verify the reconstruction invariant against the source texts.
    pub fn validate(&self, left: &str, right: &str) -> Result<(), DiffError> {
        if self.side_text(Side::Left) != left {
            return Err(DiffError::InconsistentScript { side: Side::Left });
        }
        if self.side_text(Side::Right) != right {
            return Err(DiffError::InconsistentScript { side: Side::Right });
        }
        Ok(())
    }
}
