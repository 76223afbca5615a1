#![forbid(unsafe_code)]

//! Diff computation core for twindiff.
//!
//! This crate turns two text snapshots into a per-line, per-segment
//! classification of differences suitable for inline highlighting:
//! - [`model`] - the classified output types ([`DiffSegment`], [`DiffLine`],
//!   [`DiffResult`])
//! - [`script`] - character-level edit scripts over an LCS differencer
//! - [`cleanup`] - semantic simplification of raw edit scripts
//! - [`classify`] - line/segment decomposition of a cleaned script
//! - [`engine`] - the public [`compute_diff`] entry point
//!
//! # Example
//! ```
//! use twindiff_core::{compute_diff, SegmentKind};
//!
//! let result = compute_diff("a\nb\nc", "a\nx\nc").unwrap();
//! assert_eq!(result.left_lines.len(), 3);
//! assert_eq!(result.left_lines[1].kind, SegmentKind::Removed);
//! assert_eq!(result.right_lines[1].content, "x");
//! ```
//!
//! All computation is pure and deterministic: the same input pair always
//! produces the same [`DiffResult`].

pub mod classify;
pub mod cleanup;
pub mod engine;
pub mod model;
pub mod script;

pub use engine::{InlineDiff, compute_diff, compute_inline_diff};
pub use model::{DiffLine, DiffResult, DiffSegment, SegmentKind, Side};
pub use script::{DiffError, EditScript, OpTag, ScriptOp};
