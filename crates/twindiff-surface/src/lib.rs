#![forbid(unsafe_code)]

//! Editable structured text surfaces for twindiff.
//!
//! A pane's visible content is a flat sequence of text runs and
//! line-break markers. This crate provides:
//! - [`runs`] - the run structure and its construction from classified
//!   diff lines
//! - [`surface`] - the [`StructuredSurface`] capability trait plus
//!   [`RunSurface`], an in-memory implementation with grapheme-aware
//!   editing operations
//! - [`reconcile`] - the cursor-preserving [`Reconciler`] that re-applies
//!   a new classification into a live surface without disturbing the
//!   caret or stealing focus
//!
//! The reconciler is written against the trait, so any structured text
//! surface (retained-mode tree, rope, terminal pane) with these
//! capabilities can host the highlights.

pub mod reconcile;
pub mod runs;
pub mod surface;

pub use reconcile::Reconciler;
pub use runs::{Run, RunNode, build_runs};
pub use surface::{RunSurface, StructuredSurface, SurfaceError};
