#![forbid(unsafe_code)]

//! twindiff public facade crate.
//!
//! Re-exports the common types from the internal crates and offers a
//! lightweight prelude: a pure diff engine ([`compute_diff`]), a
//! debounced background recompute service ([`DiffService`]), and a
//! cursor-preserving highlight reconciler ([`Reconciler`]) over editable
//! structured surfaces.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use twindiff_core::{
    DiffError, DiffLine, DiffResult, DiffSegment, EditScript, InlineDiff, OpTag, ScriptOp,
    SegmentKind, Side, compute_diff, compute_inline_diff,
};

// --- Runtime re-exports ----------------------------------------------------

pub use twindiff_runtime::{ChangeKind, DiffService, RecomputeScheduler, SchedulerConfig};

// --- Surface re-exports ----------------------------------------------------

pub use twindiff_surface::{
    Reconciler, Run, RunNode, RunSurface, StructuredSurface, SurfaceError, build_runs,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for twindiff applications.
#[derive(Debug)]
pub enum Error {
    /// I/O failure (terminal, log file).
    Io(std::io::Error),
    /// Diff computation failure.
    Diff(DiffError),
    /// Surface failure.
    Surface(SurfaceError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Diff(err) => write!(f, "{err}"),
            Self::Surface(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Diff(err) => Some(err),
            Self::Surface(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<DiffError> for Error {
    fn from(err: DiffError) -> Self {
        Self::Diff(err)
    }
}

impl From<SurfaceError> for Error {
    fn from(err: SurfaceError) -> Self {
        Self::Surface(err)
    }
}

/// Standard result type for twindiff APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ChangeKind, DiffResult, DiffService, Error, Reconciler, Result, RunSurface,
        SchedulerConfig, SegmentKind, Side, StructuredSurface, compute_diff,
    };

    pub use crate::{core, runtime, surface};
}

pub use twindiff_core as core;
pub use twindiff_runtime as runtime;
pub use twindiff_surface as surface;
