//! Error taxonomy for the Drac host.
//!
//! Errors are split into two layers:
//! - [`Fatal`]: raised by a host function while the module is running. It is
//!   never handed back to module code; the embedding layer turns it into a
//!   diagnostic on stderr and a non-zero process exit.
//! - [`RuntimeError`]: everything the embedding layer itself can hit while
//!   loading, linking, or driving a module, with [`Fatal`] as one variant.

use std::process::ExitCode;

/// Admission-control failures of the handle table.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    #[error("Invalid array handle: {0}")]
    InvalidHandle(i32),

    #[error("Array index out of bounds: {0}")]
    IndexOutOfBounds(i32),

    #[error("Can't create a negative size array: {0}")]
    NegativeSize(i32),
}

/// What went wrong inside a host function.
#[derive(thiserror::Error, Debug)]
pub enum FatalKind {
    #[error(transparent)]
    Heap(#[from] HeapError),

    #[error("Unexpected end of input")]
    EndOfInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unrecoverable error raised by a host function.
///
/// Carries the name of the failing host function so the diagnostic can
/// identify it alongside the offending value.
#[derive(thiserror::Error, Debug)]
#[error("Runtime error in function {function}. {kind}")]
pub struct Fatal {
    pub function: &'static str,
    pub kind: FatalKind,
}

impl Fatal {
    pub fn new(function: &'static str, kind: impl Into<FatalKind>) -> Self {
        Fatal {
            function,
            kind: kind.into(),
        }
    }

    /// The heap error behind this failure, if it came from the handle table.
    pub fn heap_error(&self) -> Option<HeapError> {
        match self.kind {
            FatalKind::Heap(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors produced by the embedding engine.
///
/// Variants are split into two categories:
/// - **Load errors** (exit code 2): bad configuration, unreadable or invalid
///   module, imports the host cannot satisfy
/// - **Execution errors** (exit code 1): the module started and then failed
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    // ── Load errors (exit code 2) ────────────────────────────────────

    #[error("Engine configuration error: {0}")]
    Config(String),

    #[error("Failed to compile module: {0}")]
    Compile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown import: {module}.{name}")]
    UnknownImport { module: String, name: String },

    #[error("Failed to instantiate module: {0}")]
    Instantiate(String),

    #[error("Entry point not found: {name}")]
    MissingEntryPoint { name: String },

    // ── Execution errors (exit code 1) ───────────────────────────────

    #[error(transparent)]
    Fatal(#[from] Fatal),

    #[error("Execution ran out of fuel")]
    OutOfFuel,

    #[error("WebAssembly trap: {0}")]
    Trap(String),
}

impl RuntimeError {
    /// Map each error variant to its process exit code.
    ///
    /// - `2` — the module could not be loaded or linked
    /// - `1` — the module failed while running
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Raw numeric form of [`RuntimeError::exit_code`].
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config(_)
            | Self::Compile(_)
            | Self::Io(_)
            | Self::UnknownImport { .. }
            | Self::Instantiate(_)
            | Self::MissingEntryPoint { .. } => 2,

            Self::Fatal(_) | Self::OutOfFuel | Self::Trap(_) => 1,
        }
    }
}
