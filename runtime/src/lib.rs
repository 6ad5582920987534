//! Drac WASM host runtime
//!
//! Compiled Drac programs are WebAssembly modules that cannot allocate,
//! grow collections, or perform I/O on their own. They import a fixed set of
//! eleven host functions from the `drac` namespace instead; this crate
//! provides those functions and the heap they manage.
//!
//! # Architecture
//!
//! - `heap`: Append-only handle table of integer arrays
//! - `console`: Line-oriented stdin/stdout streams (or in-memory stand-ins)
//! - `session`: Per-run host state (heap + console) and the function semantics
//! - `host`: The `drac` import ABI table and wasmtime registration
//! - `engine`: Module loading, import checking, entry-point execution
//! - `error`: Fatal host errors and engine errors
//!
//! A host function that hits an invalid handle, an out-of-bounds index, or a
//! negative array size does not return to the module. It raises a
//! [`Fatal`](error::Fatal) that unwinds the whole run; the embedder reports
//! it and exits with a non-zero status.

pub mod console;
pub mod engine;
pub mod error;
pub mod heap;
pub mod host;
pub mod session;

use std::path::Path;

pub use console::{Capture, Console};
pub use engine::Runtime;
pub use error::{Fatal, FatalKind, HeapError, RuntimeError};
pub use heap::{Handle, HandleTable};
pub use session::Session;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Exported function called to start the program.
    pub entry_point: String,
    /// Enable fuel-based execution limiting.
    pub consume_fuel: bool,
    /// Fuel granted to each run when limiting is enabled.
    pub fuel: u64,
    /// Maximum WASM stack size in bytes.
    pub max_wasm_stack: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            entry_point: String::from("main"),
            consume_fuel: false,
            fuel: 1_000_000,
            max_wasm_stack: 512 * 1024, // 512 KB
        }
    }
}

/// Load and run a module file against process stdio.
pub fn execute_file(path: impl AsRef<Path>, config: RuntimeConfig) -> Result<(), RuntimeError> {
    let runtime = Runtime::new(config)?;
    let module = runtime.load_file(path)?;
    runtime.run(&module, Session::stdio())?;
    Ok(())
}

/// Run a module given as WAT text or binary against a scripted console.
///
/// Returns everything the module wrote. Output produced before a fatal error
/// is discarded along with the error; use [`Runtime::run`] with a
/// [`Capture`] to keep it.
pub fn execute_scripted(wasm: &[u8], input: &str) -> Result<String, RuntimeError> {
    let runtime = Runtime::new(RuntimeConfig::default())?;
    let module = runtime.load(wasm)?;
    let (console, output) = Console::scripted(input);
    runtime.run(&module, Session::new(console))?;
    Ok(output.contents())
}
