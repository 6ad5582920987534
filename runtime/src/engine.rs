//! Embedding engine: compiles a module, links the `drac` host functions,
//! and drives the entry point.
//!
//! Every run gets its own [`Session`] inside its own wasmtime store, so
//! separate runs never observe each other's arrays.

use std::path::Path;

use wasmtime::{Config, Engine, Linker, Module, Store, Trap, Val};

use crate::error::{Fatal, RuntimeError};
use crate::host;
use crate::session::Session;
use crate::RuntimeConfig;

/// A configured engine with the host functions already linked.
pub struct Runtime {
    /// Runtime configuration.
    config: RuntimeConfig,

    engine: Engine,

    linker: Linker<Session>,
}

impl Runtime {
    /// Create a runtime with the given configuration.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let mut wasm_config = Config::new();
        wasm_config.consume_fuel(config.consume_fuel);
        wasm_config.max_wasm_stack(config.max_wasm_stack);

        let engine =
            Engine::new(&wasm_config).map_err(|e| RuntimeError::Config(e.to_string()))?;

        let mut linker = Linker::new(&engine);
        host::register(&mut linker).map_err(|e| RuntimeError::Config(e.to_string()))?;

        log::debug!(
            "[drac engine] ready (entry={}, fuel={:?})",
            config.entry_point,
            config.consume_fuel.then_some(config.fuel)
        );

        Ok(Runtime {
            config,
            engine,
            linker,
        })
    }

    /// Get the runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Compile a module from binary wasm or WAT text.
    pub fn load(&self, bytes: &[u8]) -> Result<Module, RuntimeError> {
        let module =
            Module::new(&self.engine, bytes).map_err(|e| RuntimeError::Compile(format!("{e:#}")))?;
        self.check_imports(&module)?;
        Ok(module)
    }

    /// Read and compile a module file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Module, RuntimeError> {
        let path = path.as_ref();
        log::debug!("[drac engine] loading {}", path.display());
        let bytes = std::fs::read(path)?;
        self.load(&bytes)
    }

    /// Reject imports the host does not provide.
    ///
    /// Signature mismatches on known names are left to the linker.
    pub fn check_imports(&self, module: &Module) -> Result<(), RuntimeError> {
        for import in module.imports() {
            if import.module() != host::NAMESPACE || host::lookup(import.name()).is_none() {
                return Err(RuntimeError::UnknownImport {
                    module: import.module().to_string(),
                    name: import.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Instantiate `module` and call its entry point with no arguments.
    ///
    /// Output is flushed on every path, including failures, so whatever the
    /// module printed before dying is not lost. The session is handed back
    /// on success so callers can inspect the final heap.
    pub fn run(&self, module: &Module, session: Session) -> Result<Session, RuntimeError> {
        let mut store = Store::new(&self.engine, session);
        if self.config.consume_fuel {
            store
                .set_fuel(self.config.fuel)
                .map_err(|e| RuntimeError::Config(e.to_string()))?;
        }

        let result = self.call_entry(&mut store, module);

        let mut session = store.into_data();
        let flushed = session.finish();
        result?;
        flushed?;
        Ok(session)
    }

    fn call_entry(&self, store: &mut Store<Session>, module: &Module) -> Result<(), RuntimeError> {
        let instance = self
            .linker
            .instantiate(&mut *store, module)
            .map_err(|e| RuntimeError::Instantiate(format!("{e:#}")))?;

        let name = &self.config.entry_point;
        let entry = instance
            .get_func(&mut *store, name)
            .ok_or_else(|| RuntimeError::MissingEntryPoint { name: name.clone() })?;

        // Whatever the entry point returns is discarded.
        let mut results = vec![Val::I32(0); entry.ty(&*store).results().len()];

        log::debug!("[drac engine] calling {}", name);
        entry
            .call(&mut *store, &[], &mut results)
            .map_err(map_trap)
    }
}

/// Classify an error surfaced by a call into the module.
fn map_trap(err: wasmtime::Error) -> RuntimeError {
    let err = match err.downcast::<Fatal>() {
        Ok(fatal) => {
            log::debug!("[drac engine] run aborted: {}", fatal);
            return RuntimeError::Fatal(fatal);
        }
        Err(err) => err,
    };

    match err.downcast_ref::<Trap>() {
        Some(Trap::OutOfFuel) => RuntimeError::OutOfFuel,
        Some(trap) => RuntimeError::Trap(trap.to_string()),
        None => RuntimeError::Trap(format!("{err:#}")),
    }
}
