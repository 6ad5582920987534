//! `drac` host function bindings.
//!
//! Compiled Drac modules import eleven functions from the `drac` namespace.
//! The table below is the ABI those modules are built against: names,
//! parameter counts, and result arity must match byte for byte, with every
//! value an `i32`.

use wasmtime::{Caller, Linker, Result};

use crate::session::Session;

/// Import namespace shared by every host function.
pub const NAMESPACE: &str = "drac";

/// Signature of one imported host function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFunction {
    /// Import name inside [`NAMESPACE`].
    pub name: &'static str,
    /// Number of `i32` parameters.
    pub params: usize,
    /// Whether the function produces one `i32` result.
    pub returns_value: bool,
}

const fn host(name: &'static str, params: usize, returns_value: bool) -> HostFunction {
    HostFunction {
        name,
        params,
        returns_value,
    }
}

/// The full import surface, in declaration order.
pub const API: [HostFunction; 11] = [
    host("printi", 1, true),
    host("printc", 1, true),
    host("prints", 1, true),
    host("println", 0, true),
    host("readi", 0, true),
    host("reads", 0, true),
    host("new", 1, true),
    host("size", 1, true),
    host("add", 2, true),
    host("get", 2, true),
    host("set", 3, false),
];

/// Look up a host function by import name.
pub fn lookup(name: &str) -> Option<&'static HostFunction> {
    API.iter().find(|f| f.name == name)
}

impl HostFunction {
    /// WAT import declaration for this function.
    pub fn import_decl(&self) -> String {
        let mut decl = format!("(import \"{}\" \"{}\" (func ${}", NAMESPACE, self.name, self.name);
        if self.params > 0 {
            decl.push_str(" (param");
            for _ in 0..self.params {
                decl.push_str(" i32");
            }
            decl.push(')');
        }
        if self.returns_value {
            decl.push_str(" (result i32)");
        }
        decl.push_str("))");
        decl
    }
}

/// Import block a compiler places at the top of every emitted module.
pub fn import_preamble() -> String {
    API.iter()
        .map(|func| func.import_decl() + "\n")
        .collect()
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Register all `drac` host functions.
///
/// A [`crate::error::Fatal`] returned by a session method leaves the host
/// function as the error value of the trap; the engine recovers it by
/// downcasting.
pub fn register(linker: &mut Linker<Session>) -> Result<()> {
    register_output(linker)?;
    register_input(linker)?;
    register_arrays(linker)?;
    log::debug!("[drac host] registered {} functions", API.len());
    Ok(())
}

fn register_output(linker: &mut Linker<Session>) -> Result<()> {
    linker.func_wrap(NAMESPACE, "printi", |mut caller: Caller<'_, Session>, i: i32| -> Result<i32> {
        Ok(caller.data_mut().printi(i)?)
    })?;
    linker.func_wrap(NAMESPACE, "printc", |mut caller: Caller<'_, Session>, c: i32| -> Result<i32> {
        Ok(caller.data_mut().printc(c)?)
    })?;
    linker.func_wrap(NAMESPACE, "prints", |mut caller: Caller<'_, Session>, s: i32| -> Result<i32> {
        Ok(caller.data_mut().prints(s)?)
    })?;
    linker.func_wrap(NAMESPACE, "println", |mut caller: Caller<'_, Session>| -> Result<i32> {
        Ok(caller.data_mut().println()?)
    })?;
    Ok(())
}

fn register_input(linker: &mut Linker<Session>) -> Result<()> {
    linker.func_wrap(NAMESPACE, "readi", |mut caller: Caller<'_, Session>| -> Result<i32> {
        Ok(caller.data_mut().readi()?)
    })?;
    linker.func_wrap(NAMESPACE, "reads", |mut caller: Caller<'_, Session>| -> Result<i32> {
        Ok(caller.data_mut().reads()?)
    })?;
    Ok(())
}

fn register_arrays(linker: &mut Linker<Session>) -> Result<()> {
    linker.func_wrap(NAMESPACE, "new", |mut caller: Caller<'_, Session>, n: i32| -> Result<i32> {
        Ok(caller.data_mut().new_array(n)?)
    })?;
    linker.func_wrap(NAMESPACE, "size", |caller: Caller<'_, Session>, h: i32| -> Result<i32> {
        Ok(caller.data().size(h)?)
    })?;
    linker.func_wrap(
        NAMESPACE,
        "add",
        |mut caller: Caller<'_, Session>, h: i32, x: i32| -> Result<i32> {
            Ok(caller.data_mut().add(h, x)?)
        },
    )?;
    linker.func_wrap(
        NAMESPACE,
        "get",
        |caller: Caller<'_, Session>, h: i32, i: i32| -> Result<i32> {
            Ok(caller.data().get(h, i)?)
        },
    )?;
    linker.func_wrap(
        NAMESPACE,
        "set",
        |mut caller: Caller<'_, Session>, h: i32, i: i32, x: i32| -> Result<()> {
            Ok(caller.data_mut().set(h, i, x)?)
        },
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
