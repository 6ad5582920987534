use std::path::PathBuf;

use clap::Parser;
use drac_runtime::RuntimeConfig;

/// Run a compiled Drac program (.wasm or .wat) against the `drac` host functions.
#[derive(Parser, Debug)]
#[command(name = "drac-run", version, about)]
pub struct Cli {
    /// Module to execute.
    #[arg(required_unless_present = "print_imports")]
    pub module: Option<PathBuf>,

    /// Exported function that starts the program.
    #[arg(long, default_value = "main")]
    pub entry: String,

    /// Abort after executing roughly this many instructions.
    #[arg(long)]
    pub fuel: Option<u64>,

    /// Maximum WASM stack size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_stack: Option<usize>,

    /// Print the import declarations a Drac module must use, then exit.
    #[arg(long)]
    pub print_imports: bool,
}

impl Cli {
    /// Runtime configuration selected by the flags.
    pub fn runtime_config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig {
            entry_point: self.entry.clone(),
            ..RuntimeConfig::default()
        };
        if let Some(fuel) = self.fuel {
            config.consume_fuel = true;
            config.fuel = fuel;
        }
        if let Some(bytes) = self.max_stack {
            config.max_wasm_stack = bytes;
        }
        config
    }
}
