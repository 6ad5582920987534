//! Per-run host state.
//!
//! A [`Session`] is everything the host functions touch while one module
//! runs: the handle table and the console. It is owned by the wasmtime
//! store, so separate runs never share arrays or streams.

use crate::console::Console;
use crate::error::{Fatal, FatalKind};
use crate::heap::{Handle, HandleTable};

const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Host state for one module execution.
#[derive(Debug)]
pub struct Session {
    heap: HandleTable,
    console: Console,
}

impl Session {
    /// Create a session with an empty heap.
    pub fn new(console: Console) -> Self {
        Session {
            heap: HandleTable::new(),
            console,
        }
    }

    /// Create a session bound to process stdio.
    pub fn stdio() -> Self {
        Self::new(Console::stdio())
    }

    /// The handle table.
    pub fn heap(&self) -> &HandleTable {
        &self.heap
    }

    /// Mutable access to the handle table.
    pub fn heap_mut(&mut self) -> &mut HandleTable {
        &mut self.heap
    }

    /// Flush pending output at the end of a run.
    pub fn finish(&mut self) -> Result<(), Fatal> {
        self.console.flush().map_err(|e| Fatal::new("finish", e))
    }

    // ── Output ───────────────────────────────────────────────────────

    /// printi(i) -> 0
    pub fn printi(&mut self, i: i32) -> Result<i32, Fatal> {
        self.write("printi", &i.to_string())?;
        Ok(0)
    }

    /// printc(c) -> 0
    pub fn printc(&mut self, c: i32) -> Result<i32, Fatal> {
        let ch = code_point(c);
        self.write("printc", ch.encode_utf8(&mut [0; 4]))?;
        Ok(0)
    }

    /// prints(s) -> 0
    pub fn prints(&mut self, s: Handle) -> Result<i32, Fatal> {
        let text: String = self
            .heap
            .array(s)
            .map_err(|e| Fatal::new("prints", e))?
            .iter()
            .map(|&c| code_point(c))
            .collect();
        self.write("prints", &text)?;
        Ok(0)
    }

    /// println() -> 0
    pub fn println(&mut self) -> Result<i32, Fatal> {
        self.write("println", "\n")?;
        Ok(0)
    }

    // ── Input ────────────────────────────────────────────────────────

    /// readi() -> integer
    ///
    /// Keeps consuming lines until one holds a valid integer.
    pub fn readi(&mut self) -> Result<i32, Fatal> {
        loop {
            let line = self.read_line("readi")?;
            match crate::console::parse_int_line(&line) {
                Some(value) => return Ok(value),
                None => log::debug!("[drac host] readi: retrying after {:?}", line),
            }
        }
    }

    /// reads() -> handle of the code points of one input line
    pub fn reads(&mut self) -> Result<Handle, Fatal> {
        let line = self.read_line("reads")?;
        let contents = line.chars().map(|c| c as i32).collect();
        Ok(self.heap.allocate(contents))
    }

    // ── Arrays ───────────────────────────────────────────────────────

    /// new(n) -> handle of `n` zeroes
    pub fn new_array(&mut self, n: i32) -> Result<Handle, Fatal> {
        self.heap
            .allocate_zeroed(n)
            .map_err(|e| Fatal::new("new", e))
    }

    /// size(h) -> element count
    pub fn size(&self, h: Handle) -> Result<i32, Fatal> {
        self.heap.size(h).map_err(|e| Fatal::new("size", e))
    }

    /// add(h, x) -> 0
    pub fn add(&mut self, h: Handle, x: i32) -> Result<i32, Fatal> {
        self.heap.push(h, x).map_err(|e| Fatal::new("add", e))?;
        Ok(0)
    }

    /// get(h, i) -> element
    pub fn get(&self, h: Handle, i: i32) -> Result<i32, Fatal> {
        self.heap.get(h, i).map_err(|e| Fatal::new("get", e))
    }

    /// set(h, i, x)
    pub fn set(&mut self, h: Handle, i: i32, x: i32) -> Result<(), Fatal> {
        self.heap.set(h, i, x).map_err(|e| Fatal::new("set", e))
    }

    fn write(&mut self, function: &'static str, text: &str) -> Result<(), Fatal> {
        self.console
            .write_str(text)
            .map_err(|e| Fatal::new(function, e))
    }

    fn read_line(&mut self, function: &'static str) -> Result<String, Fatal> {
        self.console
            .read_line()
            .map_err(|kind: FatalKind| Fatal::new(function, kind))
    }
}

/// Character for a module-supplied code point.
///
/// Values that are not Unicode scalar values have no textual form; they are
/// written as U+FFFD.
fn code_point(c: i32) -> char {
    u32::try_from(c)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or_else(|| {
            log::warn!("[drac host] invalid code point {}", c);
            REPLACEMENT
        })
}
