//! Line-oriented console streams used by the I/O host functions.
//!
//! A [`Console`] pairs one input and one output stream. Production runs
//! bind it to the process stdio; tests bind it to an in-memory script and a
//! [`Capture`] sink.

use std::fmt;
use std::io::{self, BufRead, BufReader, Cursor, Write};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use spin::Mutex;

use crate::error::FatalKind;

/// Lines `readi` accepts: an optionally negative run of decimal digits,
/// surrounded by any amount of whitespace.
///
/// Digits are ASCII only. Other Unicode decimal digits (`"١٢"`) do not
/// match, so such a line is skipped rather than read as a number.
const INT_LINE_PATTERN: &str = r"^\s*-?[0-9]+\s*$";

static INT_LINE: OnceLock<Regex> = OnceLock::new();

fn int_line_regex() -> &'static Regex {
    INT_LINE.get_or_init(|| Regex::new(INT_LINE_PATTERN).expect("integer line pattern is valid"))
}

/// Parse one `readi` input line.
///
/// Returns `None` for anything that does not match the integer pattern or
/// does not fit in `i32`; the caller retries with the next line.
pub fn parse_int_line(line: &str) -> Option<i32> {
    if !int_line_regex().is_match(line) {
        return None;
    }
    line.trim().parse().ok()
}

/// Input and output streams for one session.
pub struct Console {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl Console {
    /// Bind to arbitrary streams.
    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Console {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// Bind to the process standard input and output.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }

    /// Feed `input` as the console input and capture everything written.
    pub fn scripted(input: &str) -> (Self, Capture) {
        Self::scripted_bytes(input.as_bytes())
    }

    /// Like [`Console::scripted`], for input that need not be UTF-8.
    pub fn scripted_bytes(input: &[u8]) -> (Self, Capture) {
        let capture = Capture::new();
        let console = Self::new(Cursor::new(input.to_vec()), capture.clone());
        (console, capture)
    }

    /// Write text without a trailing newline.
    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())
    }

    /// Flush pending output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }

    /// Read one line, without its terminator.
    ///
    /// Pending output is flushed first so a prompt written just before the
    /// read is visible. Running out of input is fatal. Bytes that are not
    /// valid UTF-8 decode to U+FFFD.
    pub fn read_line(&mut self) -> Result<String, FatalKind> {
        self.flush()?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Err(FatalKind::EndOfInput);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Cloneable in-memory output sink.
///
/// Every clone appends to the same buffer, so a test can keep one clone
/// while the session owns another.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    /// Text written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
