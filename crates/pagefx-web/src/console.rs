//! Routing `tracing` output and panics to the browser console.
//!
//! The fmt layer writes formatted events through [`ConsoleWriter`], which
//! buffers bytes until a newline and hands each complete line to a sink
//! together with the console method matching the event level. In the
//! browser the sink is `console.debug` / `info` / `warn` / `error`; tests
//! plug in a capturing sink.

use std::io;

use tracing::level_filters::LevelFilter;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Console method a line is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleLevel {
    Log,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&Level> for ConsoleLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::TRACE | Level::DEBUG => Self::Debug,
            Level::INFO => Self::Info,
            Level::WARN => Self::Warn,
            Level::ERROR => Self::Error,
        }
    }
}

/// Receives one complete line.
pub type ConsoleSink = fn(ConsoleLevel, &str);

/// Accumulates bytes and yields complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return every line they complete, without the
    /// terminator (`\n` or `\r\n`).
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\n' {
                lines.push(self.take_line());
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// The unterminated remainder, if any.
    pub fn finish(&mut self) -> Option<String> {
        (!self.pending.is_empty()).then(|| self.take_line())
    }

    fn take_line(&mut self) -> String {
        if self.pending.last() == Some(&b'\r') {
            self.pending.pop();
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        line
    }
}

/// `io::Write` adapter that emits complete lines to a [`ConsoleSink`].
/// Any partial line is emitted on drop.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: ConsoleLevel,
    sink: ConsoleSink,
    buffer: LineBuffer,
}

impl ConsoleWriter {
    #[must_use]
    pub fn new(level: ConsoleLevel, sink: ConsoleSink) -> Self {
        Self {
            level,
            sink,
            buffer: LineBuffer::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for line in self.buffer.push(buf) {
            (self.sink)(self.level, &line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(line) = self.buffer.finish() {
            (self.sink)(self.level, &line);
        }
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

/// [`MakeWriter`] producing a [`ConsoleWriter`] per event, with the
/// console method chosen from the event level.
#[derive(Debug, Clone, Copy)]
pub struct MakeConsoleWriter {
    sink: ConsoleSink,
}

impl MakeConsoleWriter {
    #[must_use]
    pub const fn new(sink: ConsoleSink) -> Self {
        Self { sink }
    }
}

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(ConsoleLevel::Log, self.sink)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(ConsoleLevel::from(meta.level()), self.sink)
    }
}

/// Install a global fmt subscriber writing to `sink`. Returns `false` when
/// a global subscriber is already set.
pub fn init_logging(sink: ConsoleSink, max_level: LevelFilter) -> bool {
    tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .with_max_level(max_level)
        .with_writer(MakeConsoleWriter::new(sink))
        .try_init()
        .is_ok()
}

/// Parse a level name (`"trace"` … `"error"`, `"off"`), case-insensitive.
#[must_use]
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// Text written to `console.error` for a panic.
#[must_use]
pub fn panic_message(location: Option<(&str, u32, u32)>, payload: &str) -> String {
    match location {
        Some((file, line, column)) => format!("panic at {file}:{line}:{column}: {payload}"),
        None => format!("panic: {payload}"),
    }
}
