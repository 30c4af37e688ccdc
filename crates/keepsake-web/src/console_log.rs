#![forbid(unsafe_code)]

//! `tracing` output routed to the browser console.
//!
//! [`ConsoleMakeWriter`] plugs into `tracing_subscriber::fmt`: each event is
//! formatted into a buffer and handed to a sink on drop, together with the
//! console method matching the event's level. In the browser the sink calls
//! `console.log/warn/error`; tests inject their own.

use std::io;
use std::sync::Arc;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Console method an event is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMethod {
    Log,
    Warn,
    Error,
}

impl ConsoleMethod {
    #[must_use]
    pub fn for_level(level: &Level) -> Self {
        if *level == Level::ERROR {
            Self::Error
        } else if *level == Level::WARN {
            Self::Warn
        } else {
            Self::Log
        }
    }
}

type Sink = Arc<dyn Fn(ConsoleMethod, &str) + Send + Sync>;

/// `MakeWriter` producing one [`ConsoleWriter`] per event.
#[derive(Clone)]
pub struct ConsoleMakeWriter {
    sink: Sink,
}

impl ConsoleMakeWriter {
    /// Route formatted lines to an arbitrary sink.
    pub fn with_sink(sink: impl Fn(ConsoleMethod, &str) + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Route formatted lines to the browser console.
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub fn console() -> Self {
        Self::with_sink(|method, line| {
            let line = wasm_bindgen::JsValue::from_str(line);
            match method {
                ConsoleMethod::Log => web_sys::console::log_1(&line),
                ConsoleMethod::Warn => web_sys::console::warn_1(&line),
                ConsoleMethod::Error => web_sys::console::error_1(&line),
            }
        })
    }
}

impl std::fmt::Debug for ConsoleMakeWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleMakeWriter").finish_non_exhaustive()
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(ConsoleMethod::Log, Arc::clone(&self.sink))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(ConsoleMethod::for_level(meta.level()), Arc::clone(&self.sink))
    }
}

/// Buffers one formatted event and emits it on drop.
pub struct ConsoleWriter {
    method: ConsoleMethod,
    buffer: Vec<u8>,
    sink: Sink,
}

impl ConsoleWriter {
    fn new(method: ConsoleMethod, sink: Sink) -> Self {
        Self {
            method,
            buffer: Vec::with_capacity(128),
            sink,
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buffer);
        (self.sink)(self.method, text.trim_end_matches('\n'));
    }
}

/// One-line panic report for the console.
#[must_use]
pub fn panic_line(message: &str, location: Option<(&str, u32)>) -> String {
    match location {
        Some((file, line)) => format!("keepsake panicked at {file}:{line}: {message}"),
        None => format!("keepsake panicked: {message}"),
    }
}

/// Install a console-backed fmt subscriber (no timestamps, no ANSI).
///
/// A subscriber that is already installed is left in place.
#[cfg(target_arch = "wasm32")]
pub fn init(max_level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter::console())
        .with_max_level(max_level)
        .with_ansi(false)
        .without_time()
        .try_init();
}
