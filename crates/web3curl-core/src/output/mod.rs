//! Streaming output sink.
//!
//! The first chunk decides where the body goes: a file, or the terminal. A
//! first chunk that does not decode as UTF-8 aborts terminal output unless
//! the user asked for it explicitly, so binary data never garbles the
//! terminal by accident. Later chunks follow the same route unchecked.

mod utf8;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;

use utf8::Utf8Stream;

/// `--output` value that forces terminal output.
pub const TERMINAL_OVERRIDE: &str = "-";

/// Where the body should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Terminal, guarded by the encoding safety check.
    Terminal,
    /// Terminal, explicitly requested; no safety check.
    ForceTerminal,
    File(PathBuf),
}

impl Destination {
    /// Destination for an optional `--output` argument.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => Destination::Terminal,
            Some(TERMINAL_OVERRIDE) => Destination::ForceTerminal,
            Some(path) => Destination::File(PathBuf::from(path)),
        }
    }

    fn is_explicit(&self) -> bool {
        !matches!(self, Destination::Terminal)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Terminal | Destination::ForceTerminal => write!(f, "terminal"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error(
        "response body is not valid UTF-8 text; pass `--output {}` to print it anyway \
         or `--output <FILE>` to save it",
        TERMINAL_OVERRIDE
    )]
    EncodingSafetyAbort,
    #[error(
        "write to {target} failed: {message}; choose another `--output` path or `--output {}`",
        TERMINAL_OVERRIDE
    )]
    WriteError { target: String, message: String },
    #[error("reading response body failed: {0}")]
    Source(String),
}

/// What was written once the stream is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSummary {
    pub destination: Destination,
    pub chunks: usize,
    pub bytes: u64,
}

enum Route<W: Write> {
    Terminal { out: W, decoder: Utf8Stream },
    File { path: PathBuf, file: BufWriter<File> },
}

enum SinkState<W: Write> {
    AwaitingFirstChunk(W),
    Routed(Route<W>),
    Closed,
}

/// True when `chunk` holds an invalid UTF-8 sequence. An incomplete sequence
/// at the very end is not counted; the next chunk may complete it.
fn looks_binary(chunk: &[u8]) -> bool {
    match std::str::from_utf8(chunk) {
        Ok(_) => false,
        Err(e) => e.error_len().is_some(),
    }
}

/// Writes body chunks to a file or the terminal; see the module docs.
pub struct OutputSink<W: Write> {
    destination: Destination,
    state: SinkState<W>,
    chunks: usize,
    bytes: u64,
}

impl<W: Write> OutputSink<W> {
    pub fn new(destination: Destination, terminal: W) -> Self {
        Self {
            destination,
            state: SinkState::AwaitingFirstChunk(terminal),
            chunks: 0,
            bytes: 0,
        }
    }

    fn write_error(&self, err: std::io::Error) -> SinkError {
        SinkError::WriteError {
            target: self.destination.to_string(),
            message: err.to_string(),
        }
    }

    /// Picks the route from the first chunk. Opens the file, if any.
    fn route(&self, first: &[u8], terminal: W) -> Result<Route<W>, SinkError> {
        if looks_binary(first) && !self.destination.is_explicit() {
            return Err(SinkError::EncodingSafetyAbort);
        }
        match &self.destination {
            Destination::File(path) => {
                let file = File::create(path).map_err(|e| self.write_error(e))?;
                tracing::debug!(path = %path.display(), "writing body to file");
                Ok(Route::File {
                    path: path.clone(),
                    file: BufWriter::new(file),
                })
            }
            Destination::Terminal | Destination::ForceTerminal => Ok(Route::Terminal {
                out: terminal,
                decoder: Utf8Stream::default(),
            }),
        }
    }

    /// Writes one chunk. After an error the sink is closed and holds no file.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        let state = std::mem::replace(&mut self.state, SinkState::Closed);
        let mut route = match state {
            SinkState::AwaitingFirstChunk(terminal) => self.route(chunk, terminal)?,
            SinkState::Routed(route) => route,
            SinkState::Closed => {
                return Err(SinkError::WriteError {
                    target: self.destination.to_string(),
                    message: "sink already closed".to_string(),
                })
            }
        };

        let written = match &mut route {
            Route::Terminal { out, decoder } => out.write_all(decoder.push(chunk).as_bytes()),
            Route::File { file, .. } => file.write_all(chunk),
        };
        written.map_err(|e| self.write_error(e))?;

        self.chunks += 1;
        self.bytes += chunk.len() as u64;
        self.state = SinkState::Routed(route);
        Ok(())
    }

    /// Flushes and closes the route. A sink that never saw a chunk opens nothing.
    pub fn finish(mut self) -> Result<SinkSummary, SinkError> {
        let state = std::mem::replace(&mut self.state, SinkState::Closed);
        if let SinkState::Routed(route) = state {
            let flushed = match route {
                Route::Terminal {
                    mut out,
                    mut decoder,
                } => out
                    .write_all(decoder.finish().as_bytes())
                    .and_then(|()| out.flush()),
                Route::File { path, mut file } => {
                    let res = file.flush().and_then(|()| file.get_ref().sync_all());
                    tracing::debug!(
                        path = %path.display(),
                        bytes = self.bytes,
                        "closed output file"
                    );
                    res
                }
            };
            flushed.map_err(|e| self.write_error(e))?;
        }
        Ok(SinkSummary {
            destination: self.destination.clone(),
            chunks: self.chunks,
            bytes: self.bytes,
        })
    }
}

/// Drains `chunks` into `destination`, writing to `terminal` when routed there.
///
/// The stream is consumed once, in order. Errors from the stream or from
/// writing stop consumption immediately.
pub fn consume<I, E, W>(
    chunks: I,
    destination: Destination,
    terminal: W,
) -> Result<SinkSummary, SinkError>
where
    I: IntoIterator<Item = Result<Vec<u8>, E>>,
    E: fmt::Display,
    W: Write,
{
    let mut sink = OutputSink::new(destination, terminal);
    for chunk in chunks {
        let chunk = chunk.map_err(|e| SinkError::Source(e.to_string()))?;
        sink.write_chunk(&chunk)?;
    }
    sink.finish()
}
