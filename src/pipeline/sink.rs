//! Match sinks. The walk hands each match to a sink as it is found; nothing is buffered
//! by the engine.

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use crate::types::{Match, OutputFormat};

pub trait Sink {
    fn record(&mut self, m: &Match) -> Result<()>;

    /// Called once after the walk. Flush here.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes matches to a stream or file, one per line.
pub struct WriterSink<W: Write> {
    out: BufWriter<W>,
    format: OutputFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out: BufWriter::new(out),
            format,
        }
    }
}

impl WriterSink<Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl WriterSink<File> {
    pub fn create(path: &Path, format: OutputFormat) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("create output {}", path.display()))?;
        Ok(Self::new(file, format))
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn record(&mut self, m: &Match) -> Result<()> {
        match self.format {
            OutputFormat::Plain => {
                write_path(&mut self.out, &m.path)?;
                self.out.write_all(b"\n")?;
            }
            OutputFormat::JsonLines => {
                // Encode first so a failure never leaves a partial record behind.
                let mut line = serde_json::to_vec(m)?;
                line.push(b'\n');
                self.out.write_all(&line)?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush().context("flush output")
    }
}

/// Raw path bytes on unix, so names that are not UTF-8 still name the real file.
#[cfg(unix)]
fn write_path<W: Write>(out: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    out.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path<W: Write>(out: &mut W, path: &Path) -> io::Result<()> {
    write!(out, "{}", path.display())
}

/// In-memory collector.
#[derive(Debug, Default)]
pub struct CollectSink {
    pub matches: Vec<Match>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.matches.iter().map(|m| m.path.as_path()).collect()
    }
}

impl Sink for CollectSink {
    fn record(&mut self, m: &Match) -> Result<()> {
        self.matches.push(m.clone());
        Ok(())
    }
}

/// Forwards matches to another thread. Dropping the sink closes the channel.
pub struct ChannelSink {
    tx: Sender<Match>,
}

impl ChannelSink {
    pub fn new(tx: Sender<Match>) -> Self {
        Self { tx }
    }
}

impl Sink for ChannelSink {
    fn record(&mut self, m: &Match) -> Result<()> {
        self.tx
            .send(m.clone())
            .map_err(|_| anyhow::anyhow!("match receiver dropped"))
    }
}

/// Closure sink: `FnSink(|m| println!("{}", m.path.display()))`.
pub struct FnSink<F>(pub F);

impl<F: FnMut(&Match)> Sink for FnSink<F> {
    fn record(&mut self, m: &Match) -> Result<()> {
        (self.0)(m);
        Ok(())
    }
}
