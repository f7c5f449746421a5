//! Output sink shared by all workers.
//!
//! Lines are sent over a channel to a single writer task, so a batch of lines
//! belonging to one host is never interleaved with another host's output.

use {
    crate::{
        errors::{AuditError, InputError},
        structs::{HostReport, Summary},
    },
    log::debug,
    std::{io, path::Path},
    tokio::{
        fs::File,
        io::{AsyncWrite, AsyncWriteExt, BufWriter},
        sync::mpsc,
        task::JoinHandle,
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
}

pub type Sink = Box<dyn AsyncWrite + Send + Unpin>;

pub struct Reporter {
    tx: mpsc::UnboundedSender<Vec<String>>,
    writer: JoinHandle<io::Result<()>>,
    format: Format,
}

impl Reporter {
    /// Spawns the writer task. Every line goes to every sink, newline terminated.
    pub fn spawn(sinks: Vec<Sink>, format: Format) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<String>>();

        let writer = tokio::spawn(async move {
            let mut sinks = sinks;
            while let Some(lines) = rx.recv().await {
                for sink in sinks.iter_mut() {
                    for line in &lines {
                        sink.write_all(line.as_bytes()).await?;
                        sink.write_all(b"\n").await?;
                    }
                    sink.flush().await?;
                }
            }
            for sink in sinks.iter_mut() {
                sink.shutdown().await?;
            }
            Ok(())
        });

        Reporter { tx, writer, format }
    }

    /// Standard output plus, when given, a log file that is created or truncated.
    pub async fn stdout(log: Option<&Path>, format: Format) -> Result<Self, AuditError> {
        let mut sinks: Vec<Sink> = vec![Box::new(tokio::io::stdout())];
        if let Some(path) = log {
            let file = File::create(path).await.map_err(|source| AuditError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            sinks.push(Box::new(BufWriter::new(file)));
        }
        Ok(Self::spawn(sinks, format))
    }

    pub fn send(&self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        if self.tx.send(lines).is_err() {
            debug!("Report writer is gone, dropping output");
        }
    }

    pub fn host(&self, report: &HostReport) {
        let lines = match self.format {
            Format::Text => report.records.iter().flat_map(|r| r.lines()).collect(),
            Format::Json => report
                .records
                .iter()
                .filter_map(|r| serde_json::to_string(r).ok())
                .collect(),
        };
        self.send(lines);
    }

    pub fn input_error(&self, error: &InputError) {
        let line = match self.format {
            Format::Text => Some(format!("+ FAILED reading input: {error}")),
            Format::Json => {
                let value = serde_json::json!({ "input_error": error.to_string() });
                serde_json::to_string(&value).ok()
            }
        };
        self.send(line.into_iter().collect());
    }

    pub fn summary(&self, summary: &Summary) {
        let line = match self.format {
            Format::Text => Some(summary.line()),
            Format::Json => {
                let value = serde_json::json!({ "summary": summary });
                serde_json::to_string(&value).ok()
            }
        };
        self.send(line.into_iter().collect());
    }

    /// Waits until everything sent so far is written out.
    pub async fn finish(self) -> Result<(), AuditError> {
        let Reporter { tx, writer, .. } = self;
        drop(tx);
        writer.await.map_err(io::Error::other)??;
        Ok(())
    }
}
