use crate::emit::ClassificationResult;
use crate::error::SinkError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Append-only destination for classification results.
///
/// A batch either persists or fails the run; there are no retries.
pub trait Sink {
    fn write_batch(&mut self, batch: &[ClassificationResult]) -> Result<(), SinkError>;
}

/// Writes one JSON document per line and flushes after every batch.
#[derive(Debug)]
pub struct JsonlSink<W: Write> {
    writer: W,
    batches: usize,
}

impl JsonlSink<BufWriter<File>> {
    /// Create (or truncate) the output file, so re-running a window replaces
    /// earlier output instead of duplicating it.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|source| SinkError::Create {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, batches: 0 }
    }

    pub fn batches_written(&self) -> usize {
        self.batches
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for JsonlSink<W> {
    fn write_batch(&mut self, batch: &[ClassificationResult]) -> Result<(), SinkError> {
        let index = self.batches + 1;

        // Serialize the whole batch before touching the writer.
        let mut buf = Vec::new();
        for result in batch {
            serde_json::to_writer(&mut buf, result).map_err(|source| SinkError::Serialize {
                destination: result.destination().to_string(),
                source,
            })?;
            buf.push(b'\n');
        }

        self.writer
            .write_all(&buf)
            .and_then(|()| self.writer.flush())
            .map_err(|source| SinkError::Io {
                batch: index,
                source,
            })?;

        self.batches = index;
        tracing::debug!(batch = index, results = batch.len(), "wrote batch");
        Ok(())
    }
}

/// Deliver `results` to `sink` in batches of at most `batch_size`.
/// Returns the number of batches written.
pub fn emit_batched<S, I>(results: I, sink: &mut S, batch_size: usize) -> Result<usize, SinkError>
where
    S: Sink + ?Sized,
    I: IntoIterator<Item = ClassificationResult>,
{
    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut written = 0;

    for result in results {
        batch.push(result);
        if batch.len() == batch_size {
            sink.write_batch(&batch)?;
            written += 1;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        sink.write_batch(&batch)?;
        written += 1;
    }
    Ok(written)
}
