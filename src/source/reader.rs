use crate::error::SourceError;
use crate::schema::Document;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lazy reader over a JSONL observation export.
///
/// Expected lines: one JSON document per line, blank lines ignored.
///
/// Example:
/// {"_id": "a1", "conditions": ["ecn.connectivity.works"], "path": ["192.0.2.1", "198.51.100.7"], ...}
///
/// Yields untyped documents in file order; only a line that is not JSON ends
/// the stream, with an error carrying its line number.
pub struct ObservationReader<R> {
    lines: std::io::Lines<R>,
    path: String,
    lineno: usize,
    failed: bool,
}

impl ObservationReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R: BufRead> ObservationReader<R> {
    pub fn new(reader: R, path: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            path: path.into(),
            lineno: 0,
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for ObservationReader<R> {
    type Item = Result<Document, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    self.failed = true;
                    return Some(Err(SourceError::Io {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };
            self.lineno += 1;

            if line.trim().is_empty() {
                continue;
            }

            let line_no = self.lineno;
            return Some(
                serde_json::from_str(&line)
                    .map(|value| Document {
                        line: line_no,
                        value,
                    })
                    .map_err(|source| {
                        self.failed = true;
                        SourceError::Parse {
                            path: self.path.clone(),
                            line: line_no,
                            source,
                        }
                    }),
            );
        }
    }
}
