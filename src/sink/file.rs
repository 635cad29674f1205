//! JSON-lines sinks backed by a writer or a file.

use crate::sink::{EventSink, Frame, SinkError};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes each frame as one compact JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(frame.as_map())?;
        line.push(b'\n');

        let mut written = 0;
        while written < line.len() {
            let error = match self.writer.write(&line[written..]) {
                Ok(0) => io::Error::from(io::ErrorKind::WriteZero),
                Ok(n) => {
                    written += n;
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => e,
            };
            // Terminate a torn line so the next frame starts on its own line
            if written > 0 {
                let _ = self.writer.write_all(b"\n");
            }
            return Err(error.into());
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Appends frames to a file that is only created once a frame is written.
///
/// Units whose events are all filtered out never reach the sink, so a session
/// that publishes nothing leaves no file behind.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<JsonLinesSink<BufWriter<File>>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn open(&mut self) -> Result<&mut JsonLinesSink<BufWriter<File>>, SinkError> {
        if self.writer.is_none() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            tracing::debug!(path = %self.path.display(), "Opened research log");
            self.writer = Some(JsonLinesSink::new(BufWriter::new(file)));
        }
        self.writer
            .as_mut()
            .ok_or_else(|| SinkError::Rejected("research log is not open".to_string()))
    }
}

impl EventSink for FileSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.open()?.write_frame(frame)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join("synheart-research-log-test")
            .join(format!("{name}-{}.jsonl", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_json_lines_one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_frame(&Frame::unit_start()).unwrap();
        sink.write_frame(&Frame::unit_end()).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let end: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(end["_ty"], "logUnitEnd");
    }

    /// Accepts `budget` bytes, fails the next write, then accepts everything.
    struct TornWriter {
        budget: Option<usize>,
        out: Vec<u8>,
    }

    impl Write for TornWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = match self.budget {
                Some(0) => {
                    self.budget = None;
                    return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
                }
                Some(budget) => {
                    let n = budget.min(buf.len());
                    self.budget = Some(budget - n);
                    n
                }
                None => buf.len(),
            };
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_frame_does_not_corrupt_next_frame() {
        let mut sink = JsonLinesSink::new(TornWriter {
            budget: Some(10),
            out: Vec::new(),
        });

        assert!(sink.write_frame(&Frame::unit_start()).is_err());
        sink.write_frame(&Frame::unit_end()).unwrap();

        let text = String::from_utf8(sink.into_inner().out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 10);
        assert!(serde_json::from_str::<serde_json::Value>(lines[0]).is_err());
        let end: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(end["_ty"], "logUnitEnd");
    }

    #[test]
    fn test_file_sink_opens_lazily() {
        let path = temp_path("lazy");
        let mut sink = FileSink::new(&path);
        assert!(!sink.is_open());
        sink.flush().unwrap();
        assert!(!path.exists());

        sink.write_frame(&Frame::unit_start()).unwrap();
        sink.flush().unwrap();
        assert!(sink.is_open());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("logUnitStart"));
        let _ = std::fs::remove_file(&path);
    }
}
