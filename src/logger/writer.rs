//! Rotating file writer plugged into `tracing-subscriber`

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;
use crate::logger::rotation::RotationManager;

/// File writer that rotates by size and falls back to stderr when the
/// file becomes unwritable.
#[derive(Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
}

struct WriterState {
    file: BufWriter<File>,
    current_size: u64,
    rotation: RotationManager,
    fallback: bool,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        let current_size = if config.append {
            std::fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                current_size,
                rotation: RotationManager::new(config.rotation.clone()),
                fallback: false,
            })),
            path: config.path.clone(),
        })
    }

    fn write_locked(&self, state: &mut WriterState, buf: &[u8]) -> io::Result<usize> {
        if state.fallback {
            return io::stderr().write(buf);
        }

        if state.rotation.should_rotate(state.current_size) {
            let rotated = state
                .file
                .flush()
                .and_then(|_| {
                    state
                        .rotation
                        .rotate(&self.path)
                        .map_err(|e| io::Error::other(e.to_string()))
                })
                .and_then(|_| open_log_file(&self.path, false));

            match rotated {
                Ok(file) => {
                    state.file = file;
                    state.current_size = 0;
                }
                Err(e) => return fall_back(state, buf, e),
            }
        }

        match state.file.write(buf) {
            Ok(written) => {
                state.current_size += written as u64;
                Ok(written)
            }
            Err(e) => fall_back(state, buf, e),
        }
    }
}

fn fall_back(state: &mut WriterState, buf: &[u8], error: io::Error) -> io::Result<usize> {
    state.fallback = true;
    eprintln!("[logger] file write failed, falling back to stderr: {}", error);
    io::stderr().write(buf)
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterGuard { writer: self }
    }
}

/// Per-event handle; flushes on drop so each event reaches the file
pub struct RotatingWriterGuard<'a> {
    writer: &'a RotatingFileWriter,
}

impl Write for RotatingWriterGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .writer
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;
        self.writer.write_locked(&mut state, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .writer
            .state
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;
        if state.fallback {
            return io::stderr().flush();
        }
        state.file.flush()
    }
}

impl Drop for RotatingWriterGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.writer.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::{LogFormat, RotationConfig};
    use std::fs;
    use tempfile::tempdir;

    fn file_config(path: PathBuf, max_size: u64, append: bool) -> FileConfig {
        FileConfig {
            enabled: true,
            path,
            append,
            format: LogFormat::Json,
            rotation: RotationConfig {
                max_size,
                max_files: 3,
                compress: false,
            },
        }
    }

    #[test]
    fn test_writer_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("nudge.log");
        let writer = RotatingFileWriter::new(&file_config(path.clone(), 1024, true)).unwrap();

        writer.make_writer().write_all(b"hello\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_writer_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nudge.log");
        fs::write(&path, "old\n").unwrap();

        let writer = RotatingFileWriter::new(&file_config(path.clone(), 1024, true)).unwrap();
        writer.make_writer().write_all(b"new\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_writer_truncates_without_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nudge.log");
        fs::write(&path, "old\n").unwrap();

        let writer = RotatingFileWriter::new(&file_config(path.clone(), 1024, false)).unwrap();
        writer.make_writer().write_all(b"new\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn test_writer_rotates_when_full() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nudge.log");
        let writer = RotatingFileWriter::new(&file_config(path.clone(), 8, true)).unwrap();

        writer.make_writer().write_all(b"0123456789\n").unwrap();
        writer.make_writer().write_all(b"next\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "next\n");
        let rotated = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(rotated, 2);
    }
}
