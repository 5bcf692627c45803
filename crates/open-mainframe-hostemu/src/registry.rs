//! Open-file registry: at most one handle per EXECIO file name.
//!
//! A file is opened the first time any EXECIO names it and stays open, with
//! its cursor, until a FINIS names it again or the emulator shuts down.
//! Reads and writes through one entry share a single file position.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{HostEmuConfig, OpenPolicy};
use crate::error::{HostEmuError, Result};

/// An open file tracked by the registry.
#[derive(Debug)]
pub struct OpenFile {
    path: PathBuf,
    reader: BufReader<File>,
}

impl OpenFile {
    fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            reader: BufReader::new(file),
        }
    }

    /// Resolved path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next record with its line terminator removed; `None` at EOF.
    pub fn read_record(&mut self, strip_carriage_return: bool) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if strip_carriage_return && buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Handle for writing, positioned where the last read left off.
    pub fn writer(&mut self) -> io::Result<&mut File> {
        // Seeking through the BufReader drops read-ahead and moves the
        // underlying file to the logical position.
        let pos = self.reader.stream_position()?;
        self.reader.seek(SeekFrom::Start(pos))?;
        Ok(self.reader.get_mut())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.reader.get_mut().flush()
    }
}

/// Open `path` for EXECIO according to `policy`.
pub fn open_file(path: &Path, is_write: bool, policy: OpenPolicy) -> io::Result<File> {
    if is_write {
        return OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path);
    }
    let read_write = OpenOptions::new().read(true).write(true).open(path);
    match policy {
        OpenPolicy::Strict => read_write,
        OpenPolicy::Permissive => read_write
            .or_else(|_| File::open(path))
            .or_else(|_| create_empty(path)),
    }
}

/// Last DISKR fallback: create the file, never clobbering an existing one.
fn create_empty(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)
}

/// Registry of open files keyed by the file name as written in the command.
#[derive(Debug, Default)]
pub struct OpenFileRegistry {
    files: HashMap<String, OpenFile>,
}

impl OpenFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an open file by name.
    pub fn find(&mut self, name: &str) -> Option<&mut OpenFile> {
        self.files.get_mut(name)
    }

    /// Register an already-open file.
    pub fn insert(&mut self, name: &str, file: OpenFile) {
        self.files.insert(name.to_string(), file);
    }

    /// Forget a file, returning its handle to the caller.
    pub fn remove(&mut self, name: &str) -> Option<OpenFile> {
        self.files.remove(name)
    }

    /// Return the registered file, opening and registering it if needed.
    pub fn open_or_get(
        &mut self,
        name: &str,
        is_write: bool,
        config: &HostEmuConfig,
    ) -> Result<&mut OpenFile> {
        if self.find(name).is_none() {
            let path = config.resolve(name);
            let file = open_file(&path, is_write, config.open_policy).map_err(|source| {
                warn!(file = name, path = %path.display(), error = %source, "EXECIO open failed");
                HostEmuError::Open {
                    name: name.to_string(),
                    source,
                }
            })?;
            info!(file = name, path = %path.display(), write = is_write, "EXECIO file opened");
            self.insert(name, OpenFile::new(path, file));
        }
        self.find(name).ok_or_else(|| HostEmuError::Open {
            name: name.to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    }

    /// Flush and close a file (FINIS). Returns whether it was registered.
    pub fn close(&mut self, name: &str) -> Result<bool> {
        match self.remove(name) {
            Some(mut file) => {
                info!(file = name, "EXECIO file closed");
                file.flush().map_err(|e| HostEmuError::io(name, e))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Flush and close every registered file; returns how many were open.
    pub fn close_all(&mut self) -> usize {
        let count = self.files.len();
        for (name, mut file) in self.files.drain() {
            if let Err(e) = file.flush() {
                warn!(file = %name, error = %e, "flush failed while closing");
            }
        }
        if count > 0 {
            info!(count, "EXECIO registry closed");
        }
        count
    }

    /// Names of all registered files, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Drop for OpenFileRegistry {
    fn drop(&mut self) {
        self.close_all();
    }
}
