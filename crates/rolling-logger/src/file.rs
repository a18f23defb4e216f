//! Size-rotated log file
//!
//! `<name>.log` is the active file; on rotation it becomes `<name>.1.log`,
//! older files shift up, and anything beyond `max_files` is removed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::buffer::RingBuffer;

pub struct RollingFile {
    dir: PathBuf,
    name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
    buffer: Option<&'static Mutex<RingBuffer>>,
}

impl RollingFile {
    pub fn open(dir: PathBuf, name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.log", name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir,
            name: name.to_string(),
            max_bytes,
            max_files,
            file,
            written,
            buffer: None,
        })
    }

    /// Mirror every write into a shared line buffer
    pub fn with_buffer(mut self, buffer: &'static Mutex<RingBuffer>) -> Self {
        self.buffer = Some(buffer);
        self
    }

    fn path(&self, index: usize) -> PathBuf {
        match index {
            0 => self.dir.join(format!("{}.log", self.name)),
            n => self.dir.join(format!("{}.{}.log", self.name, n)),
        }
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let oldest = self.path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..self.max_files).rev() {
            let from = self.path(index);
            if from.exists() {
                fs::rename(&from, self.path(index + 1))?;
            }
        }
        if self.max_files == 0 {
            remove_if_exists(&self.path(0))?;
        }
        self.file = OpenOptions::new().create(true).append(true).open(self.path(0))?;
        self.written = 0;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        if let Some(buffer) = self.buffer {
            buffer.lock().unwrap_or_else(|e| e.into_inner()).push_bytes(&buf[..n]);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
