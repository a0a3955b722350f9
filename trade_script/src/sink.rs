//! Destinations for compiled command lines.
//!
//! Sinks write in two steps: `stage` prepares the new output without touching
//! what is already there, `commit` makes it visible. Exporting stages every
//! sink before committing any of them.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

/// Receives a finished, ordered list of command lines.
pub trait CommandSink {
    /// Prepare `lines` without replacing the current output.
    fn stage(&mut self, lines: &[String]) -> io::Result<()>;

    /// Publish the staged lines. Does nothing when nothing is staged.
    fn commit(&mut self) -> io::Result<()>;

    /// Drop the staged lines, leaving the current output as it was.
    fn discard(&mut self);

    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        self.stage(lines)?;
        self.commit()
    }
}

/// Keeps the committed lines in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    lines: Vec<String>,
    staged: Option<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines from the last commit.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl CommandSink for MemorySink {
    fn stage(&mut self, lines: &[String]) -> io::Result<()> {
        self.staged = Some(lines.to_vec());
        Ok(())
    }

    fn commit(&mut self) -> io::Result<()> {
        if let Some(lines) = self.staged.take() {
            self.lines = lines;
        }
        Ok(())
    }

    fn discard(&mut self) {
        self.staged = None;
    }
}

/// Writes one newline-terminated command per line to a file.
///
/// Staging writes a sibling `*.tmp` file; committing renames it over the
/// target, so an interrupted run never leaves a truncated function file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    staged: Option<PathBuf>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            staged: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> io::Result<PathBuf> {
        let Some(name) = self.path.file_name() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("output path '{}' has no file name", self.path.display()),
            ));
        };
        let mut staged = name.to_os_string();
        staged.push(".tmp");
        Ok(self.path.with_file_name(staged))
    }
}

impl CommandSink for FileSink {
    fn stage(&mut self, lines: &[String]) -> io::Result<()> {
        self.discard();
        if self.path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("output path '{}' is a directory", self.path.display()),
            ));
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let staged = self.staging_path()?;
        if let Err(err) = write_staged(&staged, lines) {
            let _ = fs::remove_file(&staged);
            return Err(err);
        }
        debug!("staged {} line(s) for {}", lines.len(), self.path.display());
        self.staged = Some(staged);
        Ok(())
    }

    fn commit(&mut self) -> io::Result<()> {
        let Some(staged) = self.staged.take() else {
            return Ok(());
        };
        if let Err(err) = fs::rename(&staged, &self.path) {
            let _ = fs::remove_file(&staged);
            return Err(err);
        }
        info!("Successfully wrote {}", self.path.display());
        Ok(())
    }

    fn discard(&mut self) {
        if let Some(staged) = self.staged.take() {
            let _ = fs::remove_file(staged);
        }
    }
}

fn write_staged(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for line in lines {
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()
}
