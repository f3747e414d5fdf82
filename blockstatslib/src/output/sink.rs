//! Destinations for rendered lines.
//!
//! - [`FileSink`]: timestamped dump files under a root directory
//! - [`LineSink`]: anything that takes lines directly, e.g. [`TracingSink`]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{error, info};

use crate::error::BlockStatsError;
use crate::Result;

/// Timestamp format used in dump file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H.%M.%S";

/// Highest numeric suffix tried when a file name is taken.
pub const MAX_NAME_SUFFIX: u32 = 99;

/// Something that accepts rendered lines.
pub trait LineSink {
    fn write_lines(&self, lines: &[String]);
}

/// Emits each line as an info-level tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn write_lines(&self, lines: &[String]) {
        for line in lines {
            info!("{}", line);
        }
    }
}

/// Writes dumps as new files named `<base>_<timestamp>[_<n>]<ext>`.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `lines` to a fresh file stamped with the current local time.
    ///
    /// `ext` includes the leading dot, e.g. `".csv"`.
    pub fn write_lines(&self, base: &str, ext: &str, lines: &[String]) -> Result<PathBuf> {
        self.write_lines_at(base, ext, lines, Local::now().naive_local())
    }

    /// Same as [`FileSink::write_lines`] with an explicit timestamp.
    pub fn write_lines_at(
        &self,
        base: &str,
        ext: &str,
        lines: &[String],
        timestamp: NaiveDateTime,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|source| {
            error!(path = %self.root.display(), "failed to create output directory");
            BlockStatsError::OutputDir {
                path: self.root.clone(),
                source,
            }
        })?;

        let stem = format!("{}_{}", base, timestamp.format(TIMESTAMP_FORMAT));
        let (path, file) = self.create_unique(base, &stem, ext)?;

        if let Err(source) = write_all(file, lines) {
            error!(path = %path.display(), "failed to write data dump");
            // Leave nothing half-written behind
            let _ = fs::remove_file(&path);
            return Err(BlockStatsError::FileWrite { path, source });
        }

        info!(path = %path.display(), lines = lines.len(), "wrote data dump");
        Ok(path)
    }

    /// Create the first free name among `stem`, `stem_1` .. `stem_99`.
    fn create_unique(&self, base: &str, stem: &str, ext: &str) -> Result<(PathBuf, File)> {
        let candidates = std::iter::once(format!("{}{}", stem, ext))
            .chain((1..=MAX_NAME_SUFFIX).map(|n| format!("{}_{}{}", stem, n, ext)));

        for name in candidates {
            let path = self.root.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => {
                    error!(path = %path.display(), "failed to create data dump");
                    return Err(BlockStatsError::FileWrite { path, source });
                }
            }
        }

        error!(base, "all data dump file names are taken");
        Err(BlockStatsError::FileNameExhausted {
            base: base.to_string(),
        })
    }
}

fn write_all(file: File, lines: &[String]) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()
}
