//! Error types for blockstatslib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while counting or producing reports
#[derive(Error, Debug)]
pub enum BlockStatsError {
    /// A table needs at least one column
    #[error("invalid column count {0}, a table needs at least one column")]
    InvalidColumnCount(usize),

    /// Column index outside `[0, columns)`
    #[error("invalid column index {index}, the table has {columns} columns")]
    InvalidColumn { index: usize, columns: usize },

    /// Row or title with the wrong number of cells
    #[error("invalid number of columns: expected {expected}, got {got}")]
    ColumnCountMismatch { expected: usize, got: usize },

    /// Header insertion index past the end of the header list
    #[error("invalid header index {index}, there are {len} headers")]
    InvalidHeaderIndex { index: usize, len: usize },

    /// Unknown output format token
    #[error("unknown output format '{0}', expected ascii-table, compact-table, csv or simple")]
    UnknownFormat(String),

    /// A type identifier that could not be parsed
    #[error("invalid type identifier '{0}'")]
    InvalidTypeKey(String),

    /// The target world/dimension does not exist
    #[error("could not resolve dimension {0}")]
    DimensionNotFound(i32),

    /// Failed to create the output directory
    #[error("failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Every candidate output file name is already taken
    #[error("failed to create a data dump file for '{base}', all file names are taken")]
    FileNameExhausted { base: String },

    /// Failed to write a data dump
    #[error("failed to write data dump '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a world file
    #[error("failed to read world file '{path}': {source}")]
    WorldRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse a world description
    #[error("failed to parse world description: {0}")]
    WorldParse(String),
}

/// Broad class of an error, used by callers to decide how to surface it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid table configuration or row shape; the single operation is rejected
    Configuration,
    /// Invalid content; the offending item is skipped
    DataValidation,
    /// The scan target could not be resolved; nothing was counted
    SpatialResolution,
    /// Output could not be written
    Sink,
    /// World input could not be loaded
    Input,
}

impl BlockStatsError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockStatsError::InvalidColumnCount(_)
            | BlockStatsError::InvalidColumn { .. }
            | BlockStatsError::ColumnCountMismatch { .. }
            | BlockStatsError::InvalidHeaderIndex { .. }
            | BlockStatsError::UnknownFormat(_) => ErrorKind::Configuration,
            BlockStatsError::InvalidTypeKey(_) => ErrorKind::DataValidation,
            BlockStatsError::DimensionNotFound(_) => ErrorKind::SpatialResolution,
            BlockStatsError::OutputDir { .. }
            | BlockStatsError::FileNameExhausted { .. }
            | BlockStatsError::FileWrite { .. } => ErrorKind::Sink,
            BlockStatsError::WorldRead { .. } | BlockStatsError::WorldParse(_) => {
                ErrorKind::Input
            }
        }
    }
}
