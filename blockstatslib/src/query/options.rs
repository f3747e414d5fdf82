//! Options that shape a stats query and its report.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::aggregator::CountTarget;
use crate::data::key::TypeKey;
use crate::output::format::Format;

/// Which counted types a query returns.
///
/// An entry without a variant (`minecraft:wool`) matches every variant of
/// that id; an entry with one (`minecraft:wool:14`) matches only itself.
/// An empty filter matches nothing: callers wanting everything use
/// `query_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFilter {
    entries: Vec<TypeKey>,
}

impl TypeFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse user-supplied names. Entries that do not parse are skipped
    /// with a warning.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Self {
        let mut filter = Self::new();
        for name in names {
            let name = name.as_ref();
            match name.parse::<TypeKey>() {
                Ok(key) => filter = filter.with(key),
                Err(err) => warn!(entry = name, error = %err, "skipping filter entry"),
            }
        }
        filter
    }

    /// Builder: add one entry.
    pub fn with(mut self, key: TypeKey) -> Self {
        if !self.entries.contains(&key) {
            self.entries.push(key);
        }
        self
    }

    pub fn entries(&self) -> &[TypeKey] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is selected by any entry.
    pub fn matches(&self, key: &TypeKey) -> bool {
        self.entries.iter().any(|entry| {
            entry.id() == key.id()
                && match entry.variant() {
                    Some(variant) => key.variant() == Some(variant),
                    None => true,
                }
        })
    }
}

/// How a report is produced and where dumps go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Output format for rendered lines
    pub format: Format,
    /// Directory receiving dump files
    pub output_dir: PathBuf,
    /// Report block entities instead of blocks
    pub block_entities: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: Format::default(),
            output_dir: PathBuf::from("."),
            block_entities: false,
        }
    }
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the output format
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Builder: set the dump directory
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Builder: report block entities
    pub fn block_entities(mut self, enabled: bool) -> Self {
        self.block_entities = enabled;
        self
    }

    /// The count target these options select.
    pub fn target(&self) -> CountTarget {
        if self.block_entities {
            CountTarget::BlockEntities
        } else {
            CountTarget::Blocks
        }
    }

    /// Base file name for dumps of the selected target.
    pub fn dump_base_name(&self) -> &'static str {
        match self.target() {
            CountTarget::Blocks => "block_stats",
            CountTarget::BlockEntities => "block_entity_stats",
        }
    }
}
