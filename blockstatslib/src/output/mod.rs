//! Output formatting: present counted data as tables.
//!
//! This module handles the final stage of the pipeline - turning query
//! results into lines and putting them somewhere. It provides:
//!
//! - **TableModel**: rows, title, header and footer lines, and the column
//!   configuration (alignment, numeric sort, separators)
//! - **Format / RowFormatter**: the four renderings of a model (bordered
//!   ASCII, compact, CSV, simple)
//! - **Sinks**: timestamped dump files and line-oriented outputs
//!
//! TableModel only formats strings. Selection and counting happen in the
//! earlier stages.
//!
//! ## Example
//!
//! ```rust
//! use blockstatslib::output::{Alignment, Format, TableModel};
//!
//! let mut table = TableModel::new(2, Format::Csv).unwrap();
//! table.set_column_properties(1, Alignment::Right, true).unwrap();
//! table.add_title(&["Block", "Count"]).unwrap();
//! table.add_data(&["minecraft:stone", "12"]).unwrap();
//! assert_eq!(table.get_lines(), vec!["Block,Count", "minecraft:stone,12"]);
//! ```

pub mod format;
pub mod sink;
pub mod table;

pub use format::{escape_csv_field, AsciiTable, CompactTable, Csv, Format, RowFormatter, Simple};
pub use sink::{FileSink, LineSink, TracingSink};
pub use table::{Alignment, Row, TableModel};
