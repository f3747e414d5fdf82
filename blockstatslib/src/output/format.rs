//! Output formats for [`TableModel`].
//!
//! Each format is a pure function of the model: the same model always
//! renders to the same lines.
//!
//! - **ascii-table**: bordered grid, columns padded to a common width
//! - **compact-table**: same column layout, no borders
//! - **csv**: one record per row, RFC 4180 style quoting
//! - **simple**: cells joined with `", "`, no padding

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlockStatsError;

use super::table::{Alignment, Row, TableModel};

/// Width taken by the gap between two columns (`" | "` or three spaces).
pub const COLUMN_GAP: usize = 3;

const COLUMN_SEPARATOR: &str = " | ";
const COLUMN_SPACER: &str = "   ";
const COMPACT_SPACER: &str = " ";
const SIMPLE_DELIMITER: &str = ", ";

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    #[default]
    AsciiTable,
    CompactTable,
    Csv,
    Simple,
}

impl Format {
    /// All formats, in selector order.
    pub const ALL: [Format; 4] = [
        Format::AsciiTable,
        Format::CompactTable,
        Format::Csv,
        Format::Simple,
    ];

    /// The selector token for this format.
    pub fn token(self) -> &'static str {
        match self {
            Format::AsciiTable => "ascii-table",
            Format::CompactTable => "compact-table",
            Format::Csv => "csv",
            Format::Simple => "simple",
        }
    }

    /// File extension (with dot) for dumps in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => ".csv",
            _ => ".txt",
        }
    }

    fn formatter(self) -> &'static dyn RowFormatter {
        match self {
            Format::AsciiTable => &AsciiTable,
            Format::CompactTable => &CompactTable,
            Format::Csv => &Csv,
            Format::Simple => &Simple,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Format {
    type Err = BlockStatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.token() == s)
            .ok_or_else(|| BlockStatsError::UnknownFormat(s.to_string()))
    }
}

/// Renders a table model into lines.
pub trait RowFormatter {
    fn render(&self, model: &TableModel) -> Vec<String>;
}

/// Render `model` in its current format.
pub fn render(model: &TableModel) -> Vec<String> {
    model.format().formatter().render(model)
}

/// Column widths resolved for one rendering.
///
/// Header and footer lines longer than the whole table widen the last
/// column so that nothing gets truncated. The model itself is not touched.
#[derive(Debug, Clone)]
struct Layout {
    widths: Vec<usize>,
    total: usize,
}

impl Layout {
    fn for_model(model: &TableModel) -> Self {
        let mut layout = Layout {
            widths: model.column_widths().to_vec(),
            total: model.total_width(),
        };

        for line in model.headers().iter().chain(model.footers()) {
            let len = line.chars().count();
            if len > layout.total {
                let diff = len - layout.total;
                if let Some(last) = layout.widths.last_mut() {
                    *last += diff;
                }
                layout.total += diff;
            }
        }

        layout
    }
}

fn align(text: &str, width: usize, alignment: Alignment) -> String {
    match alignment {
        Alignment::Left => format!("{:<width$}", text),
        Alignment::Right => format!("{:>width$}", text),
    }
}

/// Cells padded to the layout widths and joined with `gap`.
fn padded_cells(model: &TableModel, layout: &Layout, row: &Row, gap: &str, center: bool) -> String {
    row.cells()
        .iter()
        .zip(&layout.widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            if center {
                format!("{:^width$}", cell)
            } else {
                align(cell, width, model.alignment(i))
            }
        })
        .collect::<Vec<_>>()
        .join(gap)
}

/// Bordered grid.
#[derive(Debug, Clone, Copy)]
pub struct AsciiTable;

impl AsciiTable {
    fn border(model: &TableModel, layout: &Layout) -> String {
        if model.use_column_separator() {
            let dashes: Vec<String> = layout.widths.iter().map(|w| "-".repeat(*w)).collect();
            format!("+-{}-+", dashes.join("-+-"))
        } else {
            format!("+{}+", "-".repeat(layout.total + 2))
        }
    }

    fn gap(model: &TableModel) -> &'static str {
        if model.use_column_separator() {
            COLUMN_SEPARATOR
        } else {
            COLUMN_SPACER
        }
    }
}

impl RowFormatter for AsciiTable {
    fn render(&self, model: &TableModel) -> Vec<String> {
        let layout = Layout::for_model(model);
        let border = Self::border(model, &layout);
        let gap = Self::gap(model);
        let mut lines: Vec<String> = Vec::new();

        // Never emit the same border twice in a row
        let push_border = |lines: &mut Vec<String>| {
            if lines.last() != Some(&border) {
                lines.push(border.clone());
            }
        };
        let text_line = |text: &str| format!("| {:<width$} |", text, width = layout.total);

        push_border(&mut lines);
        if !model.headers().is_empty() {
            for header in model.headers() {
                lines.push(text_line(header));
            }
            push_border(&mut lines);
        }

        if let Some(title) = model.title() {
            let cells = padded_cells(model, &layout, title, gap, model.center_title());
            lines.push(format!("| {} |", cells));
            push_border(&mut lines);
        }

        for row in model.rows() {
            lines.push(format!("| {} |", padded_cells(model, &layout, row, gap, false)));
        }
        push_border(&mut lines);

        if model.repeat_title_at_bottom() {
            if let Some(title) = model.title() {
                let cells = padded_cells(model, &layout, title, gap, model.center_title());
                lines.push(format!("| {} |", cells));
                push_border(&mut lines);
            }
        }

        if !model.footers().is_empty() {
            for footer in model.footers() {
                lines.push(text_line(footer));
            }
            push_border(&mut lines);
        }

        lines
    }
}

/// Aligned columns without any border characters.
///
/// Columns keep the widths the bordered table would use, overflow from long
/// headers and footers included, and are joined by a single space. Rows are
/// therefore narrower than the bordered table's content area, and headers
/// and footers may stick out past them. Trailing padding is trimmed.
#[derive(Debug, Clone, Copy)]
pub struct CompactTable;

impl RowFormatter for CompactTable {
    fn render(&self, model: &TableModel) -> Vec<String> {
        let layout = Layout::for_model(model);
        let line = |row: &Row, center: bool| {
            padded_cells(model, &layout, row, COMPACT_SPACER, center)
                .trim_end()
                .to_string()
        };
        let mut lines: Vec<String> = model.headers().to_vec();

        if let Some(title) = model.title() {
            lines.push(line(title, model.center_title()));
        }
        lines.extend(model.rows().iter().map(|row| line(row, false)));
        if model.repeat_title_at_bottom() {
            if let Some(title) = model.title() {
                lines.push(line(title, model.center_title()));
            }
        }
        lines.extend(model.footers().iter().cloned());

        lines
    }
}

/// Quote a CSV field when it contains a comma, quote or line break.
pub fn escape_csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Comma separated values.
///
/// Headers come first and footers last, as raw lines outside the records.
#[derive(Debug, Clone, Copy)]
pub struct Csv;

impl Csv {
    fn record(row: &Row) -> String {
        row.cells()
            .iter()
            .map(|c| escape_csv_field(c))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl RowFormatter for Csv {
    fn render(&self, model: &TableModel) -> Vec<String> {
        let mut lines: Vec<String> = model.headers().to_vec();

        if let Some(title) = model.title() {
            lines.push(Self::record(title));
        }
        lines.extend(model.rows().iter().map(Self::record));
        if model.repeat_title_at_bottom() {
            if let Some(title) = model.title() {
                lines.push(Self::record(title));
            }
        }
        lines.extend(model.footers().iter().cloned());

        lines
    }
}

/// Plain lines, cells joined with a fixed delimiter.
#[derive(Debug, Clone, Copy)]
pub struct Simple;

impl RowFormatter for Simple {
    fn render(&self, model: &TableModel) -> Vec<String> {
        let join = |row: &Row| row.cells().join(SIMPLE_DELIMITER);
        let mut lines: Vec<String> = model.headers().to_vec();

        if let Some(title) = model.title() {
            lines.push(join(title));
        }
        lines.extend(model.rows().iter().map(join));
        if model.repeat_title_at_bottom() {
            if let Some(title) = model.title() {
                lines.push(join(title));
            }
        }
        lines.extend(model.footers().iter().cloned());

        lines
    }
}
