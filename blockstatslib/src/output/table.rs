//! A generic, format-agnostic table builder.
//!
//! `TableModel` collects a title row, free-form header and footer lines, and
//! fixed-arity data rows. It tracks the widest cell of every column as rows
//! arrive, and renders through one of the [`Format`] variants:
//!
//! ```rust
//! use blockstatslib::output::{Alignment, Format, TableModel};
//!
//! let mut table = TableModel::new(2, Format::AsciiTable).unwrap();
//! table.set_column_properties(1, Alignment::Right, true).unwrap();
//! table.add_title(&["Block", "Count"]).unwrap();
//! table.add_data(&["minecraft:stone", "12"]).unwrap();
//! table.add_data(&["minecraft:dirt", "3"]).unwrap();
//!
//! let lines = table.get_lines();
//! assert_eq!(lines[1], "| Block           | Count |");
//! assert_eq!(lines[3], "| minecraft:dirt  |     3 |");
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BlockStatsError;
use crate::Result;

use super::format::{self, Format};

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// One fixed-arity tuple of text cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell at `index`, or `""` past the end.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// How rows are ordered before rendering.
#[derive(Debug, Clone, Copy)]
struct SortKey {
    column: usize,
    numeric: bool,
    reverse: bool,
}

impl SortKey {
    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let (x, y) = (a.cell(self.column), b.cell(self.column));
        let ordering = if self.numeric {
            match (x.trim().parse::<f64>(), y.trim().parse::<f64>()) {
                (Ok(p), Ok(q)) => p.total_cmp(&q),
                _ => x.cmp(y),
            }
        } else {
            x.cmp(y)
        };
        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Stable merge sort.
///
/// Mixed numeric/text columns do not compare as a total order, which
/// `slice::sort_by` is allowed to panic on; this never does.
fn merge_sort_by<T, F>(mut items: Vec<T>, compare: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, compare);
    let right = merge_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(a), Some(b)) = (left.peek(), right.peek()) {
        // Ties take from the left run, keeping insertion order
        let next = if compare(b, a) == Ordering::Less {
            right.next()
        } else {
            left.next()
        };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

/// Rectangular dataset with header/footer decoration.
#[derive(Debug, Clone)]
pub struct TableModel {
    columns: usize,
    format: Format,
    title: Option<Row>,
    headers: Vec<String>,
    footers: Vec<String>,
    rows: Vec<Row>,
    alignment: Vec<Alignment>,
    numeric: Vec<bool>,
    widths: Vec<usize>,
    sort: bool,
    sort_column: usize,
    sort_reverse: bool,
    use_column_separator: bool,
    center_title: bool,
    repeat_title_at_bottom: bool,
}

impl TableModel {
    /// Create an empty table with a fixed number of columns.
    pub fn new(columns: usize, format: Format) -> Result<Self> {
        if columns == 0 {
            return Err(BlockStatsError::InvalidColumnCount(columns));
        }

        Ok(Self {
            columns,
            format,
            title: None,
            headers: Vec::new(),
            footers: Vec::new(),
            rows: Vec::new(),
            alignment: vec![Alignment::Left; columns],
            numeric: vec![false; columns],
            widths: vec![0; columns],
            sort: true,
            sort_column: 0,
            sort_reverse: false,
            use_column_separator: true,
            center_title: false,
            repeat_title_at_bottom: format != Format::Csv,
        })
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn set_format(&mut self, format: Format) -> &mut Self {
        self.format = format;
        self
    }

    pub fn set_column_properties(
        &mut self,
        index: usize,
        alignment: Alignment,
        numeric: bool,
    ) -> Result<&mut Self> {
        self.check_column(index)?;
        self.alignment[index] = alignment;
        self.numeric[index] = numeric;
        Ok(self)
    }

    pub fn set_column_alignment(
        &mut self,
        index: usize,
        alignment: Alignment,
    ) -> Result<&mut Self> {
        self.check_column(index)?;
        self.alignment[index] = alignment;
        Ok(self)
    }

    pub fn set_column_numeric(&mut self, index: usize, numeric: bool) -> Result<&mut Self> {
        self.check_column(index)?;
        self.numeric[index] = numeric;
        Ok(self)
    }

    pub fn set_sort(&mut self, sort: bool) -> &mut Self {
        self.sort = sort;
        self
    }

    pub fn set_sort_column(&mut self, index: usize) -> Result<&mut Self> {
        self.check_column(index)?;
        self.sort_column = index;
        Ok(self)
    }

    pub fn set_sort_reverse(&mut self, reverse: bool) -> &mut Self {
        self.sort_reverse = reverse;
        self
    }

    pub fn set_use_column_separator(&mut self, value: bool) -> &mut Self {
        self.use_column_separator = value;
        self
    }

    pub fn set_center_title(&mut self, center: bool) -> &mut Self {
        self.center_title = center;
        self
    }

    pub fn set_repeat_title_at_bottom(&mut self, repeat: bool) -> &mut Self {
        self.repeat_title_at_bottom = repeat;
        self
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Set the title row. Its cells take part in column sizing.
    pub fn add_title<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<()> {
        self.check_arity(cells.len())?;
        let title = self.accept(cells.iter().map(|c| c.as_ref().to_string()).collect());
        self.title = Some(title);
        Ok(())
    }

    /// Append a data row.
    pub fn add_data<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<()> {
        self.check_arity(cells.len())?;
        let row = self.accept(cells.iter().map(|c| c.as_ref().to_string()).collect());
        self.rows.push(row);
        Ok(())
    }

    /// Append a data row whose cells may be missing.
    ///
    /// A row with a missing cell is dropped and reported, and `Ok(false)` is
    /// returned; the table is left untouched.
    pub fn add_data_checked<S: AsRef<str>>(&mut self, cells: &[Option<S>]) -> Result<bool> {
        self.check_arity(cells.len())?;

        if let Some(index) = cells.iter().position(Option::is_none) {
            let shown: Vec<&str> = cells
                .iter()
                .map(|c| c.as_ref().map(|s| s.as_ref()).unwrap_or("null"))
                .collect();
            warn!(
                column = index,
                row = %shown.join(", "),
                "dropping row with a missing value"
            );
            return Ok(false);
        }

        let row = self.accept(
            cells
                .iter()
                .flatten()
                .map(|c| c.as_ref().to_string())
                .collect(),
        );
        self.rows.push(row);
        Ok(true)
    }

    /// Append a free-form line above the table.
    pub fn add_header(&mut self, text: impl Into<String>) {
        self.headers.push(text.into());
    }

    /// Insert a free-form line above the table at `index`.
    pub fn insert_header(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        if index > self.headers.len() {
            return Err(BlockStatsError::InvalidHeaderIndex {
                index,
                len: self.headers.len(),
            });
        }
        self.headers.insert(index, text.into());
        Ok(())
    }

    /// Append a free-form line below the table.
    pub fn add_footer(&mut self, text: impl Into<String>) {
        self.footers.push(text.into());
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    pub fn clear_footers(&mut self) {
        self.footers.clear();
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Sort the rows (when enabled) and render them in the current format.
    pub fn get_lines(&mut self) -> Vec<String> {
        if self.sort {
            let key = SortKey {
                column: self.sort_column,
                numeric: self.is_numeric(self.sort_column),
                reverse: self.sort_reverse,
            };
            let rows = std::mem::take(&mut self.rows);
            self.rows = merge_sort_by(rows, &|a: &Row, b: &Row| key.compare(a, b));
        }

        format::render(self)
    }

    // ------------------------------------------------------------------
    // Accessors used by the formatters
    // ------------------------------------------------------------------

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn title(&self) -> Option<&Row> {
        self.title.as_ref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn footers(&self) -> &[String] {
        &self.footers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn alignment(&self, index: usize) -> Alignment {
        self.alignment.get(index).copied().unwrap_or_default()
    }

    pub fn is_numeric(&self, index: usize) -> bool {
        self.numeric.get(index).copied().unwrap_or(false)
    }

    /// Widest cell seen so far in each column.
    pub fn column_widths(&self) -> &[usize] {
        &self.widths
    }

    /// Sum of all column widths.
    pub fn combined_width(&self) -> usize {
        self.widths.iter().sum()
    }

    /// Combined width plus the space taken by the separators between columns.
    pub fn total_width(&self) -> usize {
        self.combined_width() + format::COLUMN_GAP * (self.columns - 1)
    }

    pub fn use_column_separator(&self) -> bool {
        self.use_column_separator
    }

    pub fn center_title(&self) -> bool {
        self.center_title
    }

    pub fn repeat_title_at_bottom(&self) -> bool {
        self.repeat_title_at_bottom
    }

    fn check_column(&self, index: usize) -> Result<()> {
        if index >= self.columns {
            return Err(BlockStatsError::InvalidColumn {
                index,
                columns: self.columns,
            });
        }
        Ok(())
    }

    fn check_arity(&self, got: usize) -> Result<()> {
        if got != self.columns {
            return Err(BlockStatsError::ColumnCountMismatch {
                expected: self.columns,
                got,
            });
        }
        Ok(())
    }

    fn accept(&mut self, cells: Vec<String>) -> Row {
        for (width, cell) in self.widths.iter_mut().zip(&cells) {
            *width = (*width).max(cell.chars().count());
        }
        Row { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(table: &TableModel, index: usize) -> Vec<String> {
        table
            .rows()
            .iter()
            .map(|r| r.cell(index).to_string())
            .collect()
    }

    #[test]
    fn test_zero_columns_rejected() {
        assert!(matches!(
            TableModel::new(0, Format::AsciiTable),
            Err(BlockStatsError::InvalidColumnCount(0))
        ));
    }

    #[test]
    fn test_arity_mismatch_leaves_state_unchanged() {
        let mut table = TableModel::new(2, Format::AsciiTable).unwrap();
        table.add_data(&["a", "1"]).unwrap();

        let err = table.add_data(&["b", "2", "extra"]).unwrap_err();
        assert!(matches!(
            err,
            BlockStatsError::ColumnCountMismatch {
                expected: 2,
                got: 3
            }
        ));
        assert!(table.add_data(&["lonely-but-very-long"]).is_err());
        assert!(table.add_title(&["only-one"]).is_err());

        assert_eq!(table.columns(), 2);
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.column_widths(), &[1, 1]);
        assert!(table.title().is_none());
    }

    #[test]
    fn test_single_column_accepts_one_cell() {
        let mut table = TableModel::new(1, Format::Simple).unwrap();
        table.add_data(&["only"]).unwrap();
        assert!(table.add_data(&["a", "b"]).is_err());
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn test_widths_track_maximum() {
        let mut table = TableModel::new(2, Format::AsciiTable).unwrap();
        table.add_data(&["abc", "1"]).unwrap();
        assert_eq!(table.column_widths(), &[3, 1]);
        table.add_data(&["a", "12345"]).unwrap();
        assert_eq!(table.column_widths(), &[3, 5]);
        table.add_data(&["abcdef", ""]).unwrap();
        assert_eq!(table.column_widths(), &[6, 5]);
        assert_eq!(table.combined_width(), 11);
        assert_eq!(table.total_width(), 14);
    }

    #[test]
    fn test_widths_count_chars_not_bytes() {
        let mut table = TableModel::new(1, Format::AsciiTable).unwrap();
        table.add_data(&["grüß"]).unwrap();
        assert_eq!(table.column_widths(), &[4]);
    }

    #[test]
    fn test_title_widens_columns() {
        let mut table = TableModel::new(2, Format::AsciiTable).unwrap();
        table.add_data(&["a", "1"]).unwrap();
        table.add_title(&["Block", "Count"]).unwrap();
        assert_eq!(table.column_widths(), &[5, 5]);
    }

    #[test]
    fn test_missing_cell_drops_only_that_row() {
        let mut table = TableModel::new(2, Format::AsciiTable).unwrap();
        assert!(table.add_data_checked(&[Some("a"), Some("1")]).unwrap());
        assert!(!table
            .add_data_checked(&[Some("a-very-long-name"), None])
            .unwrap());
        assert!(table.add_data_checked(&[Some("b"), Some("2")]).unwrap());

        assert_eq!(column(&table, 0), vec!["a", "b"]);
        // The dropped row did not widen anything
        assert_eq!(table.column_widths(), &[1, 1]);

        // Wrong arity is still an error, not a drop
        assert!(table.add_data_checked(&[Some("c")]).is_err());
    }

    #[test]
    fn test_invalid_column_index() {
        let mut table = TableModel::new(2, Format::AsciiTable).unwrap();
        assert!(table
            .set_column_properties(2, Alignment::Right, true)
            .is_err());
        assert!(table.set_column_alignment(5, Alignment::Right).is_err());
        assert!(table.set_column_numeric(2, true).is_err());
        assert!(table.set_sort_column(2).is_err());

        table.set_sort_column(1).unwrap();
        assert!(table.set_sort_column(9).is_err());
        // Previous valid sort column still in effect
        table.add_data(&["a", "2"]).unwrap();
        table.add_data(&["b", "1"]).unwrap();
        table.set_format(Format::Simple);
        assert_eq!(table.get_lines(), vec!["b, 1", "a, 2"]);
    }

    #[test]
    fn test_numeric_sort() {
        let mut table = TableModel::new(2, Format::Simple).unwrap();
        table.set_column_numeric(1, true).unwrap();
        table.set_sort_column(1).unwrap();
        table.add_data(&["b", "2"]).unwrap();
        table.add_data(&["a", "10"]).unwrap();
        assert!(table.is_numeric(1));
        assert!(!table.is_numeric(0));
        assert!(!table.is_numeric(7));

        table.get_lines();
        assert_eq!(column(&table, 0), vec!["b", "a"]);
        assert_eq!(column(&table, 1), vec!["2", "10"]);
    }

    #[test]
    fn test_lexicographic_sort_without_numeric_flag() {
        let mut table = TableModel::new(2, Format::Simple).unwrap();
        table.set_sort_column(1).unwrap();
        table.add_data(&["b", "2"]).unwrap();
        table.add_data(&["a", "10"]).unwrap();

        table.get_lines();
        assert_eq!(column(&table, 1), vec!["10", "2"]);
    }

    #[test]
    fn test_numeric_sort_falls_back_to_strings() {
        let mut table = TableModel::new(1, Format::Simple).unwrap();
        table.set_column_numeric(0, true).unwrap();
        for cell in ["10", "n/a", "9", "-"] {
            table.add_data(&[cell]).unwrap();
        }
        table.get_lines();
        // Comparisons mixing a number and a non-number fall back to strings
        let cells = column(&table, 0);
        assert_eq!(cells.len(), 4);
        let nine = cells.iter().position(|c| c == "9").unwrap();
        let ten = cells.iter().position(|c| c == "10").unwrap();
        assert!(nine < ten);
    }

    #[test]
    fn test_reverse_sort_is_stable() {
        let mut table = TableModel::new(2, Format::Simple).unwrap();
        table.set_column_numeric(1, true).unwrap();
        table.set_sort_column(1).unwrap();
        table.set_sort_reverse(true);
        table.add_data(&["first", "5"]).unwrap();
        table.add_data(&["big", "50"]).unwrap();
        table.add_data(&["second", "5"]).unwrap();

        table.get_lines();
        assert_eq!(column(&table, 0), vec!["big", "first", "second"]);
    }

    #[test]
    fn test_sort_disabled_keeps_insertion_order() {
        let mut table = TableModel::new(1, Format::Simple).unwrap();
        table.set_sort(false);
        table.add_data(&["b"]).unwrap();
        table.add_data(&["a"]).unwrap();
        assert_eq!(table.get_lines(), vec!["b", "a"]);
    }

    #[test]
    fn test_insert_header() {
        let mut table = TableModel::new(1, Format::Simple).unwrap();
        table.add_header("second");
        table.insert_header(0, "first").unwrap();
        assert!(table.insert_header(5, "nowhere").is_err());
        assert_eq!(table.headers(), &["first", "second"]);

        table.clear_headers();
        table.add_footer("bye");
        table.clear_footers();
        assert!(table.headers().is_empty());
        assert!(table.footers().is_empty());
    }

    #[test]
    fn test_repeat_title_default_depends_on_format() {
        assert!(TableModel::new(2, Format::AsciiTable)
            .unwrap()
            .repeat_title_at_bottom());
        assert!(!TableModel::new(2, Format::Csv)
            .unwrap()
            .repeat_title_at_bottom());
    }

    #[test]
    fn test_get_lines_is_repeatable() {
        let mut table = TableModel::new(2, Format::AsciiTable).unwrap();
        table.set_column_properties(1, Alignment::Right, true).unwrap();
        table.add_header("A header that is much longer than the data");
        table.add_title(&["Name", "N"]).unwrap();
        table.add_data(&["b", "2"]).unwrap();
        table.add_data(&["a", "10"]).unwrap();

        let first = table.get_lines();
        let second = table.get_lines();
        assert_eq!(first, second);
    }
}
