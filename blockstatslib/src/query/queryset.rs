//! Query set: counted data ready for table rendering.
//!
//! A StatsQuerySet sits between a [`TypeCounter`] and the final table. It
//! holds the counted types that were:
//! - Selected by the query (everything, or a [`TypeFilter`])
//! - Sorted by count, largest first, ties broken by display name
//!
//! The data pipeline is:
//! 1. Raw data (TypeCounter)
//! 2. StatsQuerySet (filtered, sorted, with an optional summary)
//! 3. TableModel (formatted strings for display)

use serde::Serialize;

use crate::data::aggregator::CountTarget;
use crate::data::counter::TypeCounter;
use crate::data::key::TypeKey;
use crate::output::format::Format;
use crate::output::table::{Alignment, TableModel};
use crate::Result;

use super::options::TypeFilter;

/// A single item in a query set (one row of data before string formatting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryItem {
    /// Counted type
    pub key: TypeKey,
    /// How many were counted
    pub count: u64,
}

/// Query set over one counter.
#[derive(Debug, Clone, Serialize)]
pub struct StatsQuerySet {
    /// What was counted
    pub target: CountTarget,
    /// Data rows (filtered and sorted)
    pub items: Vec<QueryItem>,
    /// Sum of the item counts
    pub total: u64,
    /// Chunks that contributed at least one count
    pub chunks_counted: u64,
    /// Summary line, present for unfiltered queries
    pub footer: Option<String>,
}

impl StatsQuerySet {
    /// Every counted type, with a summary footer.
    pub fn all(counter: &TypeCounter, target: CountTarget) -> Self {
        let items = build_items(counter, |_| true);
        let total = counter.total();
        let chunks_counted = counter.chunks_counted();
        let footer = Some(summary_line(target, total, chunks_counted));

        StatsQuerySet {
            target,
            items,
            total,
            chunks_counted,
            footer,
        }
    }

    /// Counted types selected by `filter`. No summary footer.
    pub fn filtered(counter: &TypeCounter, target: CountTarget, filter: &TypeFilter) -> Self {
        let items = build_items(counter, |key| filter.matches(key));
        let total = items.iter().map(|item| item.count).sum();

        StatsQuerySet {
            target,
            items,
            total,
            chunks_counted: counter.chunks_counted(),
            footer: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Build the two-column report table in `format`.
    pub fn to_table(&self, format: Format) -> Result<TableModel> {
        let mut table = TableModel::new(2, format)?;
        table.set_column_properties(1, Alignment::Right, true)?;
        table.set_sort_column(1)?.set_sort_reverse(true);

        let (header, name_column) = labels(self.target);
        table.add_header(header);
        table.add_title(&[name_column, "Count"])?;

        for item in &self.items {
            table.add_data(&[item.key.display_name(), item.count.to_string()])?;
        }

        if let Some(footer) = &self.footer {
            table.add_footer(footer.clone());
        }

        Ok(table)
    }

    /// Render straight to lines in `format`.
    pub fn to_lines(&self, format: Format) -> Result<Vec<String>> {
        Ok(self.to_table(format)?.get_lines())
    }
}

/// Header line and first column title for each target.
fn labels(target: CountTarget) -> (&'static str, &'static str) {
    match target {
        CountTarget::Blocks => ("Block stats:", "Block"),
        CountTarget::BlockEntities => ("Loaded BlockEntities by type:", "BlockEntity type"),
    }
}

fn summary_line(target: CountTarget, total: u64, chunks: u64) -> String {
    match target {
        CountTarget::Blocks => {
            format!("In total there were {} blocks in {} chunks", total, chunks)
        }
        CountTarget::BlockEntities => format!(
            "In total there were {} loaded BlockEntities in {} chunks",
            total, chunks
        ),
    }
}

/// Collect matching items, sorted by count descending then name ascending.
fn build_items(counter: &TypeCounter, mut select: impl FnMut(&TypeKey) -> bool) -> Vec<QueryItem> {
    let mut items: Vec<(String, QueryItem)> = counter
        .iter()
        .filter(|(key, _)| select(key))
        .map(|(key, count)| {
            (
                key.display_name(),
                QueryItem {
                    key: key.clone(),
                    count,
                },
            )
        })
        .collect();

    items.sort_by(|(a_name, a), (b_name, b)| {
        b.count.cmp(&a.count).then_with(|| a_name.cmp(b_name))
    });
    items.into_iter().map(|(_, item)| item).collect()
}
