//! Query processing: select and sort counted data.
//!
//! This module handles the second stage of the pipeline - turning a raw
//! counter into a query-ready form. It provides:
//!
//! - **Options**: which types to select (`TypeFilter`) and how reports are
//!   produced (`ReportOptions`)
//! - **QuerySet**: sorted items plus an optional summary line
//!
//! ## Example
//!
//! ```rust
//! use blockstatslib::data::{CountTarget, TypeCounter, TypeKey};
//! use blockstatslib::query::{StatsQuerySet, TypeFilter};
//!
//! let mut counter = TypeCounter::new();
//! counter.add(&TypeKey::with_variant("minecraft:wool", 14), 4);
//! counter.add(&TypeKey::new("minecraft:stone"), 9);
//!
//! let filter = TypeFilter::parse(&["minecraft:wool"]);
//! let queryset = StatsQuerySet::filtered(&counter, CountTarget::Blocks, &filter);
//! assert_eq!(queryset.items.len(), 1);
//! assert_eq!(queryset.total, 4);
//! ```

pub mod options;
pub mod queryset;

pub use options::{ReportOptions, TypeFilter};
pub use queryset::{QueryItem, StatsQuerySet};
