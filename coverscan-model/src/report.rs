use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::slot::Slot;

/// Per-item aggregation: the item, its disambiguated display title and its
/// resolved slots in canonical order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub item: Item,
    pub display_title: String,
    pub slots: Vec<Slot>,
    /// At least one resolved slot is absent.
    pub has_missing: bool,
    /// At least one present slot fails a configured threshold.
    pub has_low_res: bool,
}

/// Run-level item counts for the completion message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub complete: usize,
    pub with_missing: usize,
    pub with_low_res: usize,
}

/// A per-slot recoverable failure, reported alongside an otherwise
/// successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub item_title: String,
    pub slot: String,
    pub reason: String,
}

/// The full in-memory model for one run. Rebuilt from scratch on every
/// invocation; nothing survives across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub library_name: String,
    /// Tracked types in canonical order; the summary-table columns.
    pub tracked: Vec<crate::image_type::ImageType>,
    pub rows: Vec<ReportRow>,
    pub summary: RunSummary,
    pub diagnostics: Vec<Diagnostic>,
}
