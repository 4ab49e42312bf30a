//! Core data model definitions shared across Coverscan crates.

pub mod dimensions;
pub mod image_type;
pub mod item;
pub mod options;
pub mod report;
pub mod slot;

pub use dimensions::Dimensions;
pub use image_type::{GalleryColumn, ImageType};
pub use item::{Item, ItemId, ItemKind};
pub use options::{ColorScheme, ExportNaming, RunOptions, Thresholds};
pub use report::{Diagnostic, Report, ReportRow, RunSummary};
pub use slot::{Slot, SlotRef};
