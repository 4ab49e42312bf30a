use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::image_type::ImageType;
use crate::item::ItemId;

/// Per-run minimum resolution. Each axis is independent; `None` or zero
/// disables that axis entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default)]
    pub min_width: Option<u32>,
    #[serde(default)]
    pub min_height: Option<u32>,
}

impl Thresholds {
    pub fn width_floor(&self) -> Option<u32> {
        self.min_width.filter(|w| *w > 0)
    }

    pub fn height_floor(&self) -> Option<u32> {
        self.min_height.filter(|h| *h > 0)
    }
}

/// Report color scheme, passed through to the renderer as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    pub table_background: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: "#000000".to_owned(),
            text: "#ffffff".to_owned(),
            table_background: "#000000".to_owned(),
        }
    }
}

/// Everything a single report run needs, supplied explicitly by the caller.
/// The engine holds no ambient settings of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    pub tracked: Vec<ImageType>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub colors: ColorScheme,
    /// Inline image bytes into the HTML as data URIs.
    #[serde(default)]
    pub embedded: bool,
}

/// Naming rules for the export archive.
///
/// `folder_overrides` replace an item's disambiguated display title as its
/// folder name; `file_basenames` replace a type's default base name for the
/// files inside.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportNaming {
    #[serde(default)]
    pub folder_overrides: BTreeMap<ItemId, String>,
    #[serde(default)]
    pub file_basenames: BTreeMap<ImageType, String>,
}

impl ExportNaming {
    pub fn folder_name<'a>(&'a self, item: &ItemId, display_title: &'a str) -> &'a str {
        self.folder_overrides
            .get(item)
            .map(String::as_str)
            .unwrap_or(display_title)
    }

    pub fn file_basename(&self, image_type: ImageType) -> &str {
        self.file_basenames
            .get(&image_type)
            .map(String::as_str)
            .unwrap_or_else(|| image_type.default_export_basename())
    }
}
