use serde::{Deserialize, Serialize};

use crate::dimensions::Dimensions;
use crate::image_type::ImageType;
use crate::item::ItemId;

/// One (type, index) classification unit for a single item.
///
/// `tag` is `Some` exactly when the slot is present on the server. The
/// low-resolution flag is only ever set for present slots with known
/// dimensions; a present slot whose probe failed keeps `dimensions = None`
/// and `probe_failed = true` and is never flagged low-resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub image_type: ImageType,
    pub index: u32,
    pub tag: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub low_resolution: bool,
    pub probe_failed: bool,
}

impl Slot {
    pub fn present(image_type: ImageType, index: u32, tag: impl Into<String>) -> Self {
        Self {
            image_type,
            index,
            tag: Some(tag.into()),
            dimensions: None,
            low_resolution: false,
            probe_failed: false,
        }
    }

    pub fn absent(image_type: ImageType, index: u32) -> Self {
        Self {
            image_type,
            index,
            tag: None,
            dimensions: None,
            low_resolution: false,
            probe_failed: false,
        }
    }

    pub fn is_present(&self) -> bool {
        self.tag.is_some()
    }

    /// Human-facing label: `Backdrop (2)` for multi-index types (one-based),
    /// bare type name otherwise.
    pub fn label(&self) -> String {
        if self.image_type.is_multi_index() {
            format!("{} ({})", self.image_type, self.index + 1)
        } else {
            self.image_type.to_string()
        }
    }
}

/// Fully-qualified slot address, used for export selections and fetched
/// byte lookups.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SlotRef {
    pub item: ItemId,
    pub image_type: ImageType,
    pub index: u32,
}

impl SlotRef {
    pub fn new(item: &ItemId, image_type: ImageType, index: u32) -> Self {
        Self {
            item: item.clone(),
            image_type,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_indexes_multi_types_one_based() {
        assert_eq!(Slot::present(ImageType::Backdrop, 0, "t").label(), "Backdrop (1)");
        assert_eq!(Slot::absent(ImageType::Backdrop, 1).label(), "Backdrop (2)");
        assert_eq!(Slot::present(ImageType::Primary, 0, "t").label(), "Primary");
    }
}
