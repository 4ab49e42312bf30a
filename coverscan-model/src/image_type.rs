use std::fmt;

use serde::{Deserialize, Serialize};

/// Artwork categories a report run can track.
///
/// Variant order is the canonical display order: the first four types fill
/// the left gallery column, the rest the right one. Summary-table columns,
/// gallery blocks and archive entries all follow this order regardless of
/// the order the user ticked the checkboxes in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ImageType {
    Primary,
    Thumb,
    ClearArt,
    Menu,
    Backdrop,
    Banner,
    Box,
    BoxRear,
    Disc,
    Logo,
}

/// Which side of the two-column gallery layout a type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryColumn {
    Left,
    Right,
}

impl ImageType {
    /// All known types in canonical order.
    pub const ALL: [ImageType; 10] = [
        ImageType::Primary,
        ImageType::Thumb,
        ImageType::ClearArt,
        ImageType::Menu,
        ImageType::Backdrop,
        ImageType::Banner,
        ImageType::Box,
        ImageType::BoxRear,
        ImageType::Disc,
        ImageType::Logo,
    ];

    /// The name the Emby-compatible API uses for this type, both in
    /// `ImageTags` keys and in image URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Primary => "Primary",
            ImageType::Thumb => "Thumb",
            ImageType::ClearArt => "ClearArt",
            ImageType::Menu => "Menu",
            ImageType::Backdrop => "Backdrop",
            ImageType::Banner => "Banner",
            ImageType::Box => "Box",
            ImageType::BoxRear => "BoxRear",
            ImageType::Disc => "Disc",
            ImageType::Logo => "Logo",
        }
    }

    /// Parse an API tag-map key. Unknown keys yield `None` and are dropped
    /// at the catalog boundary.
    pub fn from_api_name(name: &str) -> Option<ImageType> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(name))
    }

    /// Backdrop is the only type that can carry more than one image.
    pub fn is_multi_index(&self) -> bool {
        matches!(self, ImageType::Backdrop)
    }

    pub fn column(&self) -> GalleryColumn {
        match self {
            ImageType::Primary
            | ImageType::Thumb
            | ImageType::ClearArt
            | ImageType::Menu => GalleryColumn::Left,
            _ => GalleryColumn::Right,
        }
    }

    /// Default base name for exported files of this type.
    pub fn default_export_basename(&self) -> &'static str {
        match self {
            ImageType::Primary => "cover",
            ImageType::Thumb => "thumbnail",
            ImageType::ClearArt => "clearart",
            ImageType::Menu => "menu",
            ImageType::Backdrop => "backdrop",
            ImageType::Banner => "banner",
            ImageType::Box => "box",
            ImageType::BoxRear => "boxrear",
            ImageType::Disc => "disc",
            ImageType::Logo => "logo",
        }
    }

    /// Restrict `ALL` to the tracked set, preserving canonical order.
    pub fn canonical(tracked: &[ImageType]) -> Vec<ImageType> {
        Self::ALL
            .into_iter()
            .filter(|ty| tracked.contains(ty))
            .collect()
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
