use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image_type::ImageType;

/// Opaque server-assigned item identifier.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// The kind of library entry, as reported by the server.
///
/// Movies are always year-disambiguated in display titles; every other kind
/// only gets a year when its raw title collides within the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Movie,
    Series,
    Season,
    Episode,
    MusicAlbum,
    MusicArtist,
    MusicVideo,
    Folder,
    Other,
}

impl ItemKind {
    pub fn from_api_name(name: &str) -> ItemKind {
        match name.to_ascii_lowercase().as_str() {
            "movie" => ItemKind::Movie,
            "series" => ItemKind::Series,
            "season" => ItemKind::Season,
            "episode" => ItemKind::Episode,
            "musicalbum" | "musicvideoalbum" => ItemKind::MusicAlbum,
            "musicartist" | "artist" => ItemKind::MusicArtist,
            "musicvideo" => ItemKind::MusicVideo,
            "folder" => ItemKind::Folder,
            _ => ItemKind::Other,
        }
    }
}

/// One library entry with its validated per-type image tag map.
///
/// The tag map is keyed by the closed [`ImageType`] enum; unrecognized API
/// keys never make it past the catalog loader. The inner map goes from
/// image index to the server's opaque tag (only `Backdrop` ever has more
/// than index 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub year: Option<i32>,
    pub image_tags: BTreeMap<ImageType, BTreeMap<u32, String>>,
}

impl Item {
    pub fn tag(&self, image_type: ImageType, index: u32) -> Option<&str> {
        self.image_tags
            .get(&image_type)
            .and_then(|by_index| by_index.get(&index))
            .map(String::as_str)
    }
}
