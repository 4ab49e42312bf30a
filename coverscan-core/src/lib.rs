//! # Coverscan Core
//!
//! The artwork inventory engine: given a library on an Emby-compatible
//! media server, resolve each item's concrete artwork slots, classify them
//! as present / missing / low-resolution against per-run thresholds, and
//! render the result as a navigable HTML gallery or a ZIP export.
//!
//! Everything below the fetch layer is a pure, synchronous function over
//! its inputs; the async surface is confined to [`jellyfin`] and
//! [`engine`].

pub mod archive;
pub mod classify;
pub mod engine;
pub mod error;
pub mod html;
pub mod jellyfin;
pub mod report;
pub mod slots;
pub mod titles;

pub use engine::{RunProduct, SlotAssets};
pub use error::EngineError;
pub use html::RenderOptions;
pub use jellyfin::{FetchedImage, JellyfinClient};
