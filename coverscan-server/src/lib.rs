//! # Coverscan Server
//!
//! Web front end for the artwork inventory engine:
//!
//! - **Configuration form**: pick a server, library, tracked artwork types,
//!   resolution thresholds, colors and export names
//! - **Background runs**: each trigger spawns one task that produces an
//!   HTML report or ZIP export, published atomically
//! - **Artifact management**: listing, serving, embedded downloads and
//!   deletion of generated files
//! - **Settings history**: last-used and per-library settings persisted as
//!   a versioned JSON record

pub mod artifacts;
pub mod errors;
pub mod form;
pub mod history;
pub mod routes;
pub mod runs;
pub mod state;

pub use errors::{AppError, AppResult};
pub use state::{AppState, ServerConfig};
