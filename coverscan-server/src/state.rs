use std::{fmt, path::PathBuf, sync::Arc};

use crate::history::HistoryStore;
use crate::runs::RunRegistry;

/// Server-level configuration resolved from CLI flags and environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub history: Arc<HistoryStore>,
    pub runs: Arc<RunRegistry>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
