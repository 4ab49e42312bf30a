//! Background report runs.
//!
//! Each trigger spawns one task; the registry tracks its status by id. The
//! task writes its artifact to a uniquely-named temp file and renames it
//! into place only when complete, so a concurrent listing never sees a
//! partial file. A failed run publishes nothing.

use std::collections::{BTreeSet, HashMap};
use std::io::Write as _;
use std::path::Path;

use axum::{
    Json,
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use coverscan_core::{
    EngineError, JellyfinClient, RenderOptions, archive, engine, html,
};
use coverscan_model::{
    ColorScheme, Diagnostic, ExportNaming, ImageType, RunOptions, RunSummary,
    SlotRef, Thresholds,
};

use crate::artifacts::safe_component;
use crate::errors::{AppError, AppResult};
use crate::history::StoredSettings;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Html,
    Zip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub server: String,
    pub api_key: String,
    pub library: String,
    pub kind: RunKind,
    pub images: Vec<ImageType>,
    #[serde(default)]
    pub min_width: Option<u32>,
    #[serde(default)]
    pub min_height: Option<u32>,
    #[serde(default)]
    pub colors: Option<ColorScheme>,
    #[serde(default)]
    pub embedded: bool,
    /// Export-only: explicit slot selection; `None` exports every resolved
    /// slot of the tracked types.
    #[serde(default)]
    pub selection: Option<Vec<SlotRef>>,
    #[serde(default)]
    pub naming: ExportNaming,
}

impl RunRequest {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            tracked: self.images.clone(),
            thresholds: Thresholds {
                min_width: self.min_width,
                min_height: self.min_height,
            },
            colors: self.colors.clone().unwrap_or_default(),
            embedded: self.embedded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunStatus {
    Running {
        started_at: DateTime<Utc>,
    },
    Completed {
        /// `library/filename`, servable under `/output/`.
        artifact: String,
        summary: RunSummary,
        diagnostics: Vec<Diagnostic>,
        finished_at: DateTime<Utc>,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: RwLock<HashMap<Uuid, RunStatus>>,
}

impl RunRegistry {
    pub async fn set(&self, id: Uuid, status: RunStatus) {
        self.runs.write().await.insert(id, status);
    }

    pub async fn get(&self, id: &Uuid) -> Option<RunStatus> {
        self.runs.read().await.get(id).cloned()
    }
}

/// `POST /runs` — validate, persist settings, spawn the task, answer 202
/// with the run id.
pub async fn start_run(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> AppResult<impl IntoResponse> {
    if request.server.trim().is_empty() {
        return Err(AppError::bad_request("server URL is required"));
    }
    if request.library.trim().is_empty() {
        return Err(AppError::bad_request("library name is required"));
    }
    let options = request.run_options();
    engine::validate_options(&options)?;
    // Fail fast on an unparseable URL before spawning anything.
    JellyfinClient::new(&request.server, &request.api_key)?;

    state
        .history
        .record_run(
            &request.library,
            StoredSettings {
                server: request.server.clone(),
                api_key: request.api_key.clone(),
                images: request.images.clone(),
                thresholds: options.thresholds,
                colors: request.colors.clone(),
                file_basenames: request.naming.file_basenames.clone(),
                embedded: request.embedded,
            },
        )
        .map_err(|err| {
            AppError::internal(format!("failed to persist settings: {err}"))
        })?;

    let id = Uuid::new_v4();
    state
        .runs
        .set(
            id,
            RunStatus::Running {
                started_at: Utc::now(),
            },
        )
        .await;
    info!(run = %id, library = %request.library, kind = ?request.kind, "run started");
    tokio::spawn(execute_run(state.clone(), id, request));

    Ok((StatusCode::ACCEPTED, Json(json!({ "run_id": id }))))
}

/// `GET /runs/{id}`.
pub async fn run_status(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<Uuid>,
) -> AppResult<Json<RunStatus>> {
    state
        .runs
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("unknown run"))
}

async fn execute_run(state: AppState, id: Uuid, request: RunRequest) {
    match perform_run(&state, &request).await {
        Ok((artifact, summary, diagnostics)) => {
            info!(run = %id, artifact = %artifact, "run completed");
            state
                .runs
                .set(
                    id,
                    RunStatus::Completed {
                        artifact,
                        summary,
                        diagnostics,
                        finished_at: Utc::now(),
                    },
                )
                .await;
        }
        Err(err) => {
            error!(run = %id, error = %err, "run failed");
            state
                .runs
                .set(
                    id,
                    RunStatus::Failed {
                        reason: err.to_string(),
                    },
                )
                .await;
        }
    }
}

async fn perform_run(
    state: &AppState,
    request: &RunRequest,
) -> Result<(String, RunSummary, Vec<Diagnostic>), EngineError> {
    let client = JellyfinClient::new(&request.server, &request.api_key)?;
    let options = request.run_options();
    let keep_bytes = request.embedded || request.kind == RunKind::Zip;
    let product =
        engine::run(&client, &request.library, &options, keep_bytes).await?;

    let (extension, bytes) = match request.kind {
        RunKind::Html => {
            let render_options = RenderOptions {
                colors: options.colors.clone(),
                embedded: options.embedded,
                client: &client,
                assets: &product.assets,
            };
            (
                "html",
                html::render(&product.report, &render_options).into_bytes(),
            )
        }
        RunKind::Zip => {
            let selection: BTreeSet<SlotRef> = match &request.selection {
                Some(slots) => slots.iter().cloned().collect(),
                None => archive::full_selection(&product.report),
            };
            (
                "zip",
                archive::build_zip(
                    &product.report,
                    &selection,
                    &request.naming,
                    &product.assets,
                )?,
            )
        }
    };

    let artifact = write_artifact(
        &state.config.output_dir,
        &product.report.library_name,
        extension,
        &bytes,
    )?;
    Ok((artifact, product.report.summary, product.report.diagnostics))
}

/// Write the artifact under `output/{library}/` and only then make it
/// discoverable via rename. Returns the `library/filename` path.
fn write_artifact(
    output_dir: &Path,
    library: &str,
    extension: &str,
    bytes: &[u8],
) -> Result<String, EngineError> {
    let library_dir = safe_component(library);
    let dir = output_dir.join(&library_dir);
    std::fs::create_dir_all(&dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let filename = format!("{timestamp} - {library_dir}.{extension}");

    let mut file = tempfile::NamedTempFile::new_in(&dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.persist(dir.join(&filename))
        .map_err(|err| EngineError::Io(err.error))?;
    Ok(format!("{library_dir}/{filename}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_artifact_is_discoverable_only_when_complete() {
        let dir = tempfile::tempdir().unwrap();
        let artifact =
            write_artifact(dir.path(), "Movies", "html", b"<html></html>")
                .unwrap();
        let path = dir.path().join(&artifact);
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"<html></html>");
        // Nothing else (no temp leftovers) in the library folder.
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("Movies"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_run_request_parses_minimal_json() {
        let request: RunRequest = serde_json::from_str(
            r#"{
                "server": "http://media.example:8096",
                "api_key": "key",
                "library": "Movies",
                "kind": "html",
                "images": ["Primary", "Backdrop"]
            }"#,
        )
        .unwrap();
        assert_eq!(request.kind, RunKind::Html);
        assert_eq!(
            request.images,
            vec![ImageType::Primary, ImageType::Backdrop]
        );
        assert!(request.selection.is_none());
    }
}
