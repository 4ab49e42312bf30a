//! Generated-artifact management: listing, serving, embedded download and
//! deletion.

use std::path::{Path, PathBuf};

use axum::{
    extract::{Path as UrlPath, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// A library's generated files, newest first.
#[derive(Debug, Clone)]
pub struct ArtifactGroup {
    pub library: String,
    pub files: Vec<String>,
}

/// Strip anything that could escape the output directory from a
/// user-supplied path component.
pub fn safe_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '\0' => '-',
            _ => ch,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "untitled".to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn resolve(
    output_dir: &Path,
    library: &str,
    filename: &str,
) -> AppResult<PathBuf> {
    if library != safe_component(library) || filename != safe_component(filename)
    {
        return Err(AppError::bad_request("invalid artifact path"));
    }
    Ok(output_dir.join(library).join(filename))
}

/// Every library folder with at least one generated file. Folders sort
/// ascending, files descending so the newest run comes first (filenames
/// start with the timestamp).
pub fn list(output_dir: &Path) -> Vec<ArtifactGroup> {
    let mut groups = Vec::new();
    let Ok(entries) = std::fs::read_dir(output_dir) else {
        return groups;
    };
    let mut folders: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    folders.sort();
    for folder in folders {
        let Ok(entries) = std::fs::read_dir(&folder) else {
            continue;
        };
        let mut files: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".html") || name.ends_with(".zip"))
            .collect();
        if files.is_empty() {
            continue;
        }
        files.sort_by(|a, b| b.cmp(a));
        let library = folder
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_owned();
        groups.push(ArtifactGroup { library, files });
    }
    groups
}

fn content_type(filename: &str) -> &'static str {
    if filename.ends_with(".html") {
        "text/html; charset=utf-8"
    } else if filename.ends_with(".zip") {
        "application/zip"
    } else {
        "application/octet-stream"
    }
}

/// `GET /output/{library}/{file}`.
pub async fn serve(
    State(state): State<AppState>,
    UrlPath((library, filename)): UrlPath<(String, String)>,
) -> AppResult<Response> {
    let path = resolve(&state.config.output_dir, &library, &filename)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found("artifact not found"))?;
    Ok((
        [(header::CONTENT_TYPE, content_type(&filename))],
        bytes,
    )
        .into_response())
}

/// `GET /download/{library}/{file}` — same bytes, attachment disposition.
pub async fn download(
    State(state): State<AppState>,
    UrlPath((library, filename)): UrlPath<(String, String)>,
) -> AppResult<Response> {
    let path = resolve(&state.config.output_dir, &library, &filename)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found("artifact not found"))?;
    let disposition = format!("attachment; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, content_type(&filename).to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// `DELETE /output/{library}/{file}` — remove the artifact and prune the
/// library folder if it is now empty.
pub async fn delete(
    State(state): State<AppState>,
    UrlPath((library, filename)): UrlPath<(String, String)>,
) -> AppResult<StatusCode> {
    let path = resolve(&state.config.output_dir, &library, &filename)?;
    tokio::fs::remove_file(&path)
        .await
        .map_err(|_| AppError::not_found("artifact not found"))?;
    info!(library, filename, "artifact deleted");
    let folder = state.config.output_dir.join(&library);
    if let Ok(mut entries) = tokio::fs::read_dir(&folder).await
        && entries.next_entry().await.ok().flatten().is_none()
    {
        let _ = tokio::fs::remove_dir(&folder).await;
    }
    Ok(StatusCode::NO_CONTENT)
}
