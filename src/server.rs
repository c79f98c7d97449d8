//! Text-content save endpoint.
//!
//! A small collaborator service with no relationship to the binary pipeline
//! artifacts: it accepts `POST /views/<name>` with a JSON body carrying a
//! `content` string and overwrites the matching file under the configured
//! root. Anything outside the `/views/` prefix is not found.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::Result;

#[derive(Clone)]
struct ServerState {
    root: Arc<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct SaveRequest {
    content: String,
}

/// Build the save endpoint router rooted at `root`
pub fn router(root: PathBuf) -> Router {
    Router::new()
        .route("/views/*path", post(save_view))
        .with_state(ServerState {
            root: Arc::new(root),
        })
}

/// Bind and serve the save endpoint until the process exits
pub async fn serve(addr: SocketAddr, root: PathBuf) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Save endpoint listening on http://{}", addr);
    axum::serve(listener, router(root)).await?;
    Ok(())
}

async fn save_view(
    State(state): State<ServerState>,
    UrlPath(rest): UrlPath<String>,
    Json(request): Json<SaveRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(target) = resolve_view_path(&state.root, &rest) else {
        warn!("Rejected save path outside views root: {}", rest);
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": "File not found"})),
        );
    };

    if let Some(parent) = target.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!("Could not create {}: {}", parent.display(), e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": e.to_string()})),
            );
        }
    }

    match tokio::fs::write(&target, request.content).await {
        Ok(()) => {
            info!("Saved {}", target.display());
            (StatusCode::OK, Json(json!({"status": "success"})))
        }
        Err(e) => {
            warn!("Could not write {}: {}", target.display(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": e.to_string()})),
            )
        }
    }
}

/// Map a request path to a file under `<root>/views`, refusing anything
/// that would escape it
fn resolve_view_path(root: &Path, rest: &str) -> Option<PathBuf> {
    let rel = Path::new(rest);
    if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(root.join("views").join(rel))
}
