//! REST API handlers
//!
//! Upload, status, listing and leaderboard endpoints. Failures render as
//! `{"detail": ...}` through `StoreError`'s `IntoResponse`.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum::extract::multipart::MultipartError;
use serde::Deserialize;
use serde_json::{Value, json};

use shared::{LeaderboardEntry, ProcessId, Submission, UploadReceipt, process_debug};

use crate::error::{StoreError, StoreResult};
use crate::store_impl::StoreServer;
use crate::traits::{ArtifactStorage, Evaluator};
use crate::types::IncomingArtifact;

/// Welcome endpoint - /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Profile Forge Submission Store" }))
}

/// Health check - /health
pub async fn health<A, E>(State(server): State<StoreServer<A, E>>) -> Json<Value>
where
    A: ArtifactStorage + 'static,
    E: Evaluator + 'static,
{
    Json(json!({
        "status": "ok",
        "submissions": server.submission_count().await,
    }))
}

/// Upload endpoint - /submit
///
/// Multipart fields: `file` (the archive), `userId`, `userName`.
pub async fn submit<A, E>(
    State(server): State<StoreServer<A, E>>,
    multipart: Multipart,
) -> StoreResult<Json<UploadReceipt>>
where
    A: ArtifactStorage + 'static,
    E: Evaluator + 'static,
{
    let incoming = read_upload(multipart).await?;
    let receipt = server.accept_upload(incoming).await?;
    Ok(Json(receipt))
}

/// Status endpoint - /submissions/:id
pub async fn get_submission<A, E>(
    State(server): State<StoreServer<A, E>>,
    Path(id): Path<String>,
) -> StoreResult<Json<Submission>>
where
    A: ArtifactStorage + 'static,
    E: Evaluator + 'static,
{
    process_debug!(ProcessId::current(), "🔍 Status query for {}", id);
    Ok(Json(server.submission(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Per-user listing - /submissions?userId=
pub async fn list_submissions<A, E>(
    State(server): State<StoreServer<A, E>>,
    Query(params): Query<ListParams>,
) -> StoreResult<Json<Vec<Submission>>>
where
    A: ArtifactStorage + 'static,
    E: Evaluator + 'static,
{
    let user_id = params
        .user_id
        .filter(|uid| !uid.trim().is_empty())
        .ok_or(StoreError::MissingField { field: "userId" })?;
    Ok(Json(server.submissions_for(&user_id).await))
}

/// Ranked leaderboard - /leaderboard
pub async fn leaderboard<A, E>(State(server): State<StoreServer<A, E>>) -> Json<Vec<LeaderboardEntry>>
where
    A: ArtifactStorage + 'static,
    E: Evaluator + 'static,
{
    Json(server.leaderboard().await)
}

/// Collect the upload fields; unknown fields are skipped
async fn read_upload(mut multipart: Multipart) -> StoreResult<IncomingArtifact> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut user_id: Option<String> = None;
    let mut user_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, bytes.to_vec()));
            }
            "userId" => user_id = Some(field.text().await.map_err(multipart_error)?),
            "userName" => user_name = Some(field.text().await.map_err(multipart_error)?),
            _ => continue,
        }
    }

    let (file_name, bytes) = file
        .filter(|(name, _)| !name.is_empty())
        .ok_or(StoreError::MissingField { field: "file" })?;
    let user_id = user_id.ok_or(StoreError::MissingField { field: "userId" })?;

    Ok(IncomingArtifact {
        file_name,
        bytes,
        user_id,
        user_name: user_name.unwrap_or_default(),
    })
}

fn multipart_error(e: MultipartError) -> StoreError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StoreError::BodyTooLarge(e.body_text())
    } else {
        StoreError::Multipart { message: e.body_text() }
    }
}
