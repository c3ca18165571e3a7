use std::sync::Arc;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    access::Identity,
    error::AppError,
    record::{SubmissionRecord, now_iso, validate_body},
    state::AppState,
    store::RecordStore,
};

/// `POST /design-details` — validates the submission, persists it under a
/// fresh id, and answers with that id. Exactly one store write on success,
/// none on any rejection. Retry on store failure is the caller's problem.
pub async fn design_details_handler<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if body.is_empty() {
        return Err(AppError::BodyRequired);
    }

    let parsed: Value = serde_json::from_slice(&body).map_err(|_| AppError::InvalidJson)?;
    let details = validate_body(&parsed)?;

    let record = SubmissionRecord::new(details);
    state.store.put(&record).await?;

    info!(id = %record.id, "Design details saved");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Design details saved successfully",
            "id": record.id,
            "timestamp": record.created_at,
        })),
    ))
}

/// `POST /writeToDynamo` — authenticated-write variant. Echoes the identity
/// claim injected by the upstream access-control layer, falling back to a
/// sentinel. No store write, no feed event.
pub async fn write_handler(identity: Option<Extension<Identity>>) -> impl IntoResponse {
    let user_id = identity
        .map(|Extension(Identity(sub))| sub)
        .unwrap_or_else(|| "unknown".to_string());

    (
        StatusCode::OK,
        Json(json!({
            "message": "Successfully processed request",
            "userId": user_id,
            "timestamp": now_iso(),
        })),
    )
}
