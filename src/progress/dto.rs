use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;

use super::gate::WaitTime;
use super::repo::ProgressRecord;

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub product: Option<String>,
}

/// Body of `POST /progress/advance`. The wire field is `currentModule` for
/// compatibility with the existing clients: it carries the module the user
/// is asking to move *to*.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceRequest {
    pub product: String,
    pub current_module: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDto {
    pub current_module: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_completed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ProgressRecord> for ProgressDto {
    fn from(r: ProgressRecord) -> Self {
        Self {
            current_module: r.current_module,
            last_completed_at: r.last_completed_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub progress: Option<ProgressDto>,
}

/// Everything that can stop an advance. `WaitNotElapsed` is an expected
/// outcome the client renders as a countdown, not a fault.
#[derive(Debug, Error)]
pub enum AdvanceError {
    #[error("wait time not elapsed")]
    WaitNotElapsed {
        wait_time: WaitTime,
        can_complete_at: OffsetDateTime,
    },
    #[error("product not found")]
    UnknownProduct,
    #[error("requested module {requested} is out of sequence, expected {expected}")]
    OutOfSequence { requested: u32, expected: u32 },
    #[error("requested module {requested} is past the final module {module_count}")]
    PastFinalModule { requested: u32, module_count: u32 },
    #[error("product and current module are required")]
    MissingInput,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AdvanceError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdvanceError::WaitNotElapsed {
                wait_time,
                can_complete_at,
            } => {
                let can_complete_at = can_complete_at
                    .format(&time::format_description::well_known::Rfc3339)
                    .unwrap_or_default();
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "error": "WAIT_TIME_NOT_ELAPSED",
                        "message": "Please complete the assignment in your current module before moving to the next",
                        "waitTime": wait_time,
                        "canCompleteAt": can_complete_at,
                    })),
                )
                    .into_response()
            }
            AdvanceError::UnknownProduct => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Product not found" })),
            )
                .into_response(),
            e @ AdvanceError::OutOfSequence { .. } => (
                StatusCode::CONFLICT,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            e @ AdvanceError::PastFinalModule { .. } => (
                StatusCode::CONFLICT,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            e @ AdvanceError::MissingInput => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            AdvanceError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to update progress" })),
            )
                .into_response(),
        }
    }
}
