use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, error, info};

use technoid_types::api::{ContactRequest, ContactResponse};

use crate::error::ApiError;
use crate::state::AppState;

const SAVE_FAILED: &str = "Server error saving message.";

/// A contact request that passed validation. All fields are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl TryFrom<ContactRequest> for ContactSubmission {
    type Error = ApiError;

    fn try_from(req: ContactRequest) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let name = required("name", req.name, &mut missing);
        let email = required("email", req.email, &mut missing);
        let message = required("message", req.message, &mut missing);

        if !missing.is_empty() {
            return Err(ApiError::Validation { missing });
        }

        Ok(Self { name, email, message })
    }
}

fn required(field: &'static str, value: Option<String>, missing: &mut Vec<&'static str>) -> String {
    let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        missing.push(field);
    }
    trimmed.to_string()
}

/// POST /api/contact
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body.map_err(|rejection| {
        debug!("Rejected contact body: {}", rejection.body_text());
        ApiError::MalformedBody(rejection.body_text())
    })?;

    let submission = ContactSubmission::try_from(req)?;

    // Run blocking DB insert off the async runtime
    let db = state.clone();
    let inserted = tokio::task::spawn_blocking(move || {
        db.db
            .insert_message(&submission.name, &submission.email, &submission.message)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(SAVE_FAILED)
    })?
    .map_err(|source| ApiError::Persistence {
        public: SAVE_FAILED,
        source,
    })?;

    info!(id = inserted.id, created_at = %inserted.created_at, "Contact message stored");

    Ok((StatusCode::CREATED, Json(ContactResponse { ok: true })))
}
