//! Screening endpoints: upload a bloodwork document, list prior results.
//!
//! `POST /api/screenings` — multipart form with a `file` part and a
//! `user_id` field; runs the full pipeline and persists on success.
//! `GET /api/screenings?user_id=…` — prior screenings, newest first.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::Screening;

/// Warning attached to the response when the parse succeeded but the
/// record could not be stored.
const PERSISTENCE_WARNING: &str =
    "The screening could not be saved to history; the results below were not persisted.";

#[derive(Serialize)]
pub struct ValueView {
    pub test_key: String,
    pub test_name: String,
    pub value: f64,
    pub unit: String,
    pub status: String,
    pub normal_range: String,
    pub explanation: String,
}

#[derive(Serialize)]
pub struct ScreeningView {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub uploaded_at: String,
    pub values: Vec<ValueView>,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub flagged_count: usize,
}

#[derive(Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub screening: ScreeningView,
    /// Id of the stored history row; absent when persistence failed.
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

impl From<&Screening> for ScreeningView {
    fn from(s: &Screening) -> Self {
        Self {
            id: s.id.to_string(),
            user_id: s.user_id.clone(),
            file_name: s.file_name.clone(),
            uploaded_at: s.uploaded_at.to_rfc3339(),
            values: s
                .values
                .iter()
                .map(|v| ValueView {
                    test_key: v.test_key.clone(),
                    test_name: v.test_name.clone(),
                    value: v.value,
                    unit: v.unit.clone(),
                    status: v.status.as_str().to_string(),
                    normal_range: v.normal_range.clone(),
                    explanation: v.explanation.clone(),
                })
                .collect(),
            summary: s.summary.clone(),
            recommendations: s.recommendations.clone(),
            flagged_count: s.flagged_count,
        }
    }
}

/// `POST /api/screenings` — upload a bloodwork document.
///
/// A persistence failure does not discard a successful parse: the
/// response still carries the full screening, with `record_id` null and
/// a warning set.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut user_id: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid user_id field: {e}")))?;
                user_id = Some(text);
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload.txt")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid file part: {e}")))?;
                file = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let user_id = user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing user_id field".into()))?;
    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("Missing file part".into()))?;

    let screening = ctx.processor.process(&user_id, &file_name, bytes).await?;

    let record_id = persist(&ctx, &screening);
    if record_id.is_none() {
        tracing::warn!(
            user_id,
            screening_id = %screening.id,
            "Screening returned without persistence"
        );
    }

    Ok(Json(UploadResponse {
        screening: ScreeningView::from(&screening),
        warning: record_id.is_none().then_some(PERSISTENCE_WARNING),
        record_id,
    }))
}

/// Store the screening; on failure log for operators and return `None`.
fn persist(ctx: &ApiContext, screening: &Screening) -> Option<String> {
    let mut conn = match ctx.db.lock() {
        Ok(conn) => conn,
        Err(_) => {
            tracing::error!("Database lock poisoned; screening not persisted");
            return None;
        }
    };
    match repository::insert_screening(&mut conn, screening) {
        Ok(()) => Some(screening.id.to_string()),
        Err(e) => {
            tracing::error!(error = %e, screening_id = %screening.id, "Failed to persist screening");
            None
        }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub user_id: String,
    pub screenings: Vec<ScreeningView>,
    pub count: usize,
}

/// `GET /api/screenings?user_id=…` — screening history, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let user_id = query
        .user_id
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing user_id query parameter".into()))?;

    let screenings = {
        let conn = ctx
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))?;
        repository::list_screenings_for_user(&conn, &user_id)?
    };

    let views: Vec<ScreeningView> = screenings.iter().map(ScreeningView::from).collect();
    Ok(Json(ListResponse {
        user_id,
        count: views.len(),
        screenings: views,
    }))
}
