use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::candidate::CandidateRecord;
use crate::screening::pipeline::{run_intake, SkippedFile, UploadedResume};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub session_id: String,
    pub results: Vec<CandidateRecord>,
    pub total_candidates: usize,
    /// Files that were accepted but produced no candidate, with the reason.
    pub skipped: Vec<SkippedFile>,
    pub message: String,
}

/// POST /upload-resumes/
///
/// Multipart form: one `job_description` text field and one or more `files`
/// PDF attachments. Unknown fields are ignored.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut job_description = String::new();
    let mut files: Vec<UploadedResume> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("job_description") => {
                job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid job description: {e}")))?;
            }
            Some("files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file upload: {e}")))?;
                files.push(UploadedResume { filename, bytes });
            }
            _ => {}
        }
    }

    let file_count = files.len();
    let outcome = run_intake(
        state.llm.as_ref(),
        state.sessions.as_ref(),
        &job_description,
        &files,
    )
    .await?;

    Ok(Json(UploadResponse {
        success: true,
        session_id: outcome.session_id,
        total_candidates: outcome.results.len(),
        results: outcome.results,
        skipped: outcome.skipped,
        message: format!("Successfully processed {file_count} resume(s)"),
    }))
}
