//! The intake pipeline: validate uploads, extract and score each file,
//! rank the survivors, store them as a session.

use std::cmp::Ordering;

use anyhow::Context;
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::CompletionModel;
use crate::models::candidate::CandidateRecord;
use crate::pdf;
use crate::screening::scorer::score_resume;
use crate::sessions::SessionStore;

/// Maximum accepted size for a single uploaded resume.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// One file pulled out of the multipart request.
pub struct UploadedResume {
    pub filename: String,
    pub bytes: Bytes,
}

/// A file that passed validation but produced no candidate.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

pub struct IntakeOutcome {
    pub session_id: String,
    pub results: Vec<CandidateRecord>,
    pub skipped: Vec<SkippedFile>,
}

/// Checks every intake precondition. Runs before any file I/O.
pub fn validate_uploads(job_description: &str, files: &[UploadedResume]) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description is required".to_string(),
        ));
    }
    if files.is_empty() {
        return Err(AppError::Validation(
            "At least one resume file is required".to_string(),
        ));
    }
    for file in files {
        if file.filename.is_empty() {
            return Err(AppError::Validation("Invalid file uploaded".to_string()));
        }
        if !file.filename.to_lowercase().ends_with(".pdf") {
            return Err(AppError::Validation(format!(
                "File '{}' is not a PDF. Only PDF files are supported.",
                file.filename
            )));
        }
        if file.bytes.len() > MAX_FILE_SIZE {
            return Err(AppError::Validation(format!(
                "File '{}' is too large. Maximum size is 10MB.",
                file.filename
            )));
        }
    }
    Ok(())
}

/// Runs the full intake: validation, per-file extraction and scoring,
/// ranking, session creation.
///
/// Uploads are spilled into a scratch directory that is deleted when the
/// `TempDir` guard drops, on success and failure alike. Files are processed
/// sequentially; a file that cannot be extracted or scored is recorded in
/// `skipped` and excluded from the results rather than failing the batch.
pub async fn run_intake(
    llm: &dyn CompletionModel,
    sessions: &SessionStore,
    job_description: &str,
    files: &[UploadedResume],
) -> Result<IntakeOutcome, AppError> {
    validate_uploads(job_description, files)?;

    let workdir = tempfile::tempdir().context("failed to create upload scratch directory")?;

    let mut results = Vec::new();
    let mut skipped = Vec::new();

    for (index, file) in files.iter().enumerate() {
        let path = workdir
            .path()
            .join(format!("{index}-{}", sanitize_filename(&file.filename)));

        if let Err(e) = tokio::fs::write(&path, &file.bytes).await {
            warn!(file = %file.filename, "failed to spill upload to disk: {e}");
            skipped.push(SkippedFile {
                filename: file.filename.clone(),
                reason: "could not be written for processing".to_string(),
            });
            continue;
        }

        let resume_text = pdf::extract_text(&path);
        if resume_text.is_empty() {
            skipped.push(SkippedFile {
                filename: file.filename.clone(),
                reason: "no extractable text".to_string(),
            });
            continue;
        }

        match score_resume(llm, &resume_text, job_description).await {
            Some(record) => results.push(record),
            None => skipped.push(SkippedFile {
                filename: file.filename.clone(),
                reason: "analysis failed".to_string(),
            }),
        }
    }

    rank(&mut results);
    let session_id = sessions.create(results.clone());
    info!(
        session_id = %session_id,
        candidates = results.len(),
        skipped = skipped.len(),
        "intake complete"
    );

    Ok(IntakeOutcome {
        session_id,
        results,
        skipped,
    })
}

/// Sorts candidates by score descending. The sort is stable, so candidates
/// with equal scores keep their extraction order.
pub fn rank(records: &mut [CandidateRecord]) {
    records.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Strips anything outside `[A-Za-z0-9.-_]` from a client-supplied name
/// before it is used as a path component.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;

    fn upload(filename: &str, size: usize) -> UploadedResume {
        UploadedResume {
            filename: filename.to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    fn record(name: &str, score: f64) -> CandidateRecord {
        CandidateRecord {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            score,
            summary: String::new(),
        }
    }

    #[test]
    fn test_validate_rejects_blank_job_description() {
        let files = vec![upload("resume.pdf", 10)];
        let err = validate_uploads("   \n", &files).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_empty_file_list() {
        let err = validate_uploads("Backend engineer", &[]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_non_pdf_extension() {
        let files = vec![upload("resume.docx", 10)];
        assert!(validate_uploads("Backend engineer", &files).is_err());
    }

    #[test]
    fn test_validate_accepts_uppercase_pdf_extension() {
        let files = vec![upload("RESUME.PDF", 10)];
        assert!(validate_uploads("Backend engineer", &files).is_ok());
    }

    #[test]
    fn test_validate_rejects_unnamed_file() {
        let files = vec![upload("", 10)];
        assert!(validate_uploads("Backend engineer", &files).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let files = vec![upload("resume.pdf", MAX_FILE_SIZE + 1)];
        assert!(validate_uploads("Backend engineer", &files).is_err());
    }

    #[test]
    fn test_validate_accepts_file_at_size_limit() {
        let files = vec![upload("resume.pdf", MAX_FILE_SIZE)];
        assert!(validate_uploads("Backend engineer", &files).is_ok());
    }

    #[test]
    fn test_rank_sorts_descending() {
        let mut records = vec![record("Low", 10.0), record("High", 90.0), record("Mid", 50.0)];
        rank(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["High", "Mid", "Low"]);
    }

    #[test]
    fn test_rank_preserves_input_order_for_ties() {
        let mut records = vec![
            record("First", 50.0),
            record("Second", 50.0),
            record("Third", 50.0),
        ];
        rank(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn test_sanitize_filename_replaces_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("my resume.pdf"), "my_resume.pdf");
    }

    struct UnreachableModel;

    #[async_trait]
    impl CompletionModel for UnreachableModel {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyCompletion)
        }
    }

    #[tokio::test]
    async fn test_intake_excludes_unreadable_files_without_failing() {
        // Zero-filled ".pdf" files yield no extractable text: the batch
        // still succeeds, every file lands in `skipped`, and an (empty)
        // session is created.
        let store = crate::sessions::SessionStore::new(chrono::Duration::hours(1));
        let files = vec![upload("a.pdf", 16), upload("b.pdf", 16)];

        let outcome = run_intake(&UnreachableModel, &store, "Backend engineer", &files)
            .await
            .unwrap();

        assert!(outcome.results.len() <= files.len());
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].reason, "no extractable text");
        assert_eq!(store.results(&outcome.session_id), Some(vec![]));
    }
}
