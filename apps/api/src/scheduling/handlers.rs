use axum::{
    extract::{Path, State},
    Form, Json,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::candidate::CandidateRecord;
use crate::scheduling::calendar::EventDetails;
use crate::scheduling::{meet_link, notify};
use crate::state::AppState;

fn default_duration() -> i64 {
    60
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub candidate_name: String,
    /// `YYYY-MM-DD`
    pub interview_date: String,
    /// `HH:MM`
    pub interview_time: String,
    /// Minutes.
    #[serde(default = "default_duration")]
    pub duration: i64,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub success: bool,
    pub message: String,
    pub calendar_link: Option<String>,
    pub candidate: String,
    pub candidate_email: Option<String>,
    pub interview_datetime: String,
    pub duration: i64,
    pub email_sent: bool,
    pub email_message: String,
}

/// POST /schedule-interview/:session_id
///
/// The calendar and email steps are independent: a missing candidate email,
/// an unconfigured collaborator, or a collaborator failure degrades into the
/// response flags instead of failing the request.
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Form(req): Form<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let results = state
        .sessions
        .results(&session_id)
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

    let candidate_name = req.candidate_name.trim().to_string();
    if candidate_name.is_empty() {
        return Err(AppError::Validation(
            "Candidate name is required".to_string(),
        ));
    }
    if req.interview_date.trim().is_empty() || req.interview_time.trim().is_empty() {
        return Err(AppError::Validation(
            "Both interview date and time are required".to_string(),
        ));
    }
    let start = combine_date_time(req.interview_date.trim(), req.interview_time.trim())?;

    info!(candidate = %candidate_name, start = %start, "scheduling interview");

    let candidate_email = find_candidate_email(&results, &candidate_name);
    if candidate_email.is_none() {
        warn!(candidate = %candidate_name, "no email found for candidate in session");
    }

    let event = EventDetails {
        summary: format!("Interview with {candidate_name}"),
        description: format!("Interview scheduled with candidate {candidate_name}."),
        start,
        end: start + Duration::minutes(req.duration),
    };
    let calendar_link = match state.calendar.as_deref() {
        Some(calendar) => match calendar.create_event(&event).await {
            Ok(link) => Some(link),
            Err(e) => {
                warn!(candidate = %candidate_name, "calendar event creation failed: {e}");
                None
            }
        },
        None => {
            warn!("calendar collaborator not configured; no event created");
            None
        }
    };

    let meet = meet_link::generate(&state.config.meet_base_url);

    let mut email_sent = false;
    let email_message = match (candidate_email.as_deref(), state.notifier.as_deref()) {
        (Some(email), Some(notifier)) => {
            let (subject, body) = notify::interview_invitation(
                &candidate_name,
                start,
                req.duration,
                &meet,
                calendar_link.as_deref(),
            );
            match notifier.send(email, &subject, &body).await {
                Ok(()) => {
                    email_sent = true;
                    format!("Email notification sent to {email}")
                }
                Err(e) => {
                    warn!(candidate = %candidate_name, to = %email, "failed to send invitation email: {e}");
                    format!("Failed to send email to {email}")
                }
            }
        }
        (Some(email), None) => {
            warn!("mail collaborator not configured; skipping invitation email");
            format!("Failed to send email to {email}")
        }
        (None, _) => "Email not found for candidate".to_string(),
    };

    state
        .sessions
        .remove_from_shortlist(&session_id, &candidate_name);
    info!(candidate = %candidate_name, email_sent, "interview scheduled");

    Ok(Json(ScheduleResponse {
        success: true,
        message: format!("Interview scheduled successfully for {candidate_name}"),
        calendar_link,
        candidate: candidate_name,
        candidate_email,
        interview_datetime: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
        duration: req.duration,
        email_sent,
        email_message,
    }))
}

/// Combines `YYYY-MM-DD` and `HH:MM` form fields into one timestamp.
fn combine_date_time(date: &str, time: &str) -> Result<NaiveDateTime, AppError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date or time format".to_string()))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid date or time format".to_string()))?;
    Ok(NaiveDateTime::new(date, time))
}

/// Email of the first candidate whose name matches exactly. First match
/// wins; a blank email counts as missing.
fn find_candidate_email(results: &[CandidateRecord], name: &str) -> Option<String> {
    results
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.email.trim().to_string())
        .filter(|email| !email.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm_client::{CompletionModel, LlmError};
    use crate::scheduling::calendar::{CalendarError, CalendarService};
    use crate::sessions::SessionStore;
    use async_trait::async_trait;
    use std::sync::Arc;

    fn record(name: &str, email: &str, score: f64) -> CandidateRecord {
        CandidateRecord {
            name: name.to_string(),
            email: email.to_string(),
            score,
            summary: String::new(),
        }
    }

    #[test]
    fn test_combine_date_time_formats_as_iso() {
        let dt = combine_date_time("2024-01-01", "10:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%dT%H:%M:%S").to_string(), "2024-01-01T10:00:00");
    }

    #[test]
    fn test_combine_date_time_rejects_garbage() {
        assert!(combine_date_time("01/01/2024", "10:00").is_err());
        assert!(combine_date_time("2024-01-01", "ten").is_err());
        assert!(combine_date_time("2024-13-01", "10:00").is_err());
    }

    #[test]
    fn test_find_email_first_match_wins() {
        let results = vec![
            record("Ada", "first@example.com", 90.0),
            record("Ada", "second@example.com", 80.0),
        ];
        assert_eq!(
            find_candidate_email(&results, "Ada"),
            Some("first@example.com".to_string())
        );
    }

    #[test]
    fn test_find_email_requires_exact_name() {
        let results = vec![record("Ada Lovelace", "ada@example.com", 90.0)];
        assert_eq!(find_candidate_email(&results, "Ada"), None);
    }

    #[test]
    fn test_find_email_treats_blank_as_missing() {
        let results = vec![record("Ada", "   ", 90.0)];
        assert_eq!(find_candidate_email(&results, "Ada"), None);
    }

    struct NoopModel;

    #[async_trait]
    impl CompletionModel for NoopModel {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyCompletion)
        }
    }

    struct FixedLinkCalendar;

    #[async_trait]
    impl CalendarService for FixedLinkCalendar {
        async fn create_event(&self, _event: &EventDetails) -> Result<String, CalendarError> {
            Ok("https://calendar.google.com/event?eid=test".to_string())
        }
    }

    fn test_config() -> Config {
        Config {
            groq_api_key: "test-key".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            session_ttl_secs: 86400,
            meet_base_url: "https://meet.google.com/".to_string(),
            calendar_timezone: "Asia/Kolkata".to_string(),
            smtp: None,
            google: None,
        }
    }

    fn test_state(calendar: Option<Arc<dyn CalendarService>>) -> AppState {
        AppState {
            llm: Arc::new(NoopModel),
            calendar,
            notifier: None,
            sessions: Arc::new(SessionStore::new(Duration::hours(24))),
            config: test_config(),
        }
    }

    fn schedule_form(candidate: &str) -> ScheduleRequest {
        ScheduleRequest {
            candidate_name: candidate.to_string(),
            interview_date: "2024-01-01".to_string(),
            interview_time: "10:00".to_string(),
            duration: 60,
        }
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let state = test_state(None);
        let result = handle_schedule_interview(
            State(state),
            Path("1700000000000".to_string()),
            Form(schedule_form("Ada")),
        )
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_calendar_step_is_independent_of_email_lookup() {
        // Unmatched candidate: no email, no notification, but the calendar
        // event still goes through and the call succeeds.
        let state = test_state(Some(Arc::new(FixedLinkCalendar)));
        let session_id = state.sessions.create(vec![record("Ada", "ada@example.com", 90.0)]);

        let Json(response) = handle_schedule_interview(
            State(state),
            Path(session_id),
            Form(schedule_form("Nobody")),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(
            response.calendar_link.as_deref(),
            Some("https://calendar.google.com/event?eid=test")
        );
        assert_eq!(response.candidate_email, None);
        assert!(!response.email_sent);
        assert_eq!(response.email_message, "Email not found for candidate");
        assert_eq!(response.interview_datetime, "2024-01-01T10:00:00");
    }

    #[tokio::test]
    async fn test_blank_candidate_name_is_validation_error() {
        let state = test_state(None);
        let session_id = state.sessions.create(vec![]);

        let result = handle_schedule_interview(
            State(state),
            Path(session_id),
            Form(schedule_form("   ")),
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
