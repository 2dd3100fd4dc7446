//! Calendar collaborator: creates an event and returns its shareable link.
//!
//! The Google implementation owns its credential context — a stored refresh
//! token exchanged for short-lived access tokens which are cached until
//! shortly before expiry. Callers only see the `CalendarService` trait.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::GoogleCalendarConfig;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Refresh the cached token this long before it actually expires.
const EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token refresh failed (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("created event carried no shareable link")]
    MissingLink,
}

/// The fields a calendar event is created from. The event spans
/// `[start, end)` in the service's configured timezone.
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Creates a calendar event and returns its shareable link.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn create_event(&self, event: &EventDetails) -> Result<String, CalendarError>;
}

#[derive(Debug, Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    description: &'a str,
    start: EventTime<'a>,
    end: EventTime<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: String,
    time_zone: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
}

struct CachedToken {
    token: String,
    expires_at: std::time::Instant,
}

/// Google Calendar client authenticated through a stored refresh token.
pub struct GoogleCalendar {
    http: Client,
    config: GoogleCalendarConfig,
    timezone: String,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleCalendar {
    pub fn new(config: GoogleCalendarConfig, timezone: String) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            config,
            timezone,
            token: Mutex::new(None),
        }
    }

    /// Returns a live access token, exchanging the refresh token when the
    /// cached one is missing or about to expire.
    async fn access_token(&self) -> Result<String, CalendarError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > std::time::Instant::now() {
                return Ok(token.token.clone());
            }
        }

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalendarError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        let expires_at = std::time::Instant::now()
            + std::time::Duration::from_secs(token.expires_in.saturating_sub(EXPIRY_MARGIN_SECS));
        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            token: token.access_token,
            expires_at,
        });
        debug!("calendar access token refreshed");

        Ok(access_token)
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn create_event(&self, event: &EventDetails) -> Result<String, CalendarError> {
        let token = self.access_token().await?;
        let body = event_body(event, &self.timezone);

        let response = self
            .http
            .post(EVENTS_URL)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let created: CreatedEvent = response.json().await?;
        created.html_link.ok_or(CalendarError::MissingLink)
    }
}

fn event_body<'a>(event: &'a EventDetails, timezone: &'a str) -> EventBody<'a> {
    EventBody {
        summary: &event.summary,
        description: &event.description,
        start: EventTime {
            date_time: event.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: timezone,
        },
        end: EventTime {
            date_time: event.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: timezone,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};

    #[test]
    fn test_event_body_uses_google_field_names() {
        let start = NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        );
        let event = EventDetails {
            summary: "Interview with Ada Lovelace".to_string(),
            description: "Interview scheduled with candidate Ada Lovelace.".to_string(),
            start,
            end: start + Duration::minutes(60),
        };

        let value = serde_json::to_value(event_body(&event, "Asia/Kolkata")).unwrap();
        assert_eq!(value["summary"], "Interview with Ada Lovelace");
        assert_eq!(value["start"]["dateTime"], "2024-01-01T10:00:00");
        assert_eq!(value["start"]["timeZone"], "Asia/Kolkata");
        assert_eq!(value["end"]["dateTime"], "2024-01-01T11:00:00");
    }

    #[test]
    fn test_created_event_tolerates_missing_link() {
        let created: CreatedEvent = serde_json::from_str(r#"{"id": "evt_1"}"#).unwrap();
        assert!(created.html_link.is_none());
    }
}
