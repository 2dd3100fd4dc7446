//! Candidate notification over authenticated STARTTLS SMTP.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::info;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends a plain-text notification to one recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// lettre-backed notifier. Credentials and relay come from `SmtpConfig`.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
            .port(config.port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            sender: config.sender,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.sender.parse()?)
            .to(to.trim().parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(message).await?;
        info!(to = %to, "notification email sent");
        Ok(())
    }
}

/// Builds the invitation subject and plain-text body sent to a candidate.
/// The calendar link falls back to a placeholder line when the calendar
/// collaborator produced none.
pub fn interview_invitation(
    candidate: &str,
    start: NaiveDateTime,
    duration_minutes: i64,
    meet_link: &str,
    calendar_link: Option<&str>,
) -> (String, String) {
    let subject = format!("Interview Scheduled - {candidate}");
    let formatted = start.format("%B %d, %Y at %I:%M %p");
    let body = format!(
        "Dear {candidate},\n\n\
         We are pleased to inform you that an interview has been scheduled for you.\n\n\
         Interview Details:\n\
         - Date and Time: {formatted}\n\
         - Duration: {duration_minutes} minutes\n\
         - Meet Link: {meet_link}\n\
         - Calendar Link: {calendar}\n\n\
         Please confirm your availability for this interview. If you have any questions \
         or need to reschedule, please contact us as soon as possible.\n\n\
         We look forward to speaking with you.\n\n\
         Best regards,\n\
         The Hiring Team",
        calendar = calendar_link.unwrap_or("Will be provided separately"),
    );
    (subject, body)
}
