use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// The LLM key is required at startup; the calendar and mail collaborator
/// blocks are optional and their absence disables the collaborator.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Sessions older than this are invisible to reads and swept on insert.
    pub session_ttl_secs: i64,
    pub meet_base_url: String,
    pub calendar_timezone: String,
    pub smtp: Option<SmtpConfig>,
    pub google: Option<GoogleCalendarConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct GoogleCalendarConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse::<i64>()
                .context("SESSION_TTL_SECS must be a number of seconds")?,
            meet_base_url: std::env::var("MEET_BASE_URL")
                .unwrap_or_else(|_| "https://meet.google.com/".to_string()),
            calendar_timezone: std::env::var("CALENDAR_TIMEZONE")
                .unwrap_or_else(|_| "Asia/Kolkata".to_string()),
            smtp: smtp_from_env()?,
            google: google_from_env(),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn smtp_from_env() -> Result<Option<SmtpConfig>> {
    let (Ok(sender), Ok(password)) = (
        std::env::var("EMAIL_SENDER"),
        std::env::var("SMTP_PASSWORD"),
    ) else {
        return Ok(None);
    };

    Ok(Some(SmtpConfig {
        server: std::env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
        port: std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid port number")?,
        sender,
        password,
    }))
}

fn google_from_env() -> Option<GoogleCalendarConfig> {
    match (
        std::env::var("GOOGLE_CLIENT_ID"),
        std::env::var("GOOGLE_CLIENT_SECRET"),
        std::env::var("GOOGLE_REFRESH_TOKEN"),
    ) {
        (Ok(client_id), Ok(client_secret), Ok(refresh_token)) => Some(GoogleCalendarConfig {
            client_id,
            client_secret,
            refresh_token,
        }),
        _ => None,
    }
}
