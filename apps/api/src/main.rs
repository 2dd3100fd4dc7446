mod config;
mod errors;
mod llm_client;
mod models;
mod pdf;
mod routes;
mod scheduling;
mod screening;
mod sessions;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{CompletionModel, GroqClient};
use crate::routes::build_router;
use crate::scheduling::calendar::{CalendarService, GoogleCalendar};
use crate::scheduling::notify::{Notifier, SmtpNotifier};
use crate::sessions::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HireLens API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm: Arc<dyn CompletionModel> = Arc::new(GroqClient::new(config.groq_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Optional collaborators: absence degrades the scheduling flow.
    let calendar: Option<Arc<dyn CalendarService>> = match &config.google {
        Some(google) => {
            info!("Google Calendar client initialized");
            Some(Arc::new(GoogleCalendar::new(
                google.clone(),
                config.calendar_timezone.clone(),
            )))
        }
        None => {
            warn!("Google Calendar credentials not set; interviews will be scheduled without calendar events");
            None
        }
    };

    let notifier: Option<Arc<dyn Notifier>> = match &config.smtp {
        Some(smtp) => match SmtpNotifier::new(smtp.clone()) {
            Ok(notifier) => {
                info!("SMTP notifier initialized (relay: {})", smtp.server);
                Some(Arc::new(notifier))
            }
            Err(e) => {
                warn!("SMTP notifier could not be built: {e}");
                None
            }
        },
        None => {
            warn!("SMTP credentials not set; candidates will not be emailed");
            None
        }
    };

    // Initialize session store
    let sessions = Arc::new(SessionStore::new(chrono::Duration::seconds(
        config.session_ttl_secs,
    )));
    info!("Session store initialized (ttl: {}s)", config.session_ttl_secs);

    // Build app state
    let state = AppState {
        llm,
        calendar,
        notifier,
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
