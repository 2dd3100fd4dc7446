use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionModel;
use crate::scheduling::calendar::CalendarService;
use crate::scheduling::notify::Notifier;
use crate::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Collaborators sit behind trait objects so tests can substitute mocks.
/// The calendar and mail collaborators are optional; when absent the
/// scheduling flow degrades instead of failing.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn CompletionModel>,
    pub calendar: Option<Arc<dyn CalendarService>>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub sessions: Arc<SessionStore>,
    pub config: Config,
}
