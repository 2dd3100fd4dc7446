use serde::{Deserialize, Serialize};

/// One scored candidate, produced from one successfully analyzed resume.
/// Immutable once created; a session keeps its records sorted by score
/// descending and never re-sorts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    pub email: String,
    /// Fit against the job description in [0, 100], as judged by the model.
    pub score: f64,
    pub summary: String,
}
