use std::sync::Arc;

use crate::matching::orchestrator::MatchOrchestrator;
use crate::scoring::MatchScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<MatchOrchestrator>,
    /// Scoring client, also held by the orchestrator. Exposed directly for
    /// single-resume scoring.
    pub scorer: Arc<dyn MatchScorer>,
}
