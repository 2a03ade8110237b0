use std::sync::Arc;

use crate::config::Config;
use crate::screening::store::MatchStore;
use crate::screening::vocabulary::SkillVocabulary;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Job lookup and match record persistence. Default: PgMatchStore.
    pub store: Arc<dyn MatchStore>,
    /// Immutable skill vocabulary, loaded once at startup.
    pub vocabulary: Arc<SkillVocabulary>,
    pub config: Config,
}
