//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    jwt::JwtService, recommendations::RecommendationService, repositories::Store,
    scoring::ScoringService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt_service: JwtService,
    pub recommendation_service: RecommendationService,
}

impl AppState {
    /// Wire the state from its collaborators
    pub fn new(
        store: Arc<dyn Store>,
        jwt_service: JwtService,
        scorer: Arc<dyn ScoringService>,
    ) -> Self {
        let recommendation_service = RecommendationService::new(store.clone(), scorer);

        Self {
            store,
            jwt_service,
            recommendation_service,
        }
    }
}
