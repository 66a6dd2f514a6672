//! Recommendation orchestration
//!
//! Local preconditions are checked before the scoring service is called,
//! so an incomplete profile never costs an outbound request. The service
//! performs no writes. Scoring failures surface as distinct [`ApiError`]
//! variants.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::{
    error::{ApiError, ApiResult},
    models::{Account, Internship},
    repositories::Store,
    scoring::ScoringService,
};

/// Recommendation response
///
/// `recommendation_ids` is the upstream ranking verbatim.
/// `recommendations` holds the internships that still exist, in the same
/// order; ids the store no longer knows are dropped.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub recommendation_ids: Vec<i64>,
    pub recommendations: Vec<Internship>,
}

/// Produces recommendations for an authenticated account
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn Store>,
    scorer: Arc<dyn ScoringService>,
}

impl RecommendationService {
    /// Create a new recommendation service
    pub fn new(store: Arc<dyn Store>, scorer: Arc<dyn ScoringService>) -> Self {
        Self { store, scorer }
    }

    /// Score the account's profile and hydrate the returned ids
    pub async fn recommend(&self, account: &Account) -> ApiResult<Recommendations> {
        if !account.profile_complete {
            return Err(ApiError::PreconditionFailed(
                "complete your profile first".to_string(),
            ));
        }

        let profile = self
            .store
            .find_profile_by_account_id(account.id)
            .await?
            .ok_or_else(|| {
                error!(
                    account_id = account.id,
                    "Account is flagged profile_complete but has no profile row"
                );
                ApiError::DataInconsistency(format!(
                    "account {} is marked complete but has no profile",
                    account.id
                ))
            })?;

        let ids = self.scorer.score(&profile).await?;
        info!(
            account_id = account.id,
            "Scoring service returned {} internship ids",
            ids.len()
        );

        if ids.is_empty() {
            return Ok(Recommendations {
                recommendation_ids: ids,
                recommendations: Vec::new(),
            });
        }

        let found = self.store.find_internships_by_ids(&ids).await?;
        let recommendations = order_by_ids(&ids, found);
        if recommendations.len() < ids.len() {
            debug!(
                account_id = account.id,
                "{} recommended ids did not resolve to an internship",
                ids.len() - recommendations.len()
            );
        }

        Ok(Recommendations {
            recommendation_ids: ids,
            recommendations,
        })
    }
}

/// Arrange internships in ranking order, once each
fn order_by_ids(ids: &[i64], internships: Vec<Internship>) -> Vec<Internship> {
    let mut by_id: HashMap<i64, Internship> =
        internships.into_iter().map(|i| (i.id, i)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
