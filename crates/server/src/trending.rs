use std::sync::Arc;

use tracing::{debug, error};

use wayfare_core::errors::ApplicationError;
use wayfare_core::ranking::{TrendingEngine, TrendingEntry};
use wayfare_db::repositories::AttractionRepository;

pub struct TrendingService {
    repository: Arc<dyn AttractionRepository>,
    engine: TrendingEngine,
}

impl TrendingService {
    pub fn new(repository: Arc<dyn AttractionRepository>, engine: TrendingEngine) -> Self {
        Self { repository, engine }
    }

    pub async fn top(&self, correlation_id: &str) -> Result<Vec<TrendingEntry>, ApplicationError> {
        let ranked = self.repository.top_per_region(&self.engine).await.map_err(|error| {
            error!(
                event_name = "trending.rank.failed",
                correlation_id,
                error = %error,
                "trending lookup failed"
            );
            ApplicationError::from(error)
        })?;

        debug!(
            event_name = "trending.rank.completed",
            correlation_id,
            limit = self.engine.limit(),
            winners = ranked.len(),
            "trending ranking computed"
        );
        Ok(ranked)
    }
}
