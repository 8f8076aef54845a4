use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use wayfare_core::errors::ApplicationError;
use wayfare_core::recommendation::{parse_live_batch, Recommendation, RecommendationSource};
use wayfare_db::repositories::AttractionRepository;

use crate::worker::{ScraperWorker, WorkerFailure};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecommendationOutcome {
    pub source: RecommendationSource,
    pub items: Vec<Recommendation>,
}

/// Races the live scraping worker against a deadline and falls back to stored attractions.
///
/// Worker failures of any kind are absorbed here; only a failing fallback lookup reaches the
/// caller.
pub struct RecommendationOrchestrator {
    worker: Arc<dyn ScraperWorker>,
    repository: Arc<dyn AttractionRepository>,
    deadline: Duration,
    fallback_limit: u32,
}

impl RecommendationOrchestrator {
    pub fn new(
        worker: Arc<dyn ScraperWorker>,
        repository: Arc<dyn AttractionRepository>,
        deadline: Duration,
        fallback_limit: u32,
    ) -> Self {
        Self { worker, repository, deadline, fallback_limit }
    }

    pub async fn recommend(
        &self,
        key: &str,
        correlation_id: &str,
    ) -> Result<RecommendationOutcome, ApplicationError> {
        match self.fetch_live(key, correlation_id).await {
            Ok(items) => {
                info!(
                    event_name = "recommendations.live.accepted",
                    correlation_id,
                    key,
                    items = items.len(),
                    "live recommendations accepted"
                );
                Ok(RecommendationOutcome { source: RecommendationSource::Live, items })
            }
            Err(failure) => {
                warn!(
                    event_name = "recommendations.live.failed",
                    correlation_id,
                    key,
                    reason = failure.reason(),
                    error = %failure,
                    "live fetch failed, serving stored recommendations"
                );
                self.fallback(key, correlation_id).await
            }
        }
    }

    async fn fetch_live(
        &self,
        key: &str,
        correlation_id: &str,
    ) -> Result<Vec<Recommendation>, WorkerFailure> {
        // Dropping the worker future on timeout kills the child process.
        let output = tokio::time::timeout(self.deadline, self.worker.run(key))
            .await
            .map_err(|_| WorkerFailure::Timeout(self.deadline))??;

        if !output.stderr.trim().is_empty() {
            warn!(
                event_name = "recommendations.worker.stderr",
                correlation_id,
                key,
                stderr = %output.stderr.trim(),
                "worker wrote diagnostics"
            );
        }
        if output.exit_code != Some(0) {
            return Err(WorkerFailure::NonZeroExit {
                code: output.exit_code,
                stderr: output.stderr,
            });
        }

        Ok(parse_live_batch(&output.stdout)?)
    }

    async fn fallback(
        &self,
        key: &str,
        correlation_id: &str,
    ) -> Result<RecommendationOutcome, ApplicationError> {
        let stored =
            self.repository.list_by_region(key, self.fallback_limit).await.map_err(|error| {
                error!(
                    event_name = "recommendations.fallback.failed",
                    correlation_id,
                    key,
                    error = %error,
                    "stored recommendation lookup failed"
                );
                ApplicationError::from(error)
            })?;

        info!(
            event_name = "recommendations.fallback.served",
            correlation_id,
            key,
            items = stored.len(),
            "stored recommendations served"
        );
        Ok(RecommendationOutcome {
            source: RecommendationSource::Backup,
            items: stored.iter().map(Recommendation::from).collect(),
        })
    }
}
