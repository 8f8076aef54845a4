use std::sync::Arc;

use tracing::{error, info};

use wayfare_core::clock::Clock;
use wayfare_core::domain::review::{ReviewRecord, ReviewSubmission, ValidatedReview};
use wayfare_core::errors::ApplicationError;
use wayfare_db::repositories::{AppendOutcome, AttractionRepository};

/// Appends reviews and keeps each attraction's count and histogram in step.
///
/// Validation happens before the store is touched; the repository append is the single commit
/// point, so a failed write leaves nothing behind.
pub struct ReviewLedger {
    repository: Arc<dyn AttractionRepository>,
    clock: Arc<dyn Clock>,
}

impl ReviewLedger {
    pub fn new(repository: Arc<dyn AttractionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn submit(
        &self,
        submission: ReviewSubmission,
        correlation_id: &str,
    ) -> Result<ReviewRecord, ApplicationError> {
        let ValidatedReview { attraction, review } = submission.validate(self.clock.as_ref())?;

        let outcome =
            self.repository.append_review(&attraction, review.clone()).await.map_err(|error| {
                error!(
                    event_name = "reviews.append.failed",
                    correlation_id,
                    attraction = %attraction,
                    error = %error,
                    "review append failed"
                );
                ApplicationError::from(error)
            })?;

        match outcome {
            AppendOutcome::Appended { review_count } => {
                info!(
                    event_name = "reviews.append.committed",
                    correlation_id,
                    attraction = %attraction,
                    rating = review.rating.value(),
                    review_count,
                    "review appended"
                );
                Ok(review)
            }
            AppendOutcome::NotFound => {
                Err(ApplicationError::NotFound { entity: "attraction", key: attraction })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wayfare_core::domain::attraction::Attraction;
    use wayfare_core::domain::rating::RatingInput;
    use wayfare_core::domain::review::ReviewSubmission;
    use wayfare_core::errors::{ApplicationError, DomainError};
    use wayfare_db::repositories::{
        AttractionRepository, InMemoryAttractionRepository, SqlAttractionRepository,
    };
    use wayfare_db::{connect_with_settings, migrations};

    use super::ReviewLedger;
    use crate::test_support::{fixed_clock, UnavailableRepository};

    fn submission(attraction: &str, rating: &str) -> ReviewSubmission {
        ReviewSubmission {
            attraction: Some(attraction.to_string()),
            username: Some("ttviet".to_string()),
            rating: Some(RatingInput::Text(rating.to_string())),
            title: Some("Sunrise".to_string()),
            content: Some("Rent a jeep at 4am.".to_string()),
            trip_type: Some("Couples".to_string()),
            time: None,
        }
    }

    async fn ledger_with_dunes() -> (ReviewLedger, Arc<InMemoryAttractionRepository>) {
        let repo = Arc::new(InMemoryAttractionRepository::new());
        repo.save(Attraction::new("White Sand Dunes", "Binh Thuan").with_histogram([0, 0, 0, 0, 0, 3]))
            .await
            .expect("seed");
        (ReviewLedger::new(repo.clone(), fixed_clock()), repo)
    }

    #[tokio::test]
    async fn five_star_review_lands_in_bucket_five_and_heads_the_list() {
        let (ledger, repo) = ledger_with_dunes().await;

        let record = ledger.submit(submission("White Sand Dunes", "5"), "req-1").await.expect("submit");

        assert_eq!(record.time.as_deref(), Some("Oct 2026"));
        let stored = repo.find_by_name("White Sand Dunes").await.expect("find").expect("exists");
        assert_eq!(stored.histogram.counts(), [0, 0, 0, 0, 0, 4]);
        assert_eq!(stored.review_count, 4);
        assert_eq!(stored.reviews[0], record);
    }

    #[tokio::test]
    async fn fractional_rating_truncates_toward_zero() {
        let (ledger, repo) = ledger_with_dunes().await;

        let record = ledger.submit(submission("White Sand Dunes", "4.7"), "req-2").await.expect("submit");

        assert_eq!(record.rating.value(), 4);
        let stored = repo.find_by_name("White Sand Dunes").await.expect("find").expect("exists");
        assert_eq!(stored.histogram.counts(), [0, 0, 0, 0, 1, 3]);
    }

    #[tokio::test]
    async fn missing_content_is_rejected_without_mutation() {
        let (ledger, repo) = ledger_with_dunes().await;
        let mut incomplete = submission("White Sand Dunes", "5");
        incomplete.content = Some("   ".to_string());

        let error = ledger.submit(incomplete, "req-3").await.expect_err("should reject");

        assert_eq!(error, ApplicationError::Domain(DomainError::missing("content")));
        let stored = repo.find_by_name("White Sand Dunes").await.expect("find").expect("exists");
        assert_eq!(stored.histogram.counts(), [0, 0, 0, 0, 0, 3]);
        assert!(stored.reviews.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let (ledger, repo) = ledger_with_dunes().await;

        for rating in ["6", "-1", "five"] {
            let error = ledger
                .submit(submission("White Sand Dunes", rating), "req-4")
                .await
                .expect_err("should reject");
            assert!(matches!(
                error,
                ApplicationError::Domain(DomainError::Validation { field: "rating", .. })
            ));
        }
        let stored = repo.find_by_name("White Sand Dunes").await.expect("find").expect("exists");
        assert_eq!(stored.review_count, 3);
    }

    #[tokio::test]
    async fn unknown_attraction_is_not_found() {
        let (ledger, _) = ledger_with_dunes().await;

        let error = ledger.submit(submission("Ghost Pier", "3"), "req-5").await.expect_err("missing");

        assert_eq!(
            error,
            ApplicationError::NotFound { entity: "attraction", key: "Ghost Pier".to_string() }
        );
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_persistence_error() {
        let ledger = ReviewLedger::new(Arc::new(UnavailableRepository), fixed_clock());

        let error = ledger.submit(submission("White Sand Dunes", "5"), "req-6").await.expect_err("fails");

        assert!(matches!(error, ApplicationError::Persistence(ref message) if message.contains("offline")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reviews_on_sqlite_keep_count_and_histogram_aligned() {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("ledger.db").display());
        let pool = connect_with_settings(&url, 6, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = Arc::new(SqlAttractionRepository::new(pool));
        repo.save(Attraction::new("Ba Na Hills", "Da Nang")).await.expect("seed");
        let ledger = Arc::new(ReviewLedger::new(repo.clone(), fixed_clock()));

        let handles: Vec<_> = (0..24)
            .map(|index| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move {
                    let rating = (index % 6).to_string();
                    ledger.submit(submission("Ba Na Hills", &rating), "req-concurrent").await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("submit");
        }

        let stored = repo.find_by_name("Ba Na Hills").await.expect("find").expect("exists");
        assert_eq!(stored.review_count, 24);
        assert_eq!(stored.histogram.counts(), [4, 4, 4, 4, 4, 4]);
        assert_eq!(stored.check_consistency(), Ok(()));
    }
}
