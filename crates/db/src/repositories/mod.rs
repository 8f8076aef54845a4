use async_trait::async_trait;
use thiserror::Error;

use wayfare_core::domain::attraction::{Attraction, Region};
use wayfare_core::domain::review::ReviewRecord;
use wayfare_core::errors::ApplicationError;
use wayfare_core::ranking::{TrendingEngine, TrendingEntry};

pub mod attraction;
pub mod memory;

pub use attraction::SqlAttractionRepository;
pub use memory::InMemoryAttractionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended { review_count: u64 },
    NotFound,
}

/// Backing store for attractions and their reviews.
///
/// Listing methods return attractions without their review lists; `find_by_name` loads the
/// full record.
#[async_trait]
pub trait AttractionRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Attraction>, RepositoryError>;

    async fn list_by_region(
        &self,
        region: &str,
        limit: u32,
    ) -> Result<Vec<Attraction>, RepositoryError>;

    /// Every attraction in ingestion order.
    async fn list_all(&self) -> Result<Vec<Attraction>, RepositoryError>;

    async fn top_per_region(
        &self,
        engine: &TrendingEngine,
    ) -> Result<Vec<TrendingEntry>, RepositoryError> {
        let attractions = self.list_all().await?;
        Ok(engine.rank(&attractions))
    }

    /// Prepends `review` and increments the count and histogram bucket as one commit.
    /// Concurrent appends to the same attraction never lose an increment.
    async fn append_review(
        &self,
        name: &str,
        review: ReviewRecord,
    ) -> Result<AppendOutcome, RepositoryError>;

    async fn save(&self, attraction: Attraction) -> Result<(), RepositoryError>;

    async fn list_regions(&self) -> Result<Vec<Region>, RepositoryError>;

    async fn save_region(&self, region: Region) -> Result<(), RepositoryError>;
}
