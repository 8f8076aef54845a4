use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use wayfare_core::clock::FixedClock;
use wayfare_core::domain::attraction::{Attraction, Region};
use wayfare_core::domain::review::ReviewRecord;
use wayfare_db::repositories::{
    AppendOutcome, AttractionRepository, InMemoryAttractionRepository, RepositoryError,
};

use crate::worker::{ScraperWorker, WorkerFailure, WorkerOutput};

/// Replays one canned result after an optional delay.
pub struct ScriptedWorker {
    result: Result<WorkerOutput, WorkerFailure>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedWorker {
    pub fn succeeding(stdout: &str) -> Self {
        Self::exiting(0, stdout, "")
    }

    pub fn exiting(code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            result: Ok(WorkerOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code: Some(code),
            }),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: WorkerFailure) -> Self {
        Self { result: Err(failure), delay: Duration::ZERO, calls: AtomicUsize::new(0) }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScraperWorker for ScriptedWorker {
    async fn run(&self, _key: &str) -> Result<WorkerOutput, WorkerFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Store double whose every call fails.
pub struct UnavailableRepository;

fn offline() -> RepositoryError {
    RepositoryError::Decode("store offline".to_string())
}

#[async_trait]
impl AttractionRepository for UnavailableRepository {
    async fn find_by_name(&self, _name: &str) -> Result<Option<Attraction>, RepositoryError> {
        Err(offline())
    }

    async fn list_by_region(
        &self,
        _region: &str,
        _limit: u32,
    ) -> Result<Vec<Attraction>, RepositoryError> {
        Err(offline())
    }

    async fn list_all(&self) -> Result<Vec<Attraction>, RepositoryError> {
        Err(offline())
    }

    async fn append_review(
        &self,
        _name: &str,
        _review: ReviewRecord,
    ) -> Result<AppendOutcome, RepositoryError> {
        Err(offline())
    }

    async fn save(&self, _attraction: Attraction) -> Result<(), RepositoryError> {
        Err(offline())
    }

    async fn list_regions(&self) -> Result<Vec<Region>, RepositoryError> {
        Err(offline())
    }

    async fn save_region(&self, _region: Region) -> Result<(), RepositoryError> {
        Err(offline())
    }
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()))
}

/// Twelve stored places in Da Nang, two in Quang Nam.
pub async fn seeded_repository() -> Arc<InMemoryAttractionRepository> {
    let repo = Arc::new(InMemoryAttractionRepository::new());
    for index in 0..12u64 {
        let mut attraction = Attraction::new(format!("Da Nang Spot {index}"), "Da Nang")
            .with_histogram([0, 0, 0, 0, 1, index]);
        attraction.image = format!("https://cdn.example/dn-{index}.jpg");
        attraction.url = format!("/Attraction_Review-dn-{index}");
        repo.save(attraction).await.expect("seed Da Nang");
    }

    let mut hoi_an =
        Attraction::new("Hoi An Ancient Town", "Quang Nam").with_histogram([0, 0, 0, 0, 0, 3]);
    hoi_an.image = "https://cdn.example/hoi-an.jpg".to_string();
    repo.save(hoi_an).await.expect("seed Hoi An");
    repo.save(Attraction::new("My Son Sanctuary", "Quang Nam").with_histogram([0, 0, 0, 1, 0, 2]))
        .await
        .expect("seed My Son");

    for name in ["Da Nang", "Quang Nam"] {
        repo.save_region(Region { name: name.to_string(), country: "Vietnam".to_string() })
            .await
            .expect("seed region");
    }
    repo
}
