pub mod api;
pub mod bootstrap;
pub mod health;
pub mod recommendations;
pub mod reviews;
pub mod trending;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use api::{router, AppState};
pub use bootstrap::{bootstrap, bootstrap_with_config, Application, BootstrapError};
pub use recommendations::{RecommendationOrchestrator, RecommendationOutcome};
pub use reviews::ReviewLedger;
pub use trending::TrendingService;
pub use worker::{ProcessWorker, ScraperWorker, WorkerFailure, WorkerOutput};
