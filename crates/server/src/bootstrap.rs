use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;
use wayfare_core::clock::SystemClock;
use wayfare_core::config::{AppConfig, ConfigError, LoadOptions};
use wayfare_core::ranking::TrendingEngine;
use wayfare_db::repositories::{AttractionRepository, SqlAttractionRepository};
use wayfare_db::{connect_from_config, migrations, DbPool};

use crate::api::AppState;
use crate::recommendations::RecommendationOrchestrator;
use crate::reviews::ReviewLedger;
use crate::trending::TrendingService;
use crate::worker::ProcessWorker;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let state = build_state(&config, db_pool.clone());
    info!(
        event_name = "system.bootstrap.services_ready",
        correlation_id = "bootstrap",
        worker_program = %config.worker.program,
        worker_timeout_secs = config.worker.timeout_secs,
        trending_limit = config.trending.limit,
        "application services wired"
    );

    Ok(Application { config, db_pool, state })
}

pub fn build_state(config: &AppConfig, db_pool: DbPool) -> AppState {
    let repository: Arc<dyn AttractionRepository> = Arc::new(SqlAttractionRepository::new(db_pool));

    AppState {
        recommendations: Arc::new(RecommendationOrchestrator::new(
            Arc::new(ProcessWorker::from_config(&config.worker)),
            repository.clone(),
            Duration::from_secs(config.worker.timeout_secs),
            config.recommendations.fallback_limit,
        )),
        trending: Arc::new(TrendingService::new(
            repository.clone(),
            TrendingEngine::new(config.trending.limit as usize),
        )),
        reviews: Arc::new(ReviewLedger::new(repository.clone(), Arc::new(SystemClock))),
        repository,
    }
}
