use env_logger::Env;
use log::{debug, error, info};

use crate::{
    config::{Config, Environment, JobConfig, JobKind},
    db::Database,
    errors::AppError,
    services::{self, generate_dummy_urls, IdWindows, Services},
    utils::{format::group_digits, RngSource},
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> AppResult<()> {
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,sqlx=warn".to_string(),
        Environment::Production => "info,sqlx=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

/// Loads configuration, connects, runs the configured job and closes the pool
pub async fn run() -> AppResult<()> {
    let (config, env_file) = Config::load()?;
    setup_logging(&config)?;
    env_file.log();
    info!("Configuration loaded successfully");

    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    if config.app.environment == Environment::Development {
        debug!("Full configuration: {:?}", config);
    }

    let db = Database::connect(&config.db).await?;
    let registered = services::register(db.clone(), config.db.table.clone(), config.job.page_size);

    let result = match registered {
        Ok(services) => run_job(&config.job, &services).await,
        Err(e) => Err(e.into()),
    };

    db.shutdown().await;
    result
}

async fn run_job(job: &JobConfig, services: &Services) -> AppResult<()> {
    match job.kind {
        JobKind::UpdateVisitCounts => {
            info!(
                "Starting batch update of visit counts for IDs {} to {}...",
                job.start_id, job.end_id
            );

            let windows = IdWindows::new(job.start_id, job.end_id, job.batch_size)?
                .resume_from(job.start_batch);
            let updater = &services.visit_count_updater;

            let result = match job.random_seed {
                Some(seed) => {
                    info!("Using fixed random seed {}", seed);
                    updater
                        .update_visit_counts(windows, &mut RngSource::seeded(seed))
                        .await
                }
                None => {
                    updater
                        .update_visit_counts(windows, &mut RngSource::from_entropy())
                        .await
                }
            };

            match result {
                Ok(_) => {
                    info!("✓ Batch update completed successfully!");
                    Ok(())
                }
                Err(e) => {
                    error!("✗ Batch update failed!");
                    Err(e.into())
                }
            }
        }
        JobKind::BulkInsert => {
            info!(
                "Generating {} dummy URLs for the bulk test...",
                group_digits(job.bulk_insert_count as u64)
            );
            let urls = generate_dummy_urls(job.bulk_insert_count);
            services.bulk_inserter.bulk_create(&urls).await?;
            Ok(())
        }
    }
}
