use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use pms_core::config::patient_data_file_from_env_value;
use pms_core::{CoreConfig, PatientService};

/// Main entry point for the PMS application
///
/// Resolves configuration once, then serves the REST API until the process is stopped.
///
/// # Environment Variables
/// - `PMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PMS_DATA_FILE`: JSON file holding the patient collection (default: "patients.json")
///
/// A `.env` file in the working directory is loaded first if present.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be parsed or bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pms_run=info".parse()?)
                .add_directive("pms_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("PMS_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;

    let data_file = patient_data_file_from_env_value(std::env::var("PMS_DATA_FILE").ok());
    let cfg = Arc::new(CoreConfig::new(data_file)?);

    tracing::info!("++ Starting PMS REST on {}", rest_addr);
    tracing::info!(
        "++ Patient data file: {}",
        cfg.patient_data_file().display()
    );

    let app = api_rest::router(AppState::new(PatientService::new(cfg)));

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
