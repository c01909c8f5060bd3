pub mod api;
pub mod config;
pub mod errors;
pub mod handler;
pub mod metrics_defs;
pub mod payment;

#[cfg(test)]
mod testutils;

use handler::PaymentIntake;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use sheets::{CredentialsError, ServiceAccountKey, SheetsClient, SheetsError};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Validation(#[from] config::ValidationError),

    #[error("no spreadsheet id: set sheets.spreadsheet_id or {}", sheets::config::DEFAULT_SPREADSHEET_ID_VAR)]
    MissingSpreadsheetId,

    #[error("failed to load service account: {0}")]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

/// Builds a Sheets client from config, reading credentials and the spreadsheet
/// id through `env` where the config defers to the environment.
pub fn connect<F>(config: &sheets::Config, env: F) -> Result<SheetsClient, ServiceError>
where
    F: Fn(&str) -> Option<String>,
{
    let spreadsheet_id = config
        .resolve_spreadsheet_id(&env)
        .ok_or(ServiceError::MissingSpreadsheetId)?;
    let key = ServiceAccountKey::load(&config.credentials, &env)?;
    let client = SheetsClient::new(config, key, spreadsheet_id)?;

    tracing::info!(
        spreadsheet_id = client.spreadsheet_id(),
        client_email = client.client_email(),
        "Loaded service account"
    );

    Ok(client)
}

pub async fn run(config: config::Config) -> Result<(), ServiceError> {
    config.validate()?;

    let client = connect(&config.sheets, |name| std::env::var(name).ok())?;
    let intake = Arc::new(PaymentIntake::new(Arc::new(client)));

    // An unreachable spreadsheet does not stop startup; readiness stays false
    // until a call succeeds.
    match intake.probe().await {
        Ok(titles) => tracing::info!(worksheets = ?titles, "Spreadsheet reachable"),
        Err(e) => tracing::error!(error = %e, "Spreadsheet probe failed"),
    }

    let ready = intake.clone();
    let admin_service = AdminService::<_, std::io::Error>::new(move || ready.is_ready());

    tokio::try_join!(
        api::serve(&config.listener, intake),
        run_http_service(
            &config.admin_listener.host,
            config.admin_listener.port,
            admin_service
        ),
    )?;

    Ok(())
}
