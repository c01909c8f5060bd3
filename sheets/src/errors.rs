use std::path::PathBuf;

/// Errors raised while loading service-account credentials.
#[derive(thiserror::Error, Debug)]
pub enum CredentialsError {
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
    #[error("could not read credentials file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid service account credentials: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("service account credentials are missing {0}")]
    MissingField(&'static str),
}

/// Errors raised while talking to Google.
#[derive(thiserror::Error, Debug)]
pub enum SheetsError {
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("could not sign token request: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token exchange failed with status {status}: {message}")]
    TokenExchange { status: u16, message: String },
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
