use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_CREDENTIALS_VAR: &str = "GOOGLE_CREDENTIALS";
pub const DEFAULT_SPREADSHEET_ID_VAR: &str = "GOOGLE_SHEET_ID";
pub const DEFAULT_API_URL: &str = "https://sheets.googleapis.com";

/// Where the service-account key is read from.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum CredentialSource {
    /// A service-account JSON file on disk.
    File { path: PathBuf },
    /// An environment variable holding either the JSON itself or a path to it.
    Env {
        #[serde(default = "default_credentials_var")]
        var: String,
    },
}

impl Default for CredentialSource {
    fn default() -> Self {
        CredentialSource::Env {
            var: default_credentials_var(),
        }
    }
}

fn default_credentials_var() -> String {
    DEFAULT_CREDENTIALS_VAR.into()
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("default api url is valid")
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Config {
    /// Falls back to `GOOGLE_SHEET_ID` when unset.
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub credentials: CredentialSource,
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            spreadsheet_id: None,
            credentials: CredentialSource::default(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// The configured spreadsheet id, or the value of `GOOGLE_SHEET_ID`.
    pub fn resolve_spreadsheet_id<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.spreadsheet_id
            .clone()
            .or_else(|| env(DEFAULT_SPREADSHEET_ID_VAR))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}
