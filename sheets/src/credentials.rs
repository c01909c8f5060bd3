use crate::config::CredentialSource;
use crate::errors::CredentialsError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// The subset of a Google service-account key file needed to mint tokens.
#[derive(Clone, Deserialize, PartialEq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

// Never print the private key.
impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, CredentialsError> {
        let key: ServiceAccountKey = serde_json::from_str(json)?;
        key.check()?;
        Ok(key)
    }

    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let json = std::fs::read_to_string(path).map_err(|source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Loads the key from `source`. `env` looks up environment variables.
    ///
    /// An environment value starting with `{` is parsed as the key itself,
    /// anything else is treated as a path to the key file.
    pub fn load<F>(source: &CredentialSource, env: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match source {
            CredentialSource::File { path } => Self::from_file(path),
            CredentialSource::Env { var } => {
                let value = env(var).ok_or_else(|| CredentialsError::MissingEnv(var.clone()))?;
                let value = value.trim();
                if value.starts_with('{') {
                    Self::from_json(value)
                } else if value.is_empty() {
                    Err(CredentialsError::MissingEnv(var.clone()))
                } else {
                    Self::from_file(Path::new(value))
                }
            }
        }
    }

    fn check(&self) -> Result<(), CredentialsError> {
        if self.client_email.is_empty() {
            return Err(CredentialsError::MissingField("client_email"));
        }
        if self.private_key.is_empty() {
            return Err(CredentialsError::MissingField("private_key"));
        }
        if self.token_uri.is_empty() {
            return Err(CredentialsError::MissingField("token_uri"));
        }
        Ok(())
    }
}
