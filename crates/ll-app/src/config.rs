//! Application configuration from environment variables

use anyhow::{bail, Result};

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Settings read once at startup. Only the workspace id is required; the
/// credential and assistant settings unlock their features when present.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Log Analytics workspace to query
    pub workspace_id: Option<String>,

    // Service principal credentials
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Pre-acquired bearer token, used when no service principal is set
    pub access_token: Option<String>,

    // Assistant collaborator
    pub assistant_endpoint: Option<String>,
    pub assistant_key: Option<String>,
    pub assistant_deployment: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            workspace_id: env_opt("AZURE_LOG_ANALYTICS_WORKSPACE_ID"),
            tenant_id: env_opt("AZURE_TENANT_ID"),
            client_id: env_opt("AZURE_CLIENT_ID"),
            client_secret: env_opt("AZURE_CLIENT_SECRET"),
            access_token: env_opt("AZURE_ACCESS_TOKEN"),
            assistant_endpoint: env_opt("ASSISTANT_ENDPOINT"),
            assistant_key: env_opt("ASSISTANT_KEY"),
            assistant_deployment: env_opt("ASSISTANT_DEPLOYMENT"),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workspace_id.is_none() {
            bail!("AZURE_LOG_ANALYTICS_WORKSPACE_ID is required");
        }
        Ok(())
    }

    pub fn has_service_principal(&self) -> bool {
        self.tenant_id.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    pub fn assistant_enabled(&self) -> bool {
        self.assistant_endpoint.is_some() && self.assistant_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_workspace_id() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.workspace_id = Some("abc-123".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_assistant_needs_endpoint_and_key() {
        let mut config = Config::default();
        assert!(!config.assistant_enabled());
        config.assistant_endpoint = Some("https://assistant.example".to_string());
        assert!(!config.assistant_enabled());
        config.assistant_key = Some("secret".to_string());
        assert!(config.assistant_enabled());
    }

    #[test]
    fn test_service_principal_needs_all_three() {
        let mut config = Config::default();
        config.tenant_id = Some("t".to_string());
        config.client_id = Some("c".to_string());
        assert!(!config.has_service_principal());
        config.client_secret = Some("s".to_string());
        assert!(config.has_service_principal());
    }
}
