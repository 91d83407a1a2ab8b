//! Settings from the process environment.
//!
//! Nothing is validated on load: a missing URI, credential or API key only
//! surfaces when the value is first needed (connecting, or the first model
//! call).

use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Connection and model settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub neo4j_uri: Option<String>,
    pub neo4j_user: Option<String>,
    pub neo4j_password: Option<String>,
    pub neo4j_database: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
}

impl Settings {
    /// Load `.env` from the working directory if present, then read the
    /// environment.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            neo4j_uri: non_empty("NEO4J_URI"),
            neo4j_user: non_empty("NEO4J_USER"),
            neo4j_password: non_empty("NEO4J_PASSWORD"),
            neo4j_database: non_empty("NEO4J_DATABASE"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        }
    }

    /// Bolt connection settings.
    ///
    /// Only the URI is required here; missing credentials are sent empty
    /// and rejected by the server.
    #[cfg(feature = "bolt")]
    pub fn bolt_config(&self) -> Result<crate::storage::BoltConfig> {
        Ok(crate::storage::BoltConfig {
            uri: require(&self.neo4j_uri, "NEO4J_URI")?.to_string(),
            user: self.neo4j_user.clone().unwrap_or_default(),
            password: self.neo4j_password.clone().unwrap_or_default(),
            database: self.neo4j_database.clone(),
        })
    }
}

/// Borrow a setting or name the variable that is missing.
pub fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| Error::ConfigError(format!("{name} is not set")))
}
