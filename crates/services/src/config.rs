use std::env;
use std::fmt;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Where the quiz backend lives and how to authenticate against it.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub token: Option<String>,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` when `base_url` is not an absolute http(s)-style url.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token: None,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Read `QUIZ_API_URL` and `QUIZ_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `QUIZ_API_URL` is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = env::var("QUIZ_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let token = env::var("QUIZ_API_TOKEN").ok();
        Ok(Self::new(&base)?.with_token(token))
    }

    #[must_use]
    pub fn auth(&self) -> AuthContext {
        AuthContext {
            token: self.token.clone(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Base urls always end in `/` so relative joins keep their path prefix.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&normalized).map_err(|source| ConfigError::InvalidUrl {
        raw: raw.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABase {
            raw: raw.to_owned(),
        });
    }
    Ok(url)
}

/// Credentials passed explicitly to every backend call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = ApiConfig::new("http://localhost:5000/backend").unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/backend/");
    }

    #[test]
    fn rejects_unusable_urls() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ApiConfig::new("mailto:someone@example.com"),
            Err(ConfigError::NotABase { .. })
        ));
    }

    #[test]
    fn blank_token_is_dropped_and_debug_redacts() {
        let config = ApiConfig::new(DEFAULT_API_URL)
            .unwrap()
            .with_token(Some("  ".into()));
        assert!(config.auth().token().is_none());

        let auth = AuthContext::bearer("secret");
        assert!(!format!("{auth:?}").contains("secret"));
    }
}
