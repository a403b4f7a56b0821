//! Immutable forwarder configuration.
//!
//! Built once at startup from CLI flags / environment and handed to the
//! [`Forwarder`](crate::proxy::Forwarder). Nothing reads the environment
//! after this point.

use std::time::Duration;

use crate::cli::RunArgs;
use crate::error::ForwarderError;

pub const DEFAULT_API_SERVER_URL: &str = "http://localhost:5100";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_BODY: usize = 1_048_576;

#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    backend_origin: String,
    environment: String,
    timeout: Duration,
    max_body: usize,
}

impl ForwarderConfig {
    /// Validates `backend_origin` and fills the rest with defaults.
    pub fn new(backend_origin: &str) -> Result<Self, ForwarderError> {
        Ok(Self {
            backend_origin: normalize_origin(backend_origin)?,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_body: DEFAULT_MAX_BODY,
        })
    }

    pub fn from_args(args: &RunArgs) -> Result<Self, ForwarderError> {
        if args.timeout == 0 {
            return Err(ForwarderError::InvalidTimeout);
        }
        Ok(Self::new(&args.api_server_url)?
            .with_environment(&args.environment)
            .with_timeout(Duration::from_millis(args.timeout))
            .with_max_body(args.max_body))
    }

    #[must_use]
    pub fn with_environment(mut self, environment: &str) -> Self {
        self.environment = environment.to_string();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    #[must_use]
    pub fn backend_origin(&self) -> &str {
        &self.backend_origin
    }

    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn max_body(&self) -> usize {
        self.max_body
    }

    /// `origin + path + query`, with the path and query left untouched.
    #[must_use]
    pub fn target_url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.backend_origin)
    }
}

fn normalize_origin(raw: &str) -> Result<String, ForwarderError> {
    let invalid = |reason: &str| ForwarderError::InvalidBackendOrigin {
        origin: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("must not contain a query or fragment"));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_origin_is_valid() {
        let config = ForwarderConfig::new(DEFAULT_API_SERVER_URL).unwrap();
        assert_eq!(config.backend_origin(), "http://localhost:5100");
        assert_eq!(config.environment(), "development");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn target_url_keeps_query_verbatim() {
        let config = ForwarderConfig::new("http://api:5100").unwrap();
        assert_eq!(
            config.target_url("/api/games?publisher=Tailspin&sort=title%20asc"),
            "http://api:5100/api/games?publisher=Tailspin&sort=title%20asc"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ForwarderConfig::new("http://api:5100/").unwrap();
        assert_eq!(config.target_url("/api/games"), "http://api:5100/api/games");
    }

    #[test]
    fn origin_path_prefix_is_kept() {
        let config = ForwarderConfig::new("https://edge.example.com/backend").unwrap();
        assert_eq!(
            config.target_url("/api/games/1"),
            "https://edge.example.com/backend/api/games/1"
        );
    }

    #[test]
    fn rejects_unsupported_scheme() {
        let err = ForwarderConfig::new("ftp://api:21").unwrap_err();
        assert!(matches!(err, ForwarderError::InvalidBackendOrigin { .. }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(ForwarderConfig::new("not a url").is_err());
        assert!(ForwarderConfig::new("http://api:5100?x=1").is_err());
    }
}
