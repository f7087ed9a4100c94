//! Service configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_MODEL_DIR: &str = "model";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DOCS_URL: &str = "/docs";
pub const DEFAULT_REDOC_URL: &str = "/redoc";
pub const DEFAULT_OPENAPI_URL: &str = "/openapi.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Where the interactive docs and the OpenAPI document are served.
///
/// `DISABLE_DOCS` removes both documentation UIs; the OpenAPI document
/// itself stays available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsConfig {
    /// Swagger UI; `None` when docs are disabled.
    pub docs_url: Option<String>,
    /// ReDoc; `None` when docs are disabled.
    pub redoc_url: Option<String>,
    pub openapi_url: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            docs_url: Some(DEFAULT_DOCS_URL.to_string()),
            redoc_url: Some(DEFAULT_REDOC_URL.to_string()),
            openapi_url: DEFAULT_OPENAPI_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub model_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub docs: DocsConfig,
}

impl ServeConfig {
    /// Read `MODEL_DIR`, `BIND_ADDR`, `DOCS_URL`, `REDOC_URL`, `OPENAPI_URL`,
    /// and `DISABLE_DOCS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let model_dir = lookup("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR));

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "BIND_ADDR",
            reason: format!("'{bind_raw}': {e}"),
        })?;

        let disabled = lookup("DISABLE_DOCS").is_some_and(|v| is_truthy(&v));
        let ui_path = |var: &'static str, default: &str| -> Result<Option<String>, ConfigError> {
            if disabled {
                Ok(None)
            } else {
                route_path(var, lookup(var), default).map(Some)
            }
        };
        let docs_url = ui_path("DOCS_URL", DEFAULT_DOCS_URL)?;
        let redoc_url = ui_path("REDOC_URL", DEFAULT_REDOC_URL)?;
        let openapi_url = route_path("OPENAPI_URL", lookup("OPENAPI_URL"), DEFAULT_OPENAPI_URL)?;

        let docs = DocsConfig {
            docs_url,
            redoc_url,
            openapi_url,
        };
        docs.check_distinct()?;

        Ok(Self {
            model_dir,
            bind_addr,
            docs,
        })
    }
}

impl DocsConfig {
    /// Every enabled docs path must be unique, and none may sit under another
    /// (the Swagger UI owns everything below its own path).
    fn check_distinct(&self) -> Result<(), ConfigError> {
        let paths = [
            ("DOCS_URL", self.docs_url.as_deref()),
            ("REDOC_URL", self.redoc_url.as_deref()),
            ("OPENAPI_URL", Some(self.openapi_url.as_str())),
        ];
        for (i, &(var, path)) in paths.iter().enumerate() {
            let Some(path) = path else { continue };
            for &(other_var, other) in &paths[..i] {
                let Some(other) = other else { continue };
                if overlaps(path, other) {
                    return Err(ConfigError::Invalid {
                        var,
                        reason: format!("'{path}' collides with {other_var} '{other}'"),
                    });
                }
            }
        }
        Ok(())
    }
}

fn overlaps(a: &str, b: &str) -> bool {
    let nested = |outer: &str, inner: &str| inner.strip_prefix(outer).is_some_and(|rest| rest.starts_with('/'));
    a == b || nested(a, b) || nested(b, a)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y")
}

/// Paths owned by the inference routes.
const RESERVED_PATHS: [&str; 2] = ["/health", "/predict"];

fn route_path(var: &'static str, value: Option<String>, default: &str) -> Result<String, ConfigError> {
    let path = value.unwrap_or_else(|| default.to_string());
    if RESERVED_PATHS.contains(&path.as_str()) {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("'{path}' is already served by the API"),
        });
    }
    if !path.starts_with('/') || path == "/" {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("'{path}' must be an absolute path other than '/'"),
        });
    }
    Ok(path)
}
