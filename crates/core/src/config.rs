//! Startup configuration
//!
//! Assembled once from defaults, an optional file and `CATALOG_*`
//! environment variables, then passed explicitly to whatever needs it.

use crate::claims::RolePolicy;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CATALOG";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Deployment flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Test,
    Production,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the remote API, without a trailing slash
    pub api_base_url: String,

    /// Deployment flavour
    pub app_env: AppEnv,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// How tokens without a recognised role are treated
    pub role_policy: RolePolicy,

    /// Directory holding persisted client state
    pub data_dir: PathBuf,
}

/// Shape read from the sources before the required fields are checked
#[derive(Debug, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
    app_env: AppEnv,
    request_timeout_secs: u64,
    role_policy: RolePolicy,
    data_dir: PathBuf,
}

/// Default data directory (`<platform data dir>/catalog`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("catalog")
}

/// Trim whitespace and drop a single trailing slash (a lone `/` is kept)
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.len() > 1 {
        trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
    } else {
        trimmed.to_string()
    }
}

/// Defaults, then the file at `path`, then the environment, then `overrides`
fn layered(
    path: Option<&Path>,
    env: Option<HashMap<String, String>>,
    overrides: &[(&str, String)],
) -> ConfigResult<config::Config> {
    let mut builder = config::Config::builder()
        .set_default("app_env", "development")?
        .set_default("request_timeout_secs", DEFAULT_TIMEOUT_SECS)?
        .set_default("role_policy", "default_user")?
        .set_default("data_dir", default_data_dir().to_string_lossy().to_string())?;

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(env),
    );
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.as_str())?;
    }

    Ok(builder.build()?)
}

impl AppConfig {
    /// Configuration pointing at `api_base_url` with every other field defaulted
    pub fn new(api_base_url: impl AsRef<str>) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url.as_ref()),
            app_env: AppEnv::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            role_policy: RolePolicy::default(),
            data_dir: default_data_dir(),
        }
    }

    /// Load from defaults, the optional file at `path` and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, `api_base_url` is not
    /// set anywhere, or the result fails [`AppConfig::validate`].
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_from(path, None, &[])
    }

    /// Same as [`AppConfig::load`], reading variables from `env` instead of
    /// the process environment when it is given, then applying `overrides`
    /// (command-line flags) on top of everything
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn load_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
        overrides: &[(&str, String)],
    ) -> ConfigResult<Self> {
        let raw: RawConfig = layered(path, env, overrides)?.try_deserialize()?;
        let api_base_url = raw
            .api_base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("api_base_url"))?;

        let config = Self {
            api_base_url: normalize_base_url(&api_base_url),
            app_env: raw.app_env,
            request_timeout_secs: raw.request_timeout_secs,
            role_policy: raw.role_policy,
            data_dir: raw.data_dir,
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve only `data_dir`, with the same sources and precedence as
    /// [`AppConfig::load_from`]
    ///
    /// Works before the rest of the configuration is complete, e.g. when
    /// `api_base_url` is not set yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read.
    pub fn data_dir_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
        overrides: &[(&str, String)],
    ) -> ConfigResult<PathBuf> {
        Ok(layered(path, env, overrides)?.get("data_dir")?)
    }

    /// Check the invariants the rest of the client relies on
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute `http(s)` URL or
    /// the timeout is zero.
    pub fn validate(&self) -> ConfigResult<()> {
        let url = Url::parse(&self.api_base_url).map_err(|e| {
            ConfigError::invalid(format!("api_base_url '{}': {e}", self.api_base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(format!(
                "api_base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(" http://api.test/ "), "http://api.test");
        assert_eq!(normalize_base_url("http://api.test/api"), "http://api.test/api");
        assert_eq!(normalize_base_url("/"), "/");
    }

    #[test]
    fn test_missing_base_url_is_fatal() {
        let result = AppConfig::load_from(None, env(&[]), &[]);
        assert!(matches!(result, Err(ConfigError::Missing("api_base_url"))));
    }

    #[test]
    fn test_load_from_env() {
        let config = AppConfig::load_from(
            None,
            env(&[
                ("CATALOG_API_BASE_URL", "http://localhost:8080/"),
                ("CATALOG_REQUEST_TIMEOUT_SECS", "3"),
                ("CATALOG_ROLE_POLICY", "known_only"),
                ("CATALOG_APP_ENV", "production"),
            ]),
            &[],
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.role_policy, RolePolicy::KnownOnly);
        assert!(config.is_production());
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            AppConfig::load_from(None, env(&[("CATALOG_API_BASE_URL", "https://api.test")]), &[])
                .unwrap();
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.role_policy, RolePolicy::DefaultUser);
        assert_eq!(config.app_env, AppEnv::Development);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "api_base_url = \"http://from-file.test\"\nrequest_timeout_secs = 30\n",
        )
        .unwrap();

        let config = AppConfig::load_from(
            Some(&path),
            env(&[("CATALOG_API_BASE_URL", "http://from-env.test")]),
            &[],
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://from-env.test");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_data_dir_resolves_without_base_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "data_dir = \"/srv/catalog\"\n").unwrap();

        let data_dir = AppConfig::data_dir_from(Some(&path), env(&[]), &[]).unwrap();
        assert_eq!(data_dir, PathBuf::from("/srv/catalog"));

        let data_dir = AppConfig::data_dir_from(
            Some(&path),
            env(&[("CATALOG_DATA_DIR", "/var/lib/catalog")]),
            &[],
        )
        .unwrap();
        assert_eq!(data_dir, PathBuf::from("/var/lib/catalog"));

        assert_eq!(
            AppConfig::data_dir_from(None, env(&[]), &[]).unwrap(),
            default_data_dir()
        );
    }

    #[test]
    fn test_overrides_win_over_env() {
        let config = AppConfig::load_from(
            None,
            env(&[("CATALOG_API_BASE_URL", "http://from-env.test")]),
            &[("api_base_url", "http://from-flag.test".to_string())],
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://from-flag.test");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(AppConfig::new("not a url").validate().is_err());
        assert!(AppConfig::new("ftp://files.test").validate().is_err());
        assert!(AppConfig::new("http://ok.test").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = AppConfig::new("http://ok.test");
        config.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }
}
