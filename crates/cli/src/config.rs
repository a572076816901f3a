//! CLI configuration utilities

use anyhow::{Context, Result};
use catalog_core::AppConfig;
use std::path::{Path, PathBuf};

/// Config file looked up in the data directory when `--config` is not given
pub const CONFIG_FILE: &str = "catalog.toml";

/// Placeholder written by `config init`
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Assemble the startup configuration
///
/// Precedence, lowest first: defaults, config file, `CATALOG_*` environment
/// variables, command-line flags.
pub fn load_app_config(
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
    api_base_url: Option<&str>,
) -> Result<AppConfig> {
    let file = config_file(config_path, data_dir);

    let mut overrides = data_dir_override(data_dir);
    if let Some(url) = api_base_url {
        overrides.push(("api_base_url", url.to_string()));
    }

    AppConfig::load_from(file.as_deref(), None, &overrides).with_context(|| match &file {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration (set CATALOG_API_BASE_URL or pass --api-base-url)"
            .to_string(),
    })
}

/// Data directory as the loaded configuration will see it
///
/// Needed before logging starts, so it must not depend on the rest of the
/// configuration being complete.
pub fn resolve_data_dir(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<PathBuf> {
    let file = config_file(config_path, data_dir);
    AppConfig::data_dir_from(file.as_deref(), None, &data_dir_override(data_dir))
        .context("Failed to resolve the data directory")
}

/// `--config`, else `catalog.toml` in the data directory when it exists
fn config_file(config_path: Option<&Path>, data_dir: Option<&Path>) -> Option<PathBuf> {
    let default_file = data_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(catalog_core::config::default_data_dir)
        .join(CONFIG_FILE);
    config_path
        .map(Path::to_path_buf)
        .or_else(|| default_file.exists().then_some(default_file))
}

fn data_dir_override(data_dir: Option<&Path>) -> Vec<(&'static str, String)> {
    data_dir
        .map(|dir| ("data_dir", dir.to_string_lossy().to_string()))
        .into_iter()
        .collect()
}

/// Write a configuration file with default values
pub fn generate_default_config<P: AsRef<Path>>(path: P, data_dir: Option<PathBuf>) -> Result<()> {
    let mut config = AppConfig::new(DEFAULT_API_BASE_URL);
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    let content = toml::to_string_pretty(&config)?;
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::RolePolicy;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        generate_default_config(&path, Some(dir.path().to_path_buf())).unwrap();

        let config = AppConfig::load_from(Some(&path), Some(HashMap::new()), &[]).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.role_policy, RolePolicy::DefaultUser);
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_data_dir_from_config_file() {
        let dir = TempDir::new().unwrap();
        let elsewhere = dir.path().join("state");
        let path = dir.path().join(CONFIG_FILE);
        generate_default_config(&path, Some(elsewhere.clone())).unwrap();

        assert_eq!(resolve_data_dir(Some(&path), None).unwrap(), elsewhere);

        let flag = dir.path().join("flag");
        assert_eq!(resolve_data_dir(Some(&path), Some(&flag)).unwrap(), flag);
    }
}
