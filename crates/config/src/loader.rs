use std::path::{Path, PathBuf};

use {
    anyhow::Context,
    tracing::{debug, warn},
};

use crate::schema::FerryConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["ferry.toml", "ferry.yaml", "ferry.yml", "ferry.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<FerryConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./ferry.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/ferry/ferry.{toml,yaml,yml,json}` (user-global)
///
/// Returns `FerryConfig::default()` if no config file is found or it fails to parse.
pub fn discover_and_load() -> FerryConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    FerryConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/ferry/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "ferry").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory that holds the default save roots.
///
/// Falls back to `./.ferry` when no home directory can be determined.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "ferry")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".ferry"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<FerryConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_each_supported_format() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("ferry.toml");
        std::fs::write(&toml_path, "[media]\ndownload_timeout_secs = 30\n").unwrap();
        assert_eq!(
            load_config(&toml_path).unwrap().media.download_timeout_secs,
            30
        );

        let yaml_path = dir.path().join("ferry.yaml");
        std::fs::write(&yaml_path, "media:\n  download_timeout_secs: 45\n").unwrap();
        assert_eq!(
            load_config(&yaml_path).unwrap().media.download_timeout_secs,
            45
        );

        let json_path = dir.path().join("ferry.json");
        std::fs::write(&json_path, r#"{"metrics": {"enabled": true}}"#).unwrap();
        assert!(load_config(&json_path).unwrap().metrics.enabled);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ferry.ini");
        std::fs::write(&path, "").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_config(Path::new("/nonexistent/ferry.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ferry.toml"));
    }
}
