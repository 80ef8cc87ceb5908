use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Settings file name
pub const SETTINGS_FILE: &str = "ridemap.json";
/// Log file name used by `--log` without a path
pub const LOG_FILE: &str = "ridemap.log";

const APP_DIR: &str = "ridemap";
const ENV_CONFIG_DIR: &str = "RIDEMAP_CONFIG_DIR";

/// Override for where settings and logs live
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var (RIDEMAP_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(ENV_CONFIG_DIR).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Get path to a configuration file
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. RIDEMAP_CONFIG_DIR environment variable
/// 3. Current folder IF it already holds ridemap.json or ridemap.log
/// 4. Platform config directory from dirs-next (`~/.config/ridemap` on Linux)
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    config_dir(config).join(name)
}

/// Get path to a data file (logs). Same priority as [`config_file`], with
/// the platform data directory as the default (`~/.local/share/ridemap`).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    data_dir(config).join(name)
}

/// Create the config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = config_dir(config);
    let data_dir = data_dir(config);

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    if data_dir != config_dir {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn config_dir(config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir())
}

fn data_dir(config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir())
}

fn resolve_dir(config: &PathConfig, platform_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Ok(current_dir) = std::env::current_dir()
        && has_local_files(&current_dir)
    {
        return current_dir;
    }
    platform_dir
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_dir_wins() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(config_file(SETTINGS_FILE, &config), PathBuf::from("/custom/ridemap.json"));
        assert_eq!(data_file(LOG_FILE, &config), PathBuf::from("/custom/ridemap.log"));
    }

    #[test]
    fn test_cli_dir_before_env() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from-cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from-cli")));
    }

    #[test]
    fn test_platform_default_is_app_subdir() {
        let dir = resolve_dir(&PathConfig::default(), Some(PathBuf::from("/platform")));
        // Unless the test runs in a folder holding ridemap files
        if !dir.join(SETTINGS_FILE).exists() && !dir.join(LOG_FILE).exists() {
            assert_eq!(dir, PathBuf::from("/platform/ridemap"));
        }
    }

    #[test]
    fn test_local_files_detection() {
        let temp = tempfile::tempdir().unwrap();
        assert!(!has_local_files(temp.path()));
        std::fs::write(temp.path().join(LOG_FILE), "").unwrap();
        assert!(has_local_files(temp.path()));
    }

    #[test]
    fn test_ensure_dirs_creates_custom_dir() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("cfg");
        let config = PathConfig {
            config_dir: Some(dir.clone()),
        };
        ensure_dirs(&config).unwrap();
        assert!(dir.is_dir());
    }
}
