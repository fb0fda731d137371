use anyhow::{Context, Result};
use std::path::PathBuf;

/// Configuration for overriding default application paths
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Create PathConfig from CLI arguments and environment variables
    ///
    /// Priority: CLI args → ENV var (SCRY_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| {
            std::env::var("SCRY_CONFIG_DIR")
                .ok()
                .map(PathBuf::from)
        });

        Self { config_dir }
    }
}

/// Get path to a data file (logs, state dumps)
///
/// Priority:
/// 1. CLI --config-dir argument
/// 2. SCRY_CONFIG_DIR environment variable
/// 3. Local folder IF any scry files exist there (scry.log)
/// 4. Platform-specific data directory from dirs-next (default)
///
/// Platform paths:
/// - Linux: ~/.local/share/scry/{name}
/// - macOS: ~/Library/Application Support/scry/{name}
/// - Windows: %APPDATA%\scry\{name}
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    get_data_dir(config).join(name)
}

/// Ensure that the data directory exists
///
/// Creates it if missing. Returns error if creation fails.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let data_dir = get_data_dir(config);

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }

    Ok(())
}

/// Check if any scry files exist in the given directory
fn has_local_files(dir: &PathBuf) -> bool {
    let files = ["scry.log"];
    files.iter().any(|f| dir.join(f).exists())
}

/// Get the data directory
fn get_data_dir(config: &PathConfig) -> PathBuf {
    // Priority 1: Custom directory from CLI or ENV
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    // Priority 2: Local folder IF scry files exist there
    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_files(&current_dir) {
            return current_dir;
        }
    }

    // Priority 3: Platform-specific data directory
    if let Some(dir) = dirs_next::data_dir() {
        return dir.join("scry");
    }

    // Fallback: "." if everything else fails
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_file_with_custom_dir() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };

        let path = data_file("scry.log", &config);
        assert_eq!(path, PathBuf::from("/custom/scry.log"));
    }

    #[test]
    fn test_data_file_uses_platform_defaults() {
        let config = PathConfig { config_dir: None };

        let path = data_file("scry.log", &config);
        assert!(path.to_string_lossy().contains("scry"));
        assert!(path.to_string_lossy().contains("scry.log"));
    }

    #[test]
    fn test_cli_dir_wins_over_env() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from-cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from-cli")));
    }
}
