pub mod init;
mod schema;

pub use schema::{Config, OracleConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/loan-score/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("loan-score"))
}

/// Get the default config file path (~/.config/loan-score/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/loan-score/config.yaml)
/// * `allow_missing` - Return the default config instead of failing when the file does not exist
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist and `allow_missing` is false
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>, allow_missing: bool) -> Result<Config> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        if allow_missing {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        anyhow::bail!(
            "Config file not found at {}. Run `loan-score init` to create one",
            config_path.display()
        );
    }

    parse_config_file(&config_path)
}

fn parse_config_file(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreBands;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
oracle:
  artifact: /opt/models/loan.json
scoring:
  min_score: 0
  max_score: 1000
  good_threshold: 600
"#,
        );
        let config = load_config(Some(file.path().to_path_buf()), false).unwrap();

        assert_eq!(
            config.oracle.unwrap().artifact,
            PathBuf::from("/opt/models/loan.json")
        );
        assert_eq!(
            config.scoring,
            Some(ScoreBands {
                min_score: 0,
                max_score: 1000,
                good_threshold: 600
            })
        );
    }

    #[test]
    fn test_scoring_section_is_optional() {
        let file = write_config("oracle:\n  artifact: model.json\n");
        let config = load_config(Some(file.path().to_path_buf()), false).unwrap();
        assert!(config.scoring.is_none());
        assert_eq!(config.effective_bands(), ScoreBands::default());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = load_config(Some(path.clone()), false).unwrap_err();
        assert!(err.to_string().contains("loan-score init"));

        let config = load_config(Some(path), true).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let file = write_config("oracle:\n  artifact: model.json\nqueries: []\n");
        assert!(load_config(Some(file.path().to_path_buf()), false).is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let file = write_config("scoring: [unclosed\n");
        let err = load_config(Some(file.path().to_path_buf()), false).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }
}
