use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Io { path, source } => {
                format!("Could not read config file {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                format!("Config file {} is not valid TOML: {}", path.display(), source)
            }
        }
    }
}

/// External player settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub command: String,
    pub fullscreen: bool,
    pub extra_args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            fullscreen: true,
            extra_args: Vec::new(),
        }
    }
}

/// Downloader used for the save-link action. `{url}` and `{file}` in `args`
/// are substituted per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub command: String,
    pub args: Vec<String>,
    pub directory: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        let directory = UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(std::env::temp_dir);
        Self {
            command: "curl".to_string(),
            args: ["-L", "-s", "-o", "{file}", "{url}"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            directory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root serving `/video/movies.json`.
    pub base_url: String,
    /// Explicit catalog URL or path, overriding `base_url`.
    pub catalog: Option<String>,
    pub dark_mode: bool,
    pub toast_seconds: u64,
    pub player: PlayerConfig,
    pub download: DownloadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            catalog: None,
            dark_mode: true,
            toast_seconds: 5,
            player: PlayerConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

impl Config {
    /// `<config dir>/streamflix/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`, or from the default location. A missing file at the
    /// default location yields defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::read(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::read(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "streamflix", "streamflix")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.dark_mode);
        assert_eq!(config.toast_seconds, 5);
        assert_eq!(config.player.command, "mpv");
        assert!(config.download.args.iter().any(|a| a == "{url}"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://films.example\"").unwrap();
        writeln!(file, "[player]").unwrap();
        writeln!(file, "fullscreen = false").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.base_url, "https://films.example");
        assert!(!config.player.fullscreen);
        assert_eq!(config.player.command, "mpv");
        assert!(config.dark_mode);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dark_mode = \"sometimes").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.user_message().contains("not valid TOML"));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
