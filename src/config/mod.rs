use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(alias = "server")]
    pub base_url: Option<String>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub header: Option<String>,
    pub follow_redirects: Option<bool>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    pub landing_page: Option<String>,
    #[serde(alias = "range")]
    pub time_range: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid config path '{}'", path.display())]
    InvalidPath { path: PathBuf },

    #[error("failed to write config '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".gsu-monitor").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(path: &Path, contents: &str) -> Result<ConfigFile, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the YAML config. A missing default file is not an error; a
/// missing file the user named explicitly is.
pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(path, &contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn default_config_yaml() -> String {
    r#"# gsu-monitor config
#
# Location (default):
#   ~/.gsu-monitor/config.yml
#
# Command-line flags override anything set here.

# Admin panel server
base_url: http://127.0.0.1:5000
timeout: 10
follow_redirects: true

# HTTP (optional)
# proxy: http://127.0.0.1:8080
# header: "Cookie: session=..."

# Output (optional)
# output: ./inventory.html
# output_format: html
no_color: false

# Where the session panel sends you after logging out
landing_page: landingpage.html

# Analytics window: 7d, 30d, 90d or all
time_range: 30d
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path.parent().ok_or_else(|| ConfigError::InvalidPath {
        path: path.to_path_buf(),
    })?;
    std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
        path: parent.to_path_buf(),
        source,
    })?;
    std::fs::write(path, default_config_yaml()).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses() {
        let cfg = parse_config(Path::new("default"), &default_config_yaml()).unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("http://127.0.0.1:5000"));
        assert_eq!(cfg.timeout, Some(10));
        assert_eq!(cfg.time_range.as_deref(), Some("30d"));
        assert_eq!(cfg.proxy, None);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = parse_config(Path::new("empty"), "  \n").unwrap();
        assert_eq!(cfg, ConfigFile::default());
    }

    #[test]
    fn server_alias_is_accepted() {
        let cfg = parse_config(Path::new("x"), "server: http://panel.local\n").unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("http://panel.local"));
    }

    #[test]
    fn bad_yaml_names_the_file() {
        let err = parse_config(Path::new("cfg.yml"), "timeout: [").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config 'cfg.yml'"));
    }

    #[test]
    fn missing_file_respects_allow_missing() {
        let path = std::env::temp_dir().join("gsu-monitor-missing-config-test.yml");
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(matches!(
            load_config(&path, false),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn init_writes_once() {
        let dir = std::env::temp_dir().join(format!("gsu-monitor-init-{}", std::process::id()));
        let path = dir.join("config.yml");
        let _ = std::fs::remove_dir_all(&dir);

        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        assert!(load_config(&path, false).unwrap().base_url.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
