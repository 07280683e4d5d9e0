//! Configuration loader and validator for the admin console client.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub api: Api,
    pub session: Session,
    pub ids: Ids,
    pub notifications: Notifications,
    pub policy: Policy,
}

/// Backend endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Api {
    pub base_url: String,
}

/// Where the persisted session keys live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub data_dir: String,
}

/// Per-resource ceilings for the persisted-id rule. Ids at or above a
/// ceiling are client-generated drafts and route to create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ids {
    pub default_ceiling: i64,
    pub product_ceiling: i64,
}

/// Notification bell polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notifications {
    pub poll_interval_ms: u64,
}

/// Failure-handling knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    pub on_unauthorized: UnauthorizedPolicy,
}

/// What to do when the backend answers 401 outside of login.
/// `Degrade` treats it like any transport failure on read paths;
/// `ForceLogout` additionally clears the persisted session so the route
/// guard redirects to login.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UnauthorizedPolicy {
    Degrade,
    ForceLogout,
}

impl Config {
    /// Ensure required directories exist (creates `session.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.session.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.session.data_dir)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api.base_url must be non-empty"));
    }
    if Url::parse(&cfg.api.base_url).is_err() {
        return Err(ConfigError::Invalid("api.base_url must be a valid URL"));
    }

    if cfg.session.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("session.data_dir must be non-empty"));
    }

    if cfg.ids.default_ceiling <= 0 {
        return Err(ConfigError::Invalid("ids.default_ceiling must be > 0"));
    }
    if cfg.ids.product_ceiling <= 0 {
        return Err(ConfigError::Invalid("ids.product_ceiling must be > 0"));
    }

    if cfg.notifications.poll_interval_ms == 0 {
        return Err(ConfigError::Invalid(
            "notifications.poll_interval_ms must be > 0",
        ));
    }

    Ok(())
}

/// Returns the canonical example YAML content.
pub fn example() -> &'static str {
    r#"api:
  base_url: "http://localhost:5001/api"

session:
  data_dir: "./data"

ids:
  default_ceiling: 1000000000
  product_ceiling: 1000000000000

notifications:
  poll_interval_ms: 60000

policy:
  on_unauthorized: "degrade"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.policy.on_unauthorized, UnauthorizedPolicy::Degrade);
    }

    #[test]
    fn invalid_base_url() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.api.base_url = "".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("api.base_url")),
            _ => panic!("wrong error"),
        }

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.api.base_url = "not a url".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_data_dir() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.session.data_dir = " ".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("session.data_dir")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_ceilings_and_interval() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.ids.default_ceiling = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.ids.product_ceiling = -1;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.notifications.poll_interval_ms = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn force_logout_policy_round_trips() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.policy.on_unauthorized = UnauthorizedPolicy::ForceLogout;
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        assert!(yaml.contains("force-logout"));
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.policy.on_unauthorized, UnauthorizedPolicy::ForceLogout);
    }

    #[test]
    fn ensure_dirs_creates_data_dir() {
        let td = tempdir().unwrap();
        let data_path = td.path().join("data");
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.session.data_dir = data_path.to_string_lossy().to_string();
        cfg.ensure_dirs().unwrap();
        assert!(data_path.exists());
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.ids.default_ceiling, 1_000_000_000);
        assert_eq!(cfg.ids.product_ceiling, 1_000_000_000_000);
        assert_eq!(cfg.notifications.poll_interval_ms, 60_000);
    }
}
