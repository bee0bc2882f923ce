use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_DOMAIN: &str = "example-host.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub storage: StorageConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Parent domain; the subdomain argument is prepended to it.
    pub domain: String,
    /// Full base URL overriding `https://{subdomain}.{domain}/`.
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    /// Whole-request timeout. The client default (none) applies when unset.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub base_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Abort only the failing episode and report all failures at the end.
    pub keep_going: bool,
    pub progress: bool,
}

/// Login credentials. Never read from or written to the config file.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            base_url: None,
            user_agent: None,
            timeout_secs: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: "./downloads".to_string(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            keep_going: false,
            progress: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\nbase_path = \"/tmp/episodes\"\n\n[download]\nkeep_going = true").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.storage.base_path, "/tmp/episodes");
        assert!(config.download.keep_going);
        assert!(config.download.progress);
        assert_eq!(config.site.domain, DEFAULT_DOMAIN);
        assert!(config.site.base_url.is_none());
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[storage\nbase_path = 3").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::CartFetchError::Config(_)));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("alice", "hunter2");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("alice"));
        assert!(!shown.contains("hunter2"));
    }
}
