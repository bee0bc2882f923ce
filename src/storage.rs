use crate::config::StorageConfig;
use crate::error::Result;
use crate::models::Episode;
use std::path::PathBuf;
use tracing::debug;

/// Lays out `<base_path>/<episode title>/<resource name>`.
pub struct StorageManager {
    base_path: PathBuf,
}

impl StorageManager {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base_path: PathBuf::from(&config.base_path),
        }
    }

    /// Directory for an episode, without touching the filesystem.
    /// `index` is the episode's zero-based position in the catalog.
    pub fn episode_path(&self, episode: &Episode, index: usize) -> PathBuf {
        let mut dir_name = sanitize_filename(&episode.title);
        if dir_name.is_empty() {
            dir_name = format!("episode_{:03}", index + 1);
        }
        self.base_path.join(dir_name)
    }

    /// Directory for an episode, created if it doesn't exist.
    pub async fn episode_dir(&self, episode: &Episode, index: usize) -> Result<PathBuf> {
        let path = self.episode_path(episode, index);
        tokio::fs::create_dir_all(&path).await?;
        debug!("Episode directory ready: {:?}", path);
        Ok(path)
    }
}

/// Make `name` safe to use as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == ' ')
        .to_string()
}
