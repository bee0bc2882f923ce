use crate::catalog::extract_episodes;
use crate::config::{Config, Credentials};
use crate::downloader::Downloader;
use crate::error::CartFetchError;
use crate::models::{Episode, RunSummary, Site};
use crate::resources::extract_resources;
use crate::session::Session;
use crate::storage::StorageManager;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Login failed: {0}")]
    Login(#[source] CartFetchError),

    #[error("Catalog could not be read: {0}")]
    Catalog(#[source] CartFetchError),

    #[error("Episode '{episode}' failed: {source}")]
    Episode {
        episode: String,
        #[source]
        source: CartFetchError,
    },

    #[error("{} episode(s) could not be downloaded", .failures.len())]
    Incomplete {
        summary: RunSummary,
        failures: Vec<EpisodeFailure>,
    },
}

#[derive(Debug)]
pub struct EpisodeFailure {
    pub episode: String,
    pub error: CartFetchError,
}

impl CrawlError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            CrawlError::Login(_) => 2,
            CrawlError::Catalog(_) | CrawlError::Episode { .. } | CrawlError::Incomplete { .. } => 3,
        }
    }
}

/// Walks the catalog one episode and one resource at a time.
pub struct Crawler {
    config: Config,
    storage: StorageManager,
    downloader: Downloader,
    dry_run: bool,
}

impl Crawler {
    pub fn new(config: Config) -> Self {
        let storage = StorageManager::new(&config.storage);
        let downloader = Downloader::new(&config.download);
        Self {
            config,
            storage,
            downloader,
            dry_run: false,
        }
    }

    /// List episodes and resources without writing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, site: Site, credentials: &Credentials) -> Result<RunSummary, CrawlError> {
        let session = Session::login(site, credentials, &self.config.site)
            .await
            .map_err(CrawlError::Login)?;

        let episodes =
            extract_episodes(session.catalog(), session.site()).map_err(CrawlError::Catalog)?;

        let mut summary = RunSummary::default();
        let mut failures = Vec::new();

        for (index, episode) in episodes.iter().enumerate() {
            match self.process_episode(&session, episode, index, &mut summary).await {
                Ok(()) => summary.episodes += 1,
                Err(e) if self.config.download.keep_going => {
                    warn!("❌ Skipping rest of '{}': {}", episode.title, e);
                    failures.push(EpisodeFailure {
                        episode: episode.title.clone(),
                        error: e,
                    });
                }
                Err(e) => {
                    error!("❌ Stopping at '{}': {}", episode.title, e);
                    return Err(CrawlError::Episode {
                        episode: episode.title.clone(),
                        source: e,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(CrawlError::Incomplete { summary, failures });
        }

        info!("🎉 Done: {}", summary);
        Ok(summary)
    }

    async fn process_episode(
        &self,
        session: &Session,
        episode: &Episode,
        index: usize,
        summary: &mut RunSummary,
    ) -> Result<(), CartFetchError> {
        if self.dry_run {
            let resources = extract_resources(session, episode).await?;
            println!("{}", episode.title);
            if !episode.description.is_empty() {
                println!("  {}", episode.description);
            }
            for resource in &resources {
                println!("    {}  {}", resource.name, resource.url);
            }
            summary.resources += resources.len();
            return Ok(());
        }

        info!("📖 Downloading episode: {}", episode.title);
        let dir = self.storage.episode_dir(episode, index).await?;

        for resource in extract_resources(session, episode).await? {
            summary.bytes += self.downloader.save_resource(session, &resource, &dir).await?;
            summary.resources += 1;
        }
        Ok(())
    }
}
