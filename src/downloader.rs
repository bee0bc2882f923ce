use crate::config::DownloadConfig;
use crate::error::Result;
use crate::models::Resource;
use crate::session::Session;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

pub struct Downloader {
    show_progress: bool,
}

impl Downloader {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            show_progress: config.progress,
        }
    }

    /// Stream one resource into `directory`, replacing any existing file of
    /// the same name. Returns the number of bytes written.
    ///
    /// The request is made before the file is created, so a refused
    /// connection or an error status leaves nothing on disk. A body that
    /// breaks off mid-stream leaves the partial file behind.
    pub async fn save_resource(&self, session: &Session, resource: &Resource, directory: &Path) -> Result<u64> {
        let file_name = resource.file_name()?;
        tokio::fs::create_dir_all(directory).await?;
        let path = directory.join(&file_name);

        info!("⬇️ Downloading {} -> {:?}", resource.url, path);
        let response = session.client().get_raw(&resource.url).await?;

        let progress = self.progress_bar(response.content_length(), &file_name);
        let mut out = BufWriter::new(File::create(&path).await?);
        let mut body = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress.set_position(written);
        }
        out.flush().await?;

        progress.finish_and_clear();
        debug!("Saved {:?} ({} bytes)", path, written);
        Ok(written)
    }

    fn progress_bar(&self, len: Option<u64>, name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = match len {
            Some(len) => {
                let bar = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            }
            None => {
                // No Content-Length: keep the spinner moving between chunks.
                let bar = ProgressBar::new_spinner();
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        bar.set_message(name.to_string());
        bar
    }
}
