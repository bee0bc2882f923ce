use crate::error::Result;
use crate::html::{Page, Selection};
use crate::models::{Episode, Site};
use tracing::{debug, info, warn};

const EPISODE_BLOCK: &str = ".blog-entry";
const EPISODE_TITLE: &str = "h3";
const EPISODE_DESCRIPTION: &str = ".blog-content";
const EPISODE_LINK: &str = ".content-post-meta span a";

/// Every episode listed on the catalog page, in page order.
///
/// Blocks with missing parts are kept with empty fields; a block whose detail
/// link is missing or unusable points at the site base.
pub fn extract_episodes(page: &Page, site: &Site) -> Result<Vec<Episode>> {
    let blocks = page.find(EPISODE_BLOCK)?;

    let mut episodes = Vec::with_capacity(blocks.len());
    for block in blocks.iter() {
        episodes.push(episode_from_block(&block, site)?);
    }

    info!("📚 Catalog lists {} episodes", episodes.len());
    Ok(episodes)
}

fn episode_from_block(block: &Selection<'_>, site: &Site) -> Result<Episode> {
    let title = block.find(EPISODE_TITLE)?.text();
    let description = block.find(EPISODE_DESCRIPTION)?.text();
    let href = block.find(EPISODE_LINK)?.attr("href").unwrap_or_default();

    if title.is_empty() || href.is_empty() {
        debug!(
            "Incomplete catalog entry (title: {:?}, link: {:?})",
            title, href
        );
    }

    let detail_url = match site.url_for(href) {
        Ok(url) => url,
        Err(e) => {
            warn!("Unusable link {:?} for '{}': {}", href, title, e);
            site.base().clone()
        }
    };

    Ok(Episode::new(title, description, detail_url))
}
