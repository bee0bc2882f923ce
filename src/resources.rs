use crate::error::Result;
use crate::html::Page;
use crate::models::{Episode, Resource, Site};
use crate::session::Session;
use tracing::{debug, info, warn};

const RESOURCE_LIST: &str = ".blog-entry > ul";
const RESOURCE_LINK: &str = "li > a";

/// Fetch an episode's detail page and list its attachments.
pub async fn extract_resources(session: &Session, episode: &Episode) -> Result<Vec<Resource>> {
    debug!("Fetching detail page for '{}': {}", episode.title, episode.detail_url);
    let page = session.client().get_page(&episode.detail_url).await?;

    let resources = parse_resources(&page, session.site())?;
    info!("📎 '{}' has {} resources", episode.title, resources.len());
    Ok(resources)
}

/// Attachments listed on a detail page, in the order they are shown.
/// An anchor whose link cannot be resolved is skipped.
pub fn parse_resources(page: &Page, site: &Site) -> Result<Vec<Resource>> {
    let anchors = page.find(RESOURCE_LIST)?.find(RESOURCE_LINK)?;

    let mut resources = Vec::with_capacity(anchors.len());
    for anchor in anchors.iter() {
        let href = anchor.attr("href").unwrap_or_default();
        let name = anchor.text();
        match site.url_for(href) {
            Ok(url) => resources.push(Resource::new(url, name)),
            Err(e) => warn!("Skipping '{}': unusable link {:?}: {}", name, href, e),
        }
    }
    Ok(resources)
}
