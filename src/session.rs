use crate::config::{Credentials, SiteConfig};
use crate::error::{CartFetchError, Result};
use crate::html::Page;
use crate::models::Site;
use crate::utils::HttpClient;
use tracing::{debug, info, warn};

/// Subscriber landing page; holds the login form when signed out.
pub const HOME_PATH: &str = "/subscriber/content";
const LOGIN_FORM: &str = ".cart-form";
const LOGIN_NOTICE: &str = "#cart-body > .notice";

/// An authenticated session. Only [`Session::login`] creates one, so holding
/// a `Session` means the catalog document is the signed-in landing page.
#[derive(Debug)]
pub struct Session {
    site: Site,
    client: HttpClient,
    catalog: Page,
}

impl Session {
    pub async fn login(site: Site, credentials: &Credentials, config: &SiteConfig) -> Result<Self> {
        let client = HttpClient::new(config)?;

        let action = login_action(&client, &site).await?;
        info!("🔐 Signing in to {} as '{}'", site.base(), credentials.username);

        let reply = client
            .post_form(
                &action,
                &[
                    ("username", credentials.username.as_str()),
                    ("password", credentials.password.as_str()),
                ],
            )
            .await?;

        // Checked before the status, which may be 4xx on a bad password.
        if let Some(notice) = login_notice(&reply.page)? {
            warn!("Login rejected: {}", notice);
            return Err(CartFetchError::auth_rejected(notice));
        }
        let page = reply.into_page()?;

        info!("✅ Signed in to {}", site.name());
        Ok(Self {
            site,
            client,
            catalog: page,
        })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// The page the login POST landed on, which lists the purchased episodes.
    pub fn catalog(&self) -> &Page {
        &self.catalog
    }
}

/// Look up where the login form posts to instead of assuming a fixed path.
async fn login_action(client: &HttpClient, site: &Site) -> Result<url::Url> {
    let home = site.url_for(HOME_PATH)?;
    let page = client.get_page(&home).await?;

    let action = page
        .find(LOGIN_FORM)?
        .attr("action")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CartFetchError::login_form_missing(home.as_str()))?;

    let url = site.url_for(&action)?;
    debug!("Login form posts to {}", url);
    Ok(url)
}

/// Text of the inline error notice, if the page shows a non-blank one.
fn login_notice(page: &Page) -> Result<Option<String>> {
    let notice = page.find(LOGIN_NOTICE)?;
    if notice.is_empty() {
        return Ok(None);
    }
    let html = notice.inner_html().unwrap_or_default();
    if html.trim().is_empty() {
        return Ok(None);
    }

    let text = notice.text();
    Ok(Some(if text.is_empty() { html.trim().to_string() } else { text }))
}
