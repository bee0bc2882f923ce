use crate::config::SiteConfig;
use crate::error::Result;
use crate::html::Page;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("cartfetch/", env!("CARGO_PKG_VERSION"));

/// HTTP client with its own cookie jar. One instance lives for one run, so
/// the cookies set by the login response are sent with every later request.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        let mut builder = Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent);

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// GET a page and parse it.
    pub async fn get_page(&self, url: &Url) -> Result<Page> {
        let response = self.get_raw(url).await?;
        let text = response.text().await?;
        debug!("Fetched {} ({} bytes)", url, text.len());
        Ok(Page::parse(&text))
    }

    /// GET without reading the body. Non-success statuses are errors.
    pub async fn get_raw(&self, url: &Url) -> Result<Response> {
        let response = self.client.get(url.clone()).send().await?;
        Ok(response.error_for_status()?)
    }

    /// POST `fields` as `application/x-www-form-urlencoded` and parse the
    /// page the server ends up on after redirects. The body is parsed even
    /// for an error status; the status error is kept in the reply.
    pub async fn post_form(&self, url: &Url, fields: &[(&str, &str)]) -> Result<FormReply> {
        let response = self.client.post(url.clone()).form(fields).send().await?;
        let status = response.status();
        let failure = response.error_for_status_ref().err();
        let final_url = response.url().clone();
        let text = response.text().await?;
        debug!(
            "Form posted to {}, landed on {} with {} ({} bytes)",
            url,
            final_url,
            status,
            text.len()
        );
        Ok(FormReply {
            page: Page::parse(&text),
            failure,
        })
    }
}

/// Page returned by a form post, plus the status error if there was one.
#[derive(Debug)]
pub struct FormReply {
    pub page: Page,
    failure: Option<reqwest::Error>,
}

impl FormReply {
    /// The page, or the status error when the response was not a success.
    pub fn into_page(self) -> Result<Page> {
        match self.failure {
            Some(e) => Err(e.into()),
            None => Ok(self.page),
        }
    }
}
