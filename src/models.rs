use crate::error::{CartFetchError, Result};
use crate::storage::sanitize_filename;
use url::Url;

/// One purchased episode as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub description: String,
    pub detail_url: Url,
}

/// One downloadable attachment of an episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub url: Url,
    pub name: String,
}

/// The storefront a run talks to. Every relative link is resolved against `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    name: String,
    base: Url,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub episodes: usize,
    pub resources: usize,
    pub bytes: u64,
}

impl Episode {
    pub fn new(title: String, description: String, detail_url: Url) -> Self {
        Self {
            title,
            description,
            detail_url,
        }
    }
}

impl Resource {
    pub fn new(url: Url, name: String) -> Self {
        Self { url, name }
    }

    /// Name to store the resource under: the sanitized anchor text, or the
    /// last path segment of the URL when the text is unusable.
    pub fn file_name(&self) -> Result<String> {
        let name = sanitize_filename(&self.name);
        if !name.is_empty() {
            return Ok(name);
        }

        let fallback = self
            .url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(sanitize_filename)
            .unwrap_or_default();

        if fallback.is_empty() {
            Err(CartFetchError::unsafe_name(self.url.as_str()))
        } else {
            Ok(fallback)
        }
    }
}

impl Site {
    /// `https://{name}.{domain}/`
    pub fn new(name: &str, domain: &str) -> Result<Self> {
        Self::validate_name(name)?;
        let base = Url::parse(&format!("https://{}.{}/", name, domain))?;
        Ok(Self {
            name: name.to_string(),
            base,
        })
    }

    /// Site served from an explicit origin instead of the derived subdomain.
    /// Page links are root-relative, so a base with a path is rejected.
    pub fn with_base_url(name: &str, base_url: &str) -> Result<Self> {
        Self::validate_name(name)?;
        let base = Url::parse(base_url)?;
        if base.path() != "/" || base.query().is_some() || base.fragment().is_some() {
            return Err(CartFetchError::invalid_site(base_url));
        }
        Ok(Self {
            name: name.to_string(),
            base,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve a path or link found in a page against the site base.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim())?)
    }

    fn validate_name(name: &str) -> Result<()> {
        let valid = !name.is_empty()
            && !name.starts_with('-')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if valid {
            Ok(())
        } else {
            Err(CartFetchError::invalid_site(name))
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} episodes, {} resources, {} bytes",
            self.episodes, self.resources, self.bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_derives_base_from_subdomain() {
        let site = Site::new("acme", "example-host.com").unwrap();
        assert_eq!(site.base().as_str(), "https://acme.example-host.com/");
        assert_eq!(
            site.url_for("/subscriber/content").unwrap().as_str(),
            "https://acme.example-host.com/subscriber/content"
        );
    }

    #[test]
    fn site_rejects_names_that_change_the_host() {
        for bad in ["", "acme.evil.com", "acme/x", "a b", "-acme", "acme@evil"] {
            assert!(
                matches!(Site::new(bad, "example-host.com"), Err(CartFetchError::InvalidSite(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn explicit_base_must_be_an_origin() {
        for bad in ["http://127.0.0.1:8080/store", "http://127.0.0.1:8080/store/", "http://127.0.0.1:8080/?x=1"] {
            assert!(
                matches!(Site::with_base_url("acme", bad), Err(CartFetchError::InvalidSite(_))),
                "accepted {:?}",
                bad
            );
        }

        let site = Site::with_base_url("acme", "http://127.0.0.1:8080").unwrap();
        assert_eq!(site.base().as_str(), "http://127.0.0.1:8080/");
        assert_eq!(
            site.url_for("/subscriber/download?file_id=1").unwrap().as_str(),
            "http://127.0.0.1:8080/subscriber/download?file_id=1"
        );
    }

    #[test]
    fn absolute_links_are_kept() {
        let site = Site::new("acme", "example-host.com").unwrap();
        let url = site.url_for("https://cdn.example.net/a.mp3").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.net/a.mp3");
    }

    #[test]
    fn resource_file_name_falls_back_to_url_segment() {
        let url = Url::parse("https://acme.example-host.com/files/notes.pdf").unwrap();

        let named = Resource::new(url.clone(), "Show notes: part 1.pdf".to_string());
        assert_eq!(named.file_name().unwrap(), "Show notes_ part 1.pdf");

        let dotted = Resource::new(url.clone(), "..".to_string());
        assert_eq!(dotted.file_name().unwrap(), "notes.pdf");

        let bare = Resource::new(
            Url::parse("https://acme.example-host.com/").unwrap(),
            "  ".to_string(),
        );
        assert!(matches!(bare.file_name(), Err(CartFetchError::UnsafeName(_))));
    }
}
