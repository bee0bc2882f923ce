use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartFetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid site: {0}")]
    InvalidSite(String),

    #[error("Login form not found at {0}")]
    LoginFormMissing(String),

    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    #[error("Unusable file name for {0}")]
    UnsafeName(String),
}

impl CartFetchError {
    pub fn selector(msg: impl Into<String>) -> Self {
        Self::Selector(msg.into())
    }

    pub fn invalid_site(name: impl Into<String>) -> Self {
        Self::InvalidSite(name.into())
    }

    pub fn login_form_missing(url: impl Into<String>) -> Self {
        Self::LoginFormMissing(url.into())
    }

    pub fn auth_rejected(notice: impl Into<String>) -> Self {
        Self::AuthRejected(notice.into())
    }

    pub fn unsafe_name(what: impl Into<String>) -> Self {
        Self::UnsafeName(what.into())
    }
}

pub type Result<T> = std::result::Result<T, CartFetchError>;
