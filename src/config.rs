use std::sync::OnceLock;

use url::Url;

use crate::error::Error;

static DEFAULT_CONFIG: OnceLock<SsoConfig> = OnceLock::new();

/// Shared secret and consumer callback URL for one SSO exchange.
///
/// Required fields are constructor parameters, validated once here so a
/// codec never discovers a missing secret mid-request.
///
/// ```rust,ignore
/// use sso_exchange::SsoConfig;
///
/// let config = SsoConfig::new("shared-secret", "https://forum.example.com/session/sso_login".parse()?)?;
/// ```
#[derive(Clone)]
pub struct SsoConfig {
    pub(crate) secret: String,
    pub(crate) sso_url: Url,
}

impl SsoConfig {
    /// Create a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `secret` is empty.
    pub fn new(secret: impl Into<String>, sso_url: Url) -> Result<Self, Error> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::Config("SSO secret must not be empty".into()));
        }
        Ok(Self { secret, sso_url })
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `SSO_SECRET`: shared HMAC signing secret
    /// - `SSO_URL`: consumer callback URL (must be a valid URL)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is missing, the secret is empty,
    /// or the URL does not parse.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let secret =
            lookup("SSO_SECRET").ok_or_else(|| Error::Config("SSO_SECRET is required".into()))?;
        let url_str =
            lookup("SSO_URL").ok_or_else(|| Error::Config("SSO_URL is required".into()))?;
        let sso_url: Url = url_str
            .parse()
            .map_err(|e| Error::Config(format!("SSO_URL: {e}")))?;
        Self::new(secret, sso_url)
    }

    /// Override the consumer callback URL.
    #[must_use]
    pub fn with_sso_url(mut self, url: Url) -> Self {
        self.sso_url = url;
        self
    }

    /// Consumer callback URL.
    #[must_use]
    pub fn sso_url(&self) -> &Url {
        &self.sso_url
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    /// Install the process-wide default used by [`SsoCodec::from_default`](crate::SsoCodec::from_default).
    ///
    /// Call once at startup. The default cannot be replaced afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a default is already installed.
    pub fn install_default(config: SsoConfig) -> Result<(), Error> {
        DEFAULT_CONFIG
            .set(config)
            .map_err(|_| Error::Config("default SSO config already installed".into()))?;
        tracing::debug!("Installed process-wide SSO config");
        Ok(())
    }

    /// The process-wide default, if one was installed.
    #[must_use]
    pub fn default_config() -> Option<&'static SsoConfig> {
        DEFAULT_CONFIG.get()
    }
}

// Manual Debug: never print the secret.
impl std::fmt::Debug for SsoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoConfig")
            .field("secret", &"<redacted>")
            .field("sso_url", &self.sso_url.as_str())
            .finish()
    }
}
