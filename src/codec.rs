//! Signed SSO payload codec.
//!
//! Wire format, carried as two query parameters:
//!
//! ```text
//! sso = base64(form_urlencoded(claims))
//! sig = hex(HMAC-SHA256(secret, sso))
//! ```
//!
//! The signature covers the base64 text exactly as transmitted, so the
//! payload is never decoded before it has been authenticated.

use base64::Engine;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use url::form_urlencoded;

use crate::config::SsoConfig;
use crate::error::Error;
#[cfg(feature = "nonce")]
use crate::nonce::NonceStore;
use crate::token::{ClaimField, SsoToken};

type HmacSha256 = Hmac<Sha256>;

/// Accepts unpadded payloads as well as padded ones.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encoded claims plus their signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SignedPayload {
    /// Base64 of the form-urlencoded claims (the `sso` parameter).
    pub payload: String,
    /// Lowercase hex HMAC-SHA256 of `payload` (the `sig` parameter).
    pub signature: String,
}

impl SignedPayload {
    /// `sso=<percent-encoded payload>&sig=<signature>`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!(
            "sso={}&sig={}",
            urlencoding::encode(&self.payload),
            self.signature
        )
    }
}

impl std::fmt::Display for SignedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query())
    }
}

/// Serializes present claims as a form-urlencoded string in declared order.
#[must_use]
pub fn unsigned_payload(token: &SsoToken) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (field, value) in token.claims() {
        serializer.append_pair(field.key(), value);
    }
    serializer.finish()
}

/// Computes `hex(HMAC-SHA256(secret, payload))`.
#[must_use]
pub fn sign(secret: &str, payload: &str) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `signature` against `payload` in constant time.
#[must_use]
pub fn verify(secret: &str, payload: &str, signature: &str) -> bool {
    let expected = sign(secret, payload);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// Encodes and signs a token.
#[must_use]
pub fn encode(token: &SsoToken, secret: &str) -> SignedPayload {
    let payload = STANDARD.encode(unsigned_payload(token));
    let signature = sign(secret, &payload);
    SignedPayload { payload, signature }
}

/// Appends the signed `sso`/`sig` parameters to `base_url`.
///
/// Uses `&` as the separator when `base_url` already has a query, `?` otherwise.
#[must_use]
pub fn build_redirect_url(token: &SsoToken, secret: &str, base_url: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{}", encode(token, secret).to_query())
}

/// Verifies and decodes an `sso=...&sig=...` query string.
///
/// A leading `?` is ignored. Claims whose key is not recognized are dropped.
///
/// # Errors
///
/// - [`Error::MalformedInput`] if `sso` or `sig` is missing or repeated, or the
///   authenticated payload is not valid base64.
/// - [`Error::BadSignature`] if `sig` does not match. Checked before the
///   payload is decoded.
pub fn decode(query: &str, secret: &str) -> Result<SsoToken, Error> {
    let (sso, sig) = extract_params(query)?;

    if !verify(secret, &sso, &sig) {
        tracing::warn!("SSO payload signature mismatch");
        return Err(Error::BadSignature);
    }

    // Line-wrapping base64 encoders insert newlines; they are covered by the signature above.
    let compact: Vec<u8> = sso
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let decoded = LENIENT_BASE64.decode(&compact).map_err(|e| {
        tracing::warn!(error = %e, "Signed SSO payload is not valid base64");
        Error::MalformedInput(format!("invalid base64 payload: {e}"))
    })?;

    let mut token = SsoToken::new();
    for (key, value) in form_urlencoded::parse(&decoded) {
        match ClaimField::from_key(&key) {
            // first non-empty occurrence wins
            Some(field) if token.get(field).is_none() => token.set(field, value),
            Some(_) => {}
            None => tracing::debug!(key = %key, "Ignoring unrecognized SSO claim"),
        }
    }

    Ok(token)
}

fn extract_params(query: &str) -> Result<(String, String), Error> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut sso = None;
    let mut sig = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            "sso" => &mut sso,
            "sig" => &mut sig,
            _ => continue,
        };
        if slot.replace(value.into_owned()).is_some() {
            return Err(Error::MalformedInput(format!("duplicate {key} parameter")));
        }
    }

    let sso = sso.ok_or_else(|| Error::MalformedInput("missing sso parameter".into()))?;
    let sig = sig.ok_or_else(|| Error::MalformedInput("missing sig parameter".into()))?;
    Ok((sso, sig))
}

/// SSO codec bound to one configuration.
///
/// Stateless apart from its config; build one per request or share it freely.
///
/// ```rust,ignore
/// use sso_exchange::{SsoCodec, SsoConfig, SsoToken};
///
/// let codec = SsoCodec::new(SsoConfig::from_env()?);
///
/// // Provider side
/// let token = SsoToken::new().with_nonce(nonce).with_email("ada@example.com");
/// let redirect = codec.redirect_url(&token, None);
///
/// // Consumer side
/// let token = codec.decode(request_query)?;
/// ```
#[derive(Debug, Clone)]
pub struct SsoCodec {
    config: SsoConfig,
}

impl SsoCodec {
    #[must_use]
    pub fn new(config: SsoConfig) -> Self {
        Self { config }
    }

    /// Create a codec from the process-wide default config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if [`SsoConfig::install_default`] was never called.
    pub fn from_default() -> Result<Self, Error> {
        SsoConfig::default_config()
            .cloned()
            .map(Self::new)
            .ok_or_else(|| Error::Config("no default SSO config installed".into()))
    }

    #[must_use]
    pub fn config(&self) -> &SsoConfig {
        &self.config
    }

    /// Signs an arbitrary payload with this codec's secret.
    #[must_use]
    pub fn sign(&self, payload: &str) -> String {
        sign(self.config.secret(), payload)
    }

    #[must_use]
    pub fn encode(&self, token: &SsoToken) -> SignedPayload {
        encode(token, self.config.secret())
    }

    /// Redirect URL carrying the signed token.
    ///
    /// Falls back to the configured `sso_url` when `base_url` is `None`.
    #[must_use]
    pub fn redirect_url(&self, token: &SsoToken, base_url: Option<&str>) -> String {
        let base = base_url.unwrap_or_else(|| self.config.sso_url().as_str());
        build_redirect_url(token, self.config.secret(), base)
    }

    /// See [`decode`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] or [`Error::BadSignature`].
    pub fn decode(&self, query: &str) -> Result<SsoToken, Error> {
        decode(query, self.config.secret())
    }

    /// Decodes, then requires a nonce that `store` accepts.
    ///
    /// The store is only consulted once the signature has been verified.
    ///
    /// # Errors
    ///
    /// Everything [`decode`] returns, plus [`Error::NonceRejected`] when the
    /// nonce is missing, refused by the store, or the store fails.
    #[cfg(feature = "nonce")]
    pub fn decode_with_nonce<N: NonceStore + ?Sized>(
        &self,
        query: &str,
        store: &N,
    ) -> Result<SsoToken, Error> {
        let token = self.decode(query)?;

        let Some(nonce) = token.get(ClaimField::Nonce) else {
            tracing::warn!("SSO payload carried no nonce");
            return Err(Error::NonceRejected);
        };

        match store.consume(nonce) {
            Ok(true) => Ok(token),
            Ok(false) => {
                tracing::warn!("SSO nonce unknown, replayed or expired");
                Err(Error::NonceRejected)
            }
            Err(e) => {
                tracing::error!(error = %e, "Nonce store lookup failed");
                Err(Error::NonceRejected)
            }
        }
    }
}
