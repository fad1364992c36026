#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Query string or payload could not be parsed, or a required parameter is missing.
    #[error("Malformed SSO input: {0}")]
    MalformedInput(String),
    /// The `sig` parameter does not authenticate the `sso` payload.
    #[error("Bad signature for SSO payload")]
    BadSignature,
    /// The payload carried no nonce, or the nonce store refused it.
    #[error("SSO nonce rejected")]
    NonceRejected,
    #[error("SSO configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error means the sign-in attempt must be rejected.
    ///
    /// Callers should answer every rejection with the same generic response
    /// and keep the variant for their own logs.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput(_) | Self::BadSignature | Self::NonceRejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(Error::BadSignature.is_rejection());
        assert!(Error::MalformedInput("missing sso".into()).is_rejection());
        assert!(Error::NonceRejected.is_rejection());
        assert!(!Error::Config("SSO_SECRET is required".into()).is_rejection());
    }

    #[test]
    fn test_bad_signature_message_is_generic() {
        assert_eq!(Error::BadSignature.to_string(), "Bad signature for SSO payload");
    }
}
