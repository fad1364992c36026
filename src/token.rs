use serde::{Deserialize, Serialize};

/// Claim keys carried in an SSO payload.
///
/// Closed table: decoding only ever writes the fields listed here, so an
/// attacker-controlled key cannot reach anything else on [`SsoToken`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimField {
    Nonce,
    Name,
    Username,
    Email,
    AboutMe,
    ExternalEmail,
    ExternalUsername,
    ExternalName,
    ExternalId,
}

impl ClaimField {
    /// All claims in wire order.
    pub const ALL: [ClaimField; 9] = [
        Self::Nonce,
        Self::Name,
        Self::Username,
        Self::Email,
        Self::AboutMe,
        Self::ExternalEmail,
        Self::ExternalUsername,
        Self::ExternalName,
        Self::ExternalId,
    ];

    /// Wire key for this claim.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Nonce => "nonce",
            Self::Name => "name",
            Self::Username => "username",
            Self::Email => "email",
            Self::AboutMe => "about_me",
            Self::ExternalEmail => "external_email",
            Self::ExternalUsername => "external_username",
            Self::ExternalName => "external_name",
            Self::ExternalId => "external_id",
        }
    }

    /// Looks up a claim by wire key. Unknown keys return `None`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Identity claims exchanged in one SSO round.
///
/// Every claim is optional at the protocol level; callers decide which
/// ones their trust model requires. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SsoToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl SsoToken {
    /// Create an empty token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_nonce(self, nonce: impl Into<String>) -> Self {
        self.with(ClaimField::Nonce, nonce)
    }

    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with(ClaimField::Name, name)
    }

    #[must_use]
    pub fn with_username(self, username: impl Into<String>) -> Self {
        self.with(ClaimField::Username, username)
    }

    #[must_use]
    pub fn with_email(self, email: impl Into<String>) -> Self {
        self.with(ClaimField::Email, email)
    }

    #[must_use]
    pub fn with_about_me(self, about_me: impl Into<String>) -> Self {
        self.with(ClaimField::AboutMe, about_me)
    }

    #[must_use]
    pub fn with_external_email(self, email: impl Into<String>) -> Self {
        self.with(ClaimField::ExternalEmail, email)
    }

    #[must_use]
    pub fn with_external_username(self, username: impl Into<String>) -> Self {
        self.with(ClaimField::ExternalUsername, username)
    }

    #[must_use]
    pub fn with_external_name(self, name: impl Into<String>) -> Self {
        self.with(ClaimField::ExternalName, name)
    }

    #[must_use]
    pub fn with_external_id(self, id: impl Into<String>) -> Self {
        self.with(ClaimField::ExternalId, id)
    }

    /// Set a claim by table entry.
    #[must_use]
    pub fn with(mut self, field: ClaimField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a claim. An empty value clears it.
    pub fn set(&mut self, field: ClaimField, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(field) = (!value.is_empty()).then_some(value);
    }

    /// Get a claim if present and non-empty.
    #[must_use]
    pub fn get(&self, field: ClaimField) -> Option<&str> {
        self.slot(field).as_deref().filter(|v| !v.is_empty())
    }

    /// Present claims in wire order.
    pub fn claims(&self) -> impl Iterator<Item = (ClaimField, &str)> {
        ClaimField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field, value)))
    }

    /// True when no claim is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims().next().is_none()
    }

    fn slot(&self, field: ClaimField) -> &Option<String> {
        match field {
            ClaimField::Nonce => &self.nonce,
            ClaimField::Name => &self.name,
            ClaimField::Username => &self.username,
            ClaimField::Email => &self.email,
            ClaimField::AboutMe => &self.about_me,
            ClaimField::ExternalEmail => &self.external_email,
            ClaimField::ExternalUsername => &self.external_username,
            ClaimField::ExternalName => &self.external_name,
            ClaimField::ExternalId => &self.external_id,
        }
    }

    fn slot_mut(&mut self, field: ClaimField) -> &mut Option<String> {
        match field {
            ClaimField::Nonce => &mut self.nonce,
            ClaimField::Name => &mut self.name,
            ClaimField::Username => &mut self.username,
            ClaimField::Email => &mut self.email,
            ClaimField::AboutMe => &mut self.about_me,
            ClaimField::ExternalEmail => &mut self.external_email,
            ClaimField::ExternalUsername => &mut self.external_username,
            ClaimField::ExternalName => &mut self.external_name,
            ClaimField::ExternalId => &mut self.external_id,
        }
    }
}
