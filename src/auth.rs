//! Credentials and the static headers derived from them.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret as _, SecretString};

use crate::Result;
use crate::error::Error;

pub const KEY_ID_HEADER: HeaderName = HeaderName::from_static("apca-api-key-id");
pub const SECRET_KEY_HEADER: HeaderName = HeaderName::from_static("apca-api-secret-key");

/// The two mutually exclusive ways of authenticating against the API.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum Credentials {
    /// API key id and secret, sent as `APCA-API-KEY-ID` / `APCA-API-SECRET-KEY`.
    KeyPair {
        key_id: String,
        secret_key: SecretString,
    },
    /// OAuth token, sent as `Authorization: Bearer <token>`.
    OAuth { token: SecretString },
}

impl Credentials {
    #[must_use]
    pub fn key_pair<K: Into<String>>(key_id: K, secret_key: SecretString) -> Self {
        Self::KeyPair {
            key_id: key_id.into(),
            secret_key,
        }
    }

    #[must_use]
    pub fn oauth(token: SecretString) -> Self {
        Self::OAuth { token }
    }

    /// Resolves the credential mode from optional config values.
    ///
    /// Exactly one mode must be configured: a complete key pair or an OAuth token.
    pub fn resolve(
        key_id: Option<String>,
        secret_key: Option<SecretString>,
        oauth: Option<SecretString>,
    ) -> Result<Self> {
        let key_id = key_id.filter(|k| !k.trim().is_empty());
        let secret_key = secret_key.filter(|s| !s.expose_secret().trim().is_empty());
        let oauth = oauth.filter(|t| !t.expose_secret().trim().is_empty());

        match (key_id, secret_key, oauth) {
            (None, None, Some(token)) => Ok(Self::oauth(token)),
            (Some(key_id), Some(secret_key), None) => Ok(Self::key_pair(key_id, secret_key)),
            (None, None, None) => Err(Error::validation(
                "missing credentials: provide key_id and secret_key, or an oauth token",
            )),
            (_, _, Some(_)) => Err(Error::validation(
                "key_id/secret_key and oauth are mutually exclusive",
            )),
            (Some(_), None, None) => Err(Error::validation("key_id requires a secret_key")),
            (None, Some(_), None) => Err(Error::validation("secret_key requires a key_id")),
        }
    }

    /// Key id used for the secondary data provider, if any.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        match self {
            Credentials::KeyPair { key_id, .. } => Some(key_id),
            Credentials::OAuth { .. } => None,
        }
    }

    pub(crate) fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        match self {
            Credentials::KeyPair { key_id, secret_key } => {
                headers.insert(KEY_ID_HEADER, HeaderValue::from_str(key_id)?);
                let mut secret = HeaderValue::from_str(secret_key.expose_secret())?;
                secret.set_sensitive(true);
                headers.insert(SECRET_KEY_HEADER, secret);
            }
            Credentials::OAuth { token } => {
                let mut bearer =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
                bearer.set_sensitive(true);
                headers.insert(AUTHORIZATION, bearer);
            }
        }

        Ok(headers)
    }
}
