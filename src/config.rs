use std::env;

use bon::Builder;
use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::auth::Credentials;
use crate::error::Error;

pub const LIVE_URL: &str = "https://api.alpaca.markets";
pub const PAPER_URL: &str = "https://paper-api.alpaca.markets";
pub const DATA_URL: &str = "https://data.alpaca.markets";
pub const POLYGON_URL: &str = "https://api.polygon.io";
pub const DEFAULT_API_VERSION: &str = "v2";

const ENV_KEY_ID: &str = "APCA_API_KEY_ID";
const ENV_SECRET: &str = "APCA_API_SECRET_KEY";
const ENV_OAUTH: &str = "APCA_API_OAUTH_TOKEN";
const ENV_API: &str = "APCA_API_BASE_URL";
const ENV_DATA: &str = "APCA_API_DATA_URL";
const ENV_POLYGON: &str = "POLYGON_API_BASE_URL";
const ENV_API_VERSION: &str = "APCA_API_VERSION";
const ENV_PAPER: &str = "APCA_PAPER";

/// Client configuration. Everything is optional except a credential mode.
///
/// ```
/// use alpaca_trade_api::Config;
///
/// let config = Config::builder()
///     .key_id("PKTEST")
///     .secret_key("secret".to_owned())
///     .paper(true)
///     .build();
/// assert!(config.paper);
/// ```
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Default)]
pub struct Config {
    /// Trading host. Overrides the live/paper default when set.
    pub base_url: Option<Url>,
    pub data_base_url: Option<Url>,
    pub polygon_base_url: Option<Url>,
    #[builder(into)]
    pub key_id: Option<String>,
    #[builder(into)]
    pub secret_key: Option<SecretString>,
    #[builder(into)]
    pub api_version: Option<String>,
    #[builder(into)]
    pub oauth: Option<SecretString>,
    #[builder(default)]
    pub paper: bool,
}

impl Config {
    /// Reads the configuration from the `APCA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let url = |name: &str| -> Result<Option<Url>> {
            lookup(name)
                .map(|raw| {
                    Url::parse(&raw)
                        .map_err(|e| Error::validation(format!("invalid {name} `{raw}`: {e}")))
                })
                .transpose()
        };
        let paper = match lookup(ENV_PAPER).as_deref().map(str::trim) {
            None | Some("" | "0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(Error::validation(format!(
                    "invalid {ENV_PAPER} `{other}`; expected true|false|1|0"
                )));
            }
        };

        Ok(Self {
            base_url: url(ENV_API)?,
            data_base_url: url(ENV_DATA)?,
            polygon_base_url: url(ENV_POLYGON)?,
            key_id: lookup(ENV_KEY_ID),
            secret_key: lookup(ENV_SECRET).map(SecretString::from),
            api_version: lookup(ENV_API_VERSION),
            oauth: lookup(ENV_OAUTH).map(SecretString::from),
            paper,
        })
    }

    /// Validates the configuration and fills in default hosts.
    pub(crate) fn resolve(self) -> Result<Resolved> {
        let credentials = Credentials::resolve(self.key_id, self.secret_key, self.oauth)?;

        let trading_url = match self.base_url {
            Some(url) => url,
            None if self.paper => Url::parse(PAPER_URL)?,
            None => Url::parse(LIVE_URL)?,
        };
        let data_url = match self.data_base_url {
            Some(url) => url,
            None => Url::parse(DATA_URL)?,
        };
        let polygon_url = match self.polygon_base_url {
            Some(url) => url,
            None => Url::parse(POLYGON_URL)?,
        };

        let api_version = self
            .api_version
            .map(|v| v.trim().trim_matches('/').to_owned())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned());
        if api_version.is_empty() {
            return Err(Error::validation("api_version must not be empty"));
        }

        Ok(Resolved {
            trading_url: base(trading_url)?,
            data_url: base(data_url)?,
            polygon_url: base(polygon_url)?,
            api_version,
            credentials,
        })
    }
}

/// Fully validated settings the client is built from.
#[derive(Clone, Debug)]
pub(crate) struct Resolved {
    pub trading_url: Url,
    pub data_url: Url,
    pub polygon_url: Url,
    pub api_version: String,
    pub credentials: Credentials,
}

/// Ensures `url` can carry path segments and ends with `/`.
fn base(mut url: Url) -> Result<Url> {
    if url.cannot_be_a_base() {
        return Err(Error::validation(format!("`{url}` cannot be used as a base URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::Kind;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn paper_switches_trading_host_only() {
        let resolved = Config::builder()
            .key_id("key")
            .secret_key("secret".to_owned())
            .paper(true)
            .build()
            .resolve()
            .unwrap();

        assert_eq!(resolved.trading_url.as_str(), "https://paper-api.alpaca.markets/");
        assert_eq!(resolved.data_url.as_str(), "https://data.alpaca.markets/");
        assert_eq!(resolved.polygon_url.as_str(), "https://api.polygon.io/");
        assert_eq!(resolved.api_version, "v2");
    }

    #[test]
    fn explicit_base_url_wins_over_paper() {
        let resolved = Config::builder()
            .base_url(Url::parse("http://localhost:8080/proxy").unwrap())
            .oauth("token".to_owned())
            .paper(true)
            .api_version("/v3/")
            .build()
            .resolve()
            .unwrap();

        assert_eq!(resolved.trading_url.as_str(), "http://localhost:8080/proxy/");
        assert_eq!(resolved.api_version, "v3");
    }

    #[test]
    fn missing_credentials_fail() {
        let err = Config::default().resolve().unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn reads_environment() {
        let config = Config::from_lookup(lookup(&[
            ("APCA_API_KEY_ID", "PK123"),
            ("APCA_API_SECRET_KEY", "s3cr3t"),
            ("APCA_API_DATA_URL", "http://127.0.0.1:9000"),
            ("APCA_PAPER", "true"),
        ]))
        .unwrap();

        assert!(config.paper);
        assert_eq!(config.key_id.as_deref(), Some("PK123"));
        assert_eq!(
            config.data_base_url.map(String::from).as_deref(),
            Some("http://127.0.0.1:9000/")
        );
        assert!(config.base_url.is_none());
    }

    #[test]
    fn rejects_bad_environment_values() {
        let err = Config::from_lookup(lookup(&[("APCA_API_BASE_URL", "not a url")])).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);

        let err = Config::from_lookup(lookup(&[("APCA_PAPER", "maybe")])).unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }

    #[test]
    fn rejects_non_base_urls() {
        let err = Config::builder()
            .data_base_url(Url::parse("mailto:ops@example.com").unwrap())
            .oauth("token".to_owned())
            .build()
            .resolve()
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
    }
}
