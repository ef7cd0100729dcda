//! HTTPS client for the log service's REST API
//!
//! Every call is a single blocking request against a fixed base URL. There is
//! no retry or backoff: transport failures and non-2xx answers are handed to
//! the caller unchanged.
//!
//! # Authentication
//!
//! - Basic credentials (`username` + `password`), or
//! - an API token sent in the `X-Papertrail-Token` header.
//!
//! Construction fails if neither is configured.

mod error;
pub mod models;
mod resolve;

pub use error::ApiError;
pub use models::{Event, EventId, JsonDecoder, PageResult, ResourceItem};
pub use resolve::find_id_in;

use crate::config::Config;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Header carrying the API token
const TOKEN_HEADER: &str = "X-Papertrail-Token";

/// Credentials for the API
#[derive(Clone, PartialEq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Token(String),
}

// Secrets never end up in debug logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => write!(f, "Basic({}, ***)", username),
            Self::Token(_) => write!(f, "Token(***)"),
        }
    }
}

impl Credentials {
    /// Pick credentials from the configured values.
    ///
    /// Basic credentials win when both a complete username/password pair and a
    /// token are present.
    pub fn from_parts(
        username: Option<&str>,
        password: Option<&str>,
        token: Option<&str>,
    ) -> Result<Self, ApiError> {
        match (username, password, token) {
            (Some(username), Some(password), _) => Ok(Self::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }),
            (_, _, Some(token)) if !token.is_empty() => Ok(Self::Token(token.to_string())),
            _ => Err(ApiError::Configuration(
                "Must provide a username and password or a token".to_string(),
            )),
        }
    }
}

/// Settings needed to build a [`Client`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub credentials: Credentials,
    /// CA bundle to trust in addition to the platform store, if present on disk
    pub ca_file: Option<PathBuf>,
    pub verify_ssl: bool,
    pub timeout: Duration,
    pub decoder: JsonDecoder,
}

impl ClientSettings {
    /// Build client settings from the effective configuration
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let credentials = Credentials::from_parts(
            config.username.as_deref(),
            config.password.as_deref(),
            config.token.as_deref(),
        )?;

        Ok(Self {
            base_url: config.api_url.clone(),
            credentials,
            ca_file: config.ca_file.clone(),
            verify_ssl: config.verify_ssl,
            timeout: Duration::from_secs(config.timeout_secs),
            decoder: JsonDecoder::default(),
        })
    }
}

/// Listing endpoints, resolved from the command that asked for them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Systems,
    Groups,
    Searches,
}

impl ListingKind {
    /// Collection endpoint, relative to the API base
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Systems => "systems.json",
            Self::Groups => "groups.json",
            Self::Searches => "searches.json",
        }
    }

    /// Singular noun used in error messages
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Systems => "System",
            Self::Groups => "Group",
            Self::Searches => "Search",
        }
    }
}

/// Authenticated, blocking API client
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
    credentials: Credentials,
    decoder: JsonDecoder,
}

impl Client {
    /// Create a new API client
    ///
    /// # Errors
    /// Returns `ApiError::Configuration` if the CA bundle can't be read or the
    /// HTTP client can't be built.
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("ptrail/", env!("CARGO_PKG_VERSION")));

        if let Some(path) = settings.ca_file.as_deref().filter(|p| p.is_file()) {
            for cert in load_ca_bundle(path)? {
                builder = builder.add_root_certificate(cert);
            }
            tracing::debug!("Trusting CA bundle {}", path.display());
        }

        if !settings.verify_ssl {
            tracing::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|e| {
            ApiError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        tracing::debug!(
            "Initialized API client: {} (auth: {:?})",
            settings.base_url,
            settings.credentials
        );

        Ok(Self {
            http,
            base_url: settings.base_url,
            credentials: settings.credentials,
            decoder: settings.decoder,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorize(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.credentials {
            Credentials::Basic { username, password } => req.basic_auth(username, Some(password)),
            Credentials::Token(token) => req.header(TOKEN_HEADER, token),
        }
    }

    /// Send a request and return the raw body of a 2xx response
    fn send(&self, req: reqwest::blocking::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = self.authorize(req).send()?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes()?.to_vec())
    }

    /// `GET` a JSON endpoint. Parameters with `None` values are omitted.
    pub fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<T, ApiError> {
        let query: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
            .collect();
        tracing::debug!("GET {} {:?}", path, query);

        let body = self.send(self.http.get(self.url(path)).query(&query))?;
        self.decoder.decode(&body)
    }

    /// `POST` a JSON body to an endpoint
    pub fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ApiError> {
        tracing::debug!("POST {}", path);
        let body = self.send(self.http.post(self.url(path)).json(payload))?;
        self.decoder.decode(&body)
    }

    /// `DELETE` a resource. The response body is ignored.
    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        tracing::debug!("DELETE {}", path);
        self.send(self.http.delete(self.url(path)))?;
        Ok(())
    }

    /// Raw listing body, exactly as the service sent it
    pub fn list(&self, kind: ListingKind) -> Result<serde_json::Value, ApiError> {
        self.get(kind.endpoint(), &[])
    }

    /// Typed listing
    pub fn list_items(&self, kind: ListingKind) -> Result<Vec<ResourceItem>, ApiError> {
        self.get(kind.endpoint(), &[])
    }

    /// Resolve a human-readable name against a collection (see [`find_id_in`])
    pub fn find_id(&self, kind: ListingKind, name: &str) -> Result<Option<u64>, ApiError> {
        let items = self.list_items(kind)?;
        Ok(find_id_in(&items, name))
    }

    /// Like [`Client::find_id`], but a miss is an error
    pub fn resolve_id(&self, kind: ListingKind, name: &str) -> Result<u64, ApiError> {
        self.find_id(kind, name)?.ok_or_else(|| ApiError::NotFound {
            kind: kind.noun(),
            name: name.to_string(),
        })
    }

    /// Fetch a group's details, or `None` if no group resolves from `name`
    pub fn show_group(&self, name: &str) -> Result<Option<serde_json::Value>, ApiError> {
        match self.find_id(ListingKind::Groups, name)? {
            Some(id) => self.get(&format!("groups/{}.json", id), &[]).map(Some),
            None => Ok(None),
        }
    }

    /// Create a group, optionally matching systems by wildcard
    pub fn create_group(
        &self,
        name: &str,
        system_wildcard: Option<&str>,
    ) -> Result<serde_json::Value, ApiError> {
        self.post(ListingKind::Groups.endpoint(), &group_payload(name, system_wildcard))
    }

    /// Remove a system. Returns `false` if no system resolves from `name`.
    pub fn remove_system(&self, name: &str) -> Result<bool, ApiError> {
        match self.find_id(ListingKind::Systems, name)? {
            Some(id) => {
                self.delete(&format!("systems/{}.json", id))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Body for `POST /groups.json`
fn group_payload(name: &str, system_wildcard: Option<&str>) -> serde_json::Value {
    let mut group = serde_json::json!({ "name": name });
    if let Some(wildcard) = system_wildcard {
        group["system_wildcard"] = serde_json::Value::from(wildcard);
    }
    serde_json::json!({ "group": group })
}

fn load_ca_bundle(path: &Path) -> Result<Vec<reqwest::Certificate>, ApiError> {
    let pem = std::fs::read(path).map_err(|e| {
        ApiError::Configuration(format!("Cannot read CA bundle {}: {}", path.display(), e))
    })?;
    reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
        ApiError::Configuration(format!("Invalid CA bundle {}: {}", path.display(), e))
    })
}
