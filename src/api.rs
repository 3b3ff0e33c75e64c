// API client module: a small blocking HTTP client for the Compose API.
// Two calls only: look up the account behind a token, then ask for a new
// deployment on that account. Nothing is cached and nothing is retried.

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Region every deployment is created in.
pub const DATACENTER: &str = "aws:us-east-1";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("token cannot be sent in an authorization header")]
    InvalidToken(#[source] InvalidHeaderValue),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response body from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// Opaque account identifier returned by the identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body of `GET /user`; only the id matters here.
#[derive(Deserialize, Debug)]
pub struct UserResponse {
    pub id: AccountId,
}

/// Fields of a new deployment. Sent wrapped in `{"deployment": ...}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DeploymentRequest {
    pub account_id: AccountId,
    pub datacenter: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl DeploymentRequest {
    pub fn new(account_id: AccountId, kind: &str, name: &str) -> Self {
        Self {
            account_id,
            datacenter: DATACENTER.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }
}

#[derive(Serialize)]
struct DeploymentEnvelope<'a> {
    deployment: &'a DeploymentRequest,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectionStrings {
    pub cli: Vec<String>,
    pub direct: Vec<String>,
}

/// Interesting part of the `POST /deployments` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeploymentResult {
    #[serde(default)]
    pub id: Option<String>,
    pub ca_certificate_base64: String,
    pub connection_strings: ConnectionStrings,
}

impl DeploymentResult {
    pub fn cli(&self) -> &str {
        self.connection_strings.cli.first().map_or("", String::as_str)
    }

    pub fn direct(&self) -> &str {
        self.connection_strings.direct.first().map_or("", String::as_str)
    }

    fn check(&self) -> Result<(), String> {
        if self.connection_strings.cli.is_empty() {
            return Err("connection_strings.cli is empty".into());
        }
        if self.connection_strings.direct.is_empty() {
            return Err("connection_strings.direct is empty".into());
        }
        Ok(())
    }
}

/// The two remote operations the deploy flow needs.
pub trait DeploymentApi {
    fn fetch_account_id(&self, token: &str) -> Result<AccountId, ApiError>;

    /// Needs the `AccountId` from a prior `fetch_account_id` call.
    fn create_deployment(
        &self,
        token: &str,
        account_id: &AccountId,
        kind: &str,
        name: &str,
    ) -> Result<DeploymentResult, ApiError>;
}

/// Blocking client bound to one API base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (for example
    /// `https://api.compose.io/2016-07`). Requests have no timeout.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("pronto/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .map_err(ApiError::Client)?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(token: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let mut value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(ApiError::InvalidToken)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }

    fn read_json<T: DeserializeOwned>(url: &str, res: Response) -> Result<T, ApiError> {
        let status = res.status();
        let body = res.text().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl DeploymentApi for ApiClient {
    fn fetch_account_id(&self, token: &str) -> Result<AccountId, ApiError> {
        let url = format!("{}/user", self.base_url);
        debug!(%url, "looking up account");
        let res = self
            .client
            .get(&url)
            .headers(Self::auth_headers(token)?)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        let user: UserResponse = Self::read_json(&url, res)?;
        Ok(user.id)
    }

    fn create_deployment(
        &self,
        token: &str,
        account_id: &AccountId,
        kind: &str,
        name: &str,
    ) -> Result<DeploymentResult, ApiError> {
        let request = DeploymentRequest::new(account_id.clone(), kind, name);
        let url = format!("{}/deployments", self.base_url);
        debug!(%url, name = %request.name, kind = %request.kind, "creating deployment");
        let res = self
            .client
            .post(&url)
            .headers(Self::auth_headers(token)?)
            .json(&DeploymentEnvelope {
                deployment: &request,
            })
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        let result: DeploymentResult = Self::read_json(&url, res)?;
        result
            .check()
            .map_err(|reason| ApiError::Malformed { url, reason })?;
        Ok(result)
    }
}
