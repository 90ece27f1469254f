//! HTTP client for the account aggregation service
//!
//! Thin async wrappers over the service's REST endpoints. Each wrapper issues
//! exactly one request and settles exactly once: with the parsed response on
//! success, or with a [`RemoteError`] decoded from the service's error
//! envelope on failure. No retries and no local validation beyond what the
//! service performs; a request that never completes is bounded only by the
//! HTTP client's own transport behavior.
//!
//! [`ApiClient`] carries the application identity (basic auth) and covers the
//! pre-login endpoints; [`Session`] carries a user's bearer token and covers
//! everything after login.

pub mod poller;
pub mod types;

use crate::config::{AccountConfig, PollConfig};
use crate::error::{OnboardError, RemoteError};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use types::{
    AccessToken, Account, AccountsResponse, AddAccountRequest, CreateUserRequest, ErrorEnvelope,
    StandingOrder, StandingOrdersResponse, Task, TaskProgressRequest, TaskStatus, TokenRequest,
    Transaction, TransactionsResponse, UserHandle,
};

/// Connection to the aggregation service, authorized as the application.
///
/// Construction is synchronous and validates the base URL; no request is made
/// until one of the operations is called.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl ApiClient {
    /// Create a connection from the application's client id and secret.
    pub fn new(base_url: &str, client_id: &str, client_secret: &str) -> Result<Self, OnboardError> {
        let base_url = normalize_base_url(base_url)
            .map_err(|e| OnboardError::Connection(format!("invalid API base URL: {}", e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.client_id, Some(&self.client_secret))
    }

    /// Provision a user on the service.
    ///
    /// Code `1001` in the resulting [`RemoteError`] means the user already
    /// exists; interpreting that code is the caller's business.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserHandle, OnboardError> {
        tracing::debug!(email = %email, "Provisioning user");

        let body = CreateUserRequest {
            name,
            email,
            password,
        };
        let response = send(self.request(Method::POST, "/auth/user").json(&body)).await?;
        decode(response).await
    }

    /// Exchange user credentials for an access token.
    pub async fn credential_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccessToken, OnboardError> {
        tracing::debug!(email = %email, "Logging in with credentials");

        let body = TokenRequest {
            grant_type: "password",
            username: email,
            password,
        };
        let response = send(self.request(Method::POST, "/auth/token").json(&body)).await?;
        decode(response).await
    }
}

/// Session scoped to an authenticated user.
///
/// All per-user operations go through this handle; it owns the bearer token
/// for the remainder of the run.
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl Session {
    /// Open a session from an access token.
    ///
    /// Construction is synchronous; it fails on an empty token or an
    /// unparseable base URL, before any request is made.
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, OnboardError> {
        if access_token.is_empty() {
            return Err(OnboardError::Session("access token is empty".to_string()));
        }
        let base_url = normalize_base_url(base_url)
            .map_err(|e| OnboardError::Session(format!("invalid API base URL: {}", e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            access_token: access_token.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
    }

    /// Start linking a bank account and return the handle of the resulting
    /// long-running task.
    pub async fn add_account(
        &self,
        country: &str,
        credentials: &[String],
        bank_code: &str,
        iban: Option<&str>,
        save_pin: bool,
    ) -> Result<Task, OnboardError> {
        tracing::debug!(country = %country, bank_code = %bank_code, "Submitting account setup");

        let body = AddAccountRequest {
            country,
            credentials,
            bank_code,
            iban,
            save_pin,
        };
        let response = send(self.request(Method::POST, "/rest/accounts").json(&body)).await?;
        decode(response).await
    }

    /// Query the current state of a long-running task.
    pub async fn task_state(&self, task: &Task) -> Result<TaskStatus, OnboardError> {
        let body = TaskProgressRequest {
            id: &task.task_token,
        };
        let response = send(self.request(Method::POST, "/task/progress").json(&body)).await?;
        decode(response).await
    }

    /// Link a bank account end to end: submit the setup request, then drive
    /// the resulting task to its terminal status via the poller.
    pub async fn link_account(
        &self,
        account: &AccountConfig,
        poll: &PollConfig,
    ) -> Result<TaskStatus, OnboardError> {
        let task = self
            .add_account(
                &account.country,
                &account.credentials,
                &account.bank_code,
                account.iban.as_deref(),
                account.save_pin,
            )
            .await?;

        poller::poll_task(self, &task, poll).await
    }

    /// Fetch all linked accounts.
    pub async fn accounts(&self) -> Result<Vec<Account>, OnboardError> {
        let response = send(self.request(Method::GET, "/rest/accounts")).await?;
        let envelope: AccountsResponse = decode(response).await?;
        Ok(envelope.accounts)
    }

    /// Fetch booked transactions, optionally only those after the `since`
    /// cursor.
    pub async fn transactions(&self, since: Option<&str>) -> Result<Vec<Transaction>, OnboardError> {
        let mut request = self.request(Method::GET, "/rest/transactions");
        if let Some(since) = since {
            request = request.query(&[("since", since)]);
        }
        let response = send(request).await?;
        let envelope: TransactionsResponse = decode(response).await?;
        Ok(envelope.transactions)
    }

    /// Fetch standing orders, optionally with their account details expanded.
    pub async fn standing_orders(
        &self,
        include_accounts: bool,
    ) -> Result<Vec<StandingOrder>, OnboardError> {
        let mut request = self.request(Method::GET, "/rest/standing_orders");
        if include_accounts {
            request = request.query(&[("accounts", "true")]);
        }
        let response = send(request).await?;
        let envelope: StandingOrdersResponse = decode(response).await?;
        Ok(envelope.standing_orders)
    }

    /// Remove the authenticated user from the service.
    pub async fn remove_user(&self) -> Result<(), OnboardError> {
        let response = send(self.request(Method::DELETE, "/rest/user")).await?;
        decode_empty(response).await
    }
}

/// Validate a base URL and strip its trailing slash so paths can be appended.
fn normalize_base_url(base_url: &str) -> Result<String, String> {
    let parsed = reqwest::Url::parse(base_url).map_err(|e| e.to_string())?;
    if !parsed.has_host() {
        return Err("URL has no host".to_string());
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Issue a request, folding transport failures into the service error shape.
async fn send(request: RequestBuilder) -> Result<reqwest::Response, OnboardError> {
    request.send().await.map_err(|e| {
        RemoteError {
            code: 0,
            message: format!("request failed: {}", e),
        }
        .into()
    })
}

/// Decode a response body, or the service's error envelope on non-2xx.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, OnboardError> {
    let status = response.status();
    if !status.is_success() {
        return Err(decode_error(status, response).await.into());
    }

    response.json::<T>().await.map_err(|e| {
        RemoteError {
            code: 0,
            message: format!("malformed response body: {}", e),
        }
        .into()
    })
}

/// Like [`decode`], for endpoints whose success response carries no body.
async fn decode_empty(response: reqwest::Response) -> Result<(), OnboardError> {
    let status = response.status();
    if !status.is_success() {
        return Err(decode_error(status, response).await.into());
    }
    Ok(())
}

async fn decode_error(status: StatusCode, response: reqwest::Response) -> RemoteError {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error,
        Err(_) => RemoteError {
            code: 0,
            message: format!("HTTP {}: {}", status.as_u16(), body),
        },
    }
}
