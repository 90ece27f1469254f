//! Wire types for the aggregation service API
//!
//! Request and response bodies exchanged with the service, separated from the
//! client so the shapes can be tested and reused independently.

use crate::error::RemoteError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Acknowledgement returned when a user is provisioned
#[derive(Debug, Clone, Deserialize)]
pub struct UserHandle {
    /// Recovery password issued by the service for the new user
    #[serde(default)]
    pub recovery_password: Option<String>,
}

/// Bearer token returned by a credential login
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    /// Opaque bearer token, consumed once to open a session
    pub access_token: String,
    /// Token type reported by the service ("Bearer")
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the token expires
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Handle to a long-running server-side task
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    /// Opaque token identifying the task in status queries
    pub task_token: String,
}

/// Snapshot of a task's progress.
///
/// Re-fetched on every poll; a task moves monotonically from not-ended to
/// ended and never reverts.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    /// Terminal flag
    pub is_ended: bool,
    /// Whether the task ended in an error
    #[serde(default)]
    pub is_erroneous: bool,
    /// Whether the task is blocked waiting for a PIN
    #[serde(default)]
    pub is_waiting_for_pin: bool,
    /// Progress message from the service
    #[serde(default)]
    pub message: String,
}

/// A linked bank account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Service-assigned account identifier
    pub account_id: String,
    /// Account display name
    #[serde(default)]
    pub name: String,
    /// Bank code of the holding institution
    #[serde(default)]
    pub bank_code: Option<String>,
    /// IBAN, when the bank reports one
    #[serde(default)]
    pub iban: Option<String>,
    /// Account currency
    #[serde(default)]
    pub currency: Option<String>,
    /// Current balance as reported by the bank
    #[serde(default)]
    pub balance: Option<f64>,
}

/// A booked transaction on a linked account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Service-assigned transaction identifier
    pub transaction_id: String,
    /// Account the transaction belongs to
    #[serde(default)]
    pub account_id: Option<String>,
    /// Signed amount in the account currency
    pub amount: f64,
    /// Transaction currency
    #[serde(default)]
    pub currency: Option<String>,
    /// Purpose / reference text
    #[serde(default)]
    pub purpose: Option<String>,
    /// Booking date reported by the bank
    #[serde(default)]
    pub booking_date: Option<DateTime<Utc>>,
}

/// A standing order on a linked account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingOrder {
    /// Service-assigned standing order identifier
    pub standing_order_id: String,
    /// Account the order is drawn from
    #[serde(default)]
    pub account_id: Option<String>,
    /// Order amount
    pub amount: f64,
    /// Order currency
    #[serde(default)]
    pub currency: Option<String>,
    /// Purpose / reference text
    #[serde(default)]
    pub purpose: Option<String>,
    /// Execution interval (e.g. "monthly")
    #[serde(default)]
    pub interval: Option<String>,
}

/// Body for `POST /auth/user`
#[derive(Debug, Serialize)]
pub(crate) struct CreateUserRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for `POST /auth/token` (password grant)
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub grant_type: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Body for `POST /rest/accounts`.
///
/// `iban` stays in the body as `null` when absent; the service distinguishes
/// "no IBAN" from an omitted field.
#[derive(Debug, Serialize)]
pub(crate) struct AddAccountRequest<'a> {
    pub country: &'a str,
    pub credentials: &'a [String],
    pub bank_code: &'a str,
    pub iban: Option<&'a str>,
    pub save_pin: bool,
}

/// Body for `POST /task/progress`
#[derive(Debug, Serialize)]
pub(crate) struct TaskProgressRequest<'a> {
    pub id: &'a str,
}

/// Envelope of `GET /rest/accounts`
#[derive(Debug, Deserialize)]
pub(crate) struct AccountsResponse {
    pub accounts: Vec<Account>,
}

/// Envelope of `GET /rest/transactions`
#[derive(Debug, Deserialize)]
pub(crate) struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// Envelope of `GET /rest/standing_orders`
#[derive(Debug, Deserialize)]
pub(crate) struct StandingOrdersResponse {
    pub standing_orders: Vec<StandingOrder>,
}

/// Error envelope wrapping [`RemoteError`] in failure responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: RemoteError,
}
