//! Sequential onboarding workflow
//!
//! Runs the fixed step sequence connect → provision user → authenticate →
//! open session → link account → list accounts, strictly in order, one step
//! at a time. No step is retried here; the only wait-and-requery loop lives
//! in the task poller.
//!
//! Failure is isolated per step rather than aborting the run: a failed step
//! is reported and leaves its output absent, and every later step that needs
//! that output fails fast on the missing value, which is reported the same
//! way. The run therefore always reaches the terminal report exactly once,
//! whatever fails along the way. The one expected alternative outcome is a
//! provisioning failure with the "user already exists" code, which is an
//! informational notice, not a failure.

pub mod constants;

use crate::client::types::{AccessToken, Account, TaskStatus, UserHandle};
use crate::client::{ApiClient, Session};
use crate::config::Config;
use crate::error::OnboardError;
use constants::{
    STEP_AUTHENTICATE, STEP_CONNECT, STEP_LINK_ACCOUNT, STEP_LIST_ACCOUNTS, STEP_OPEN_SESSION,
    STEP_PROVISION_USER, USER_EXISTS_CODE,
};

/// Outcome of a completed workflow run.
///
/// `accounts` is the terminal value: the linked accounts when the final fetch
/// succeeded, absent otherwise. `failed_steps` records every step whose
/// failure was caught and reported, in execution order.
#[derive(Debug, Default)]
pub struct WorkflowReport {
    /// Accounts fetched by the terminal step, when it succeeded
    pub accounts: Option<Vec<Account>>,
    /// Names of steps whose failure was caught and reported
    pub failed_steps: Vec<String>,
    /// Whether provisioning hit the "user already exists" notice
    pub user_already_existed: bool,
}

impl WorkflowReport {
    fn fail(&mut self, step: &str, error: &OnboardError) {
        tracing::error!(step, error = %error, "Step failed, continuing");
        self.failed_steps.push(step.to_string());
    }

    fn escalate(&mut self, step: &str, error: &OnboardError) {
        tracing::error!(
            step,
            error = %error,
            code = error.remote_code(),
            "Step failed with an unexpected error, continuing"
        );
        self.failed_steps.push(step.to_string());
    }
}

/// Execute the onboarding sequence against the configured service.
///
/// Returns the report for the caller to emit; diagnostics for each caught
/// failure have already been logged by the time this returns.
pub async fn run(config: &Config) -> WorkflowReport {
    let mut report = WorkflowReport::default();

    let connection = match connect(config) {
        Ok(client) => Some(client),
        Err(error) => {
            report.fail(STEP_CONNECT, &error);
            None
        }
    };

    match provision_user(connection.as_ref(), config).await {
        Ok(_user) => {}
        Err(error) if error.remote_code() == Some(USER_EXISTS_CODE) => {
            tracing::warn!("User already exists");
            report.user_already_existed = true;
        }
        Err(error) => report.escalate(STEP_PROVISION_USER, &error),
    }

    let token = match authenticate(connection.as_ref(), config).await {
        Ok(token) => Some(token),
        Err(error) => {
            report.fail(STEP_AUTHENTICATE, &error);
            None
        }
    };

    let session = match open_session(&config.api_url, token.as_ref()) {
        Ok(session) => Some(session),
        Err(error) => {
            report.fail(STEP_OPEN_SESSION, &error);
            None
        }
    };

    match link_account(session.as_ref(), config).await {
        Ok(status) => {
            tracing::info!(
                is_erroneous = status.is_erroneous,
                message = %status.message,
                "Account setup task finished"
            );
        }
        Err(error) => report.fail(STEP_LINK_ACCOUNT, &error),
    }

    match list_accounts(session.as_ref()).await {
        Ok(accounts) => {
            tracing::info!(count = accounts.len(), "Fetched linked accounts");
            report.accounts = Some(accounts);
        }
        Err(error) => report.fail(STEP_LIST_ACCOUNTS, &error),
    }

    report
}

fn connect(config: &Config) -> Result<ApiClient, OnboardError> {
    ApiClient::new(
        &config.api_url,
        &config.app.client_id,
        &config.app.client_secret,
    )
}

async fn provision_user(
    connection: Option<&ApiClient>,
    config: &Config,
) -> Result<UserHandle, OnboardError> {
    let connection = connection.ok_or(OnboardError::MissingInput("connection"))?;
    connection
        .create_user(&config.user.name, &config.user.email, &config.user.password)
        .await
}

async fn authenticate(
    connection: Option<&ApiClient>,
    config: &Config,
) -> Result<AccessToken, OnboardError> {
    let connection = connection.ok_or(OnboardError::MissingInput("connection"))?;
    connection
        .credential_login(&config.user.email, &config.user.password)
        .await
}

fn open_session(api_url: &str, token: Option<&AccessToken>) -> Result<Session, OnboardError> {
    let token = token.ok_or(OnboardError::MissingInput("access token"))?;
    Session::new(api_url, &token.access_token)
}

async fn link_account(
    session: Option<&Session>,
    config: &Config,
) -> Result<TaskStatus, OnboardError> {
    let session = session.ok_or(OnboardError::MissingInput("session"))?;
    session.link_account(&config.account, &config.poll).await
}

async fn list_accounts(session: Option<&Session>) -> Result<Vec<Account>, OnboardError> {
    let session = session.ok_or(OnboardError::MissingInput("session"))?;
    session.accounts().await
}
