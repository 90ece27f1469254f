//! Workflow constants
//!
//! Centralized constants used throughout the workflow module.

/// Service error code meaning the user is already provisioned
pub const USER_EXISTS_CODE: i64 = 1001;

/// Step name: create the application connection
pub const STEP_CONNECT: &str = "connect";

/// Step name: provision the user
pub const STEP_PROVISION_USER: &str = "provision_user";

/// Step name: exchange credentials for an access token
pub const STEP_AUTHENTICATE: &str = "authenticate";

/// Step name: open the user session
pub const STEP_OPEN_SESSION: &str = "open_session";

/// Step name: link the bank account (including task polling)
pub const STEP_LINK_ACCOUNT: &str = "link_account";

/// Step name: fetch the linked accounts
pub const STEP_LIST_ACCOUNTS: &str = "list_accounts";
