//! Bank-account onboarding automation
//!
//! One-shot batch binary: loads the run configuration, drives the onboarding
//! workflow against the aggregation service, and prints the linked accounts
//! (or `null`) to stdout. Diagnostics go to stderr so the result stream stays
//! clean.

use figo_onboard::config::Config;
use figo_onboard::workflow;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::load()?;
    info!(
        api_url = %config.api_url,
        user = %config.user.email,
        "Configuration loaded"
    );

    let report = workflow::run(&config).await;

    if report.failed_steps.is_empty() {
        info!("Workflow completed without reported failures");
    } else {
        info!(
            failed_steps = ?report.failed_steps,
            "Workflow completed with reported failures"
        );
    }

    // Terminal report: the account list, or null when the fetch never succeeded.
    println!("{}", serde_json::to_string_pretty(&report.accounts)?);

    Ok(())
}
