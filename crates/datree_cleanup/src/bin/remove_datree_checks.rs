//! Remove the Datree status checks from an organization's branch protection.
//!
//! This binary lists every repository in the configured organization and, for each
//! one, strips the "Datree Smart Policy" and "Datree insights" required status
//! checks from the default branch's protection, leaving every other protection
//! setting unchanged.
//!
//! Usage:
//!   remove-datree-checks
//!
//! Environment variables required:
//! - TOKEN: GitHub personal access token
//! - OWNER: Organization name (e.g. "datreeio")

use datree_cleanup::{CleanupConfig, DatreeCleanup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    datree_cleanup::init_logging();

    // Load configuration from environment
    let config = CleanupConfig::from_env()?;

    // Create GitHub client with token authentication
    let octocrab = github_client::create_token_client(&config.token)?;
    let client = github_client::GitHubClient::new(octocrab);

    let cleanup = DatreeCleanup::new(client, config.org.clone());
    let report = cleanup.run().await?;

    if !report.is_success() {
        eprintln!(
            "Failed to remediate {} of {} repositories:",
            report.failed.len(),
            report.total
        );
        for (repo, reason) in &report.failed {
            eprintln!("   - {}: {}", repo, reason);
        }
        std::process::exit(1);
    }

    Ok(())
}
