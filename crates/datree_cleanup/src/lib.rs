//! Datree check cleanup.
//!
//! This crate removes the two Datree status checks ("Datree Smart Policy" and
//! "Datree insights") from the branch protection of every repository in a GitHub
//! organization. It is a one-shot batch job: list the repositories, then for each
//! one fetch the default branch's protection, strip the Datree checks, and write
//! the configuration back as a full replacement.

use anyhow::{Context, Result};
use github_client::{strip_datree_checks, BranchProtection, Error, GitHubClient, RepositorySummary};
use std::env;
use tracing::{debug, error, info};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Configuration for a cleanup run loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Personal access token used for every API call
    pub token: String,
    /// Organization whose repositories are remediated
    pub org: String,
}

impl CleanupConfig {
    /// Load cleanup configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `TOKEN`: GitHub personal access token
    /// - `OWNER`: Organization name whose repositories are remediated
    pub fn from_env() -> Result<Self> {
        let token = env::var("TOKEN").context("TOKEN environment variable not set")?;
        let org = env::var("OWNER").context("OWNER environment variable not set")?;

        Ok(Self { token, org })
    }
}

/// Outcome of a cleanup run.
///
/// The run itself completes even when individual repositories fail; callers
/// decide the process exit code from [`CleanupReport::is_success`].
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Total number of repositories the organization listed
    pub total: usize,
    /// Names of repositories whose protection was replaced, in processing order
    pub updated: Vec<String>,
    /// Failed repositories with the error description, in processing order
    pub failed: Vec<(String, String)>,
}

impl CleanupReport {
    /// Whether every repository was remediated.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sequential remediation run over all repositories of one organization.
pub struct DatreeCleanup {
    client: GitHubClient,
    org: String,
}

impl DatreeCleanup {
    /// Create a new cleanup instance.
    ///
    /// # Arguments
    ///
    /// * `client` - Authenticated GitHub client
    /// * `org` - Organization whose repositories are remediated
    pub fn new(client: GitHubClient, org: String) -> Self {
        Self { client, org }
    }

    /// Runs the cleanup over every repository of the organization.
    ///
    /// The repository list is materialized fully before the loop so the progress
    /// lines can report `{done}/{total}`. Repositories are processed strictly
    /// sequentially, in listing order. A repository that fails is recorded in the
    /// report and skipped; the two recognized protection-absence conditions are
    /// not failures and proceed with an empty configuration.
    ///
    /// # Errors
    ///
    /// Only the initial listing call can fail the run as a whole; everything
    /// after that is captured per repository in the returned report.
    pub async fn run(&self) -> Result<CleanupReport, Error> {
        let repos = self.client.list_org_repositories(&self.org).await?;

        let mut report = CleanupReport {
            total: repos.len(),
            ..Default::default()
        };
        println!("Retrieved {} repositories", report.total);

        for repo in &repos {
            match self.remediate_repository(repo).await {
                Ok(()) => {
                    report.updated.push(repo.name.clone());
                    println!(
                        "removed datree checks from repository: {}. {}/{}",
                        repo.name,
                        report.updated.len(),
                        report.total
                    );
                }
                Err(err) => {
                    error!(
                        repo = repo.name,
                        error = %err,
                        "Failed to remediate repository, continuing with the next one"
                    );
                    report.failed.push((repo.name.clone(), err.to_string()));
                }
            }
        }

        println!("done");

        Ok(report)
    }

    /// Remediates a single repository's default branch.
    ///
    /// Fetch, transform, write back. The configuration object lives only for the
    /// duration of this call; nothing is cached across repositories.
    async fn remediate_repository(&self, repo: &RepositorySummary) -> Result<(), Error> {
        let protection = match self
            .client
            .get_branch_protection(&repo.owner_login, &repo.name, &repo.default_branch)
            .await
        {
            Ok(protection) => protection,
            Err(Error::BranchNotProtected) | Err(Error::ProtectionUnavailable) => {
                debug!(
                    repo = repo.name,
                    branch = repo.default_branch,
                    "No branch protection configured, proceeding with an empty configuration"
                );
                BranchProtection::default()
            }
            Err(err) => return Err(err),
        };

        let update = strip_datree_checks(&protection);

        self.client
            .update_branch_protection(&repo.owner_login, &repo.name, &repo.default_branch, &update)
            .await?;

        info!(
            repo = repo.name,
            branch = repo.default_branch,
            "Removed Datree checks from branch protection"
        );

        Ok(())
    }
}

/// Initializes the tracing subscriber for the cleanup binaries.
///
/// Diagnostics go to stderr so the progress lines on stdout stay parseable.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
