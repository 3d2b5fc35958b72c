//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for making authenticated requests to GitHub,
//! authenticating with a personal access token. It covers the three operations
//! the Datree cleanup needs: listing the repositories of an organization and
//! reading/replacing the branch protection of a single branch.

use http::StatusCode;
use octocrab::{Octocrab, Result as OctocrabResult};
use tracing::{debug, error, info, instrument};

pub mod branch_protection;
pub use branch_protection::{
    strip_datree_checks, BranchProtection, BranchProtectionUpdate, EnabledSetting,
    RequiredStatusChecks, RequiredStatusChecksUpdate, RestrictedTeam, RestrictedUser,
    Restrictions, RestrictionsUpdate, StatusCheck, DATREE_INSIGHTS, DATREE_SMART_POLICY,
};

pub mod errors;
pub use errors::Error;

pub mod models;
pub use models::RepositorySummary;

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Exact message GitHub attaches to the 404 returned for an unprotected branch.
const BRANCH_NOT_PROTECTED_MESSAGE: &str = "Branch not protected";

/// Exact message GitHub attaches to the 403 returned when the plan tier does not
/// include branch protection for private repositories.
const UPGRADE_REQUIRED_MESSAGE: &str =
    "Upgrade to GitHub Pro or make this repository public to enable this feature.";

/// Repositories requested per listing page.
const REPOS_PER_PAGE: u8 = 100;

/// A client for interacting with the GitHub API, authenticated with a token.
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` wrapping an already configured `Octocrab` instance.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Lists every repository of an organization.
    ///
    /// Pages through `GET /orgs/{org}/repos` until an empty page is returned,
    /// accumulating all entries eagerly so the caller knows the total count up
    /// front. The platform's ordering is preserved; no re-sorting is performed.
    ///
    /// # Arguments
    ///
    /// * `org` - The login of the organization to list.
    ///
    /// # Errors
    ///
    /// Returns `Error::ApiError` if any page request fails; there is no retry.
    #[instrument(skip(self), fields(org = %org))]
    pub async fn list_org_repositories(&self, org: &str) -> Result<Vec<RepositorySummary>, Error> {
        let mut summaries = Vec::new();
        let mut page = 1u32;

        loop {
            debug!(
                org = org,
                page = page,
                "Fetching page {} of repositories",
                page
            );

            let repos_result = self
                .client
                .orgs(org)
                .list_repos()
                .per_page(REPOS_PER_PAGE)
                .page(page)
                .send()
                .await;

            match repos_result {
                Ok(repos) => {
                    if repos.items.is_empty() {
                        break;
                    }

                    debug!(
                        org = org,
                        page = page,
                        count = repos.items.len(),
                        "Retrieved repository page"
                    );

                    summaries.extend(repos.items.into_iter().map(RepositorySummary::from));
                    page += 1;
                }
                Err(err) => {
                    let message = err.to_string();
                    log_octocrab_error("Failed to list organization repositories", err);
                    return Err(Error::ApiError {
                        operation: "Failed to list organization repositories",
                        message,
                    });
                }
            }
        }

        info!(
            org = org,
            count = summaries.len(),
            "Retrieved all repositories for organization"
        );

        Ok(summaries)
    }

    /// Fetches the branch protection configuration for a branch.
    ///
    /// # Arguments
    ///
    /// * `owner` - The owner of the repository (user or organization name).
    /// * `repo` - The name of the repository.
    /// * `branch` - The branch whose protection to read.
    ///
    /// # Errors
    ///
    /// The two recognized absence conditions surface as dedicated kinds so that
    /// callers can treat them as "no protection configured":
    ///
    /// - `Error::BranchNotProtected` for the 404 `Branch not protected` response.
    /// - `Error::ProtectionUnavailable` for the 403 plan-tier response.
    ///
    /// Anything else maps to `Error::ApiError`.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, branch = %branch))]
    pub async fn get_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<BranchProtection, Error> {
        let path = format!("/repos/{}/{}/branches/{}/protection", owner, repo, branch);
        let result: OctocrabResult<BranchProtection> = self.client.get(path, None::<&()>).await;
        match result {
            Ok(protection) => Ok(protection),
            Err(err) => Err(classify_protection_error(
                "Failed to get branch protection",
                err,
            )),
        }
    }

    /// Replaces the branch protection configuration for a branch.
    ///
    /// This is a full replace via `PUT`: the payload carries every protection
    /// field on every call because the endpoint treats omitted fields as
    /// "disable this protection" rather than "leave unchanged".
    ///
    /// # Arguments
    ///
    /// * `owner` - The owner of the repository (user or organization name).
    /// * `repo` - The name of the repository.
    /// * `branch` - The branch whose protection to replace.
    /// * `update` - The full replacement configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::ApiError` if the update call fails.
    #[instrument(skip(self, update), fields(owner = %owner, repo = %repo, branch = %branch))]
    pub async fn update_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        update: &BranchProtectionUpdate,
    ) -> Result<BranchProtection, Error> {
        let path = format!("/repos/{}/{}/branches/{}/protection", owner, repo, branch);
        let result: OctocrabResult<BranchProtection> = self.client.put(path, Some(update)).await;
        match result {
            Ok(applied) => {
                info!(
                    owner = owner,
                    repo = repo,
                    branch = branch,
                    "Replaced branch protection configuration"
                );
                Ok(applied)
            }
            Err(err) => {
                let message = err.to_string();
                log_octocrab_error("Failed to update branch protection", err);
                Err(Error::ApiError {
                    operation: "Failed to update branch protection",
                    message,
                })
            }
        }
    }
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// # Errors
///
/// Returns an `Error::AuthError` if the client cannot be built.
#[instrument(skip(token))]
pub fn create_token_client(token: &str) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| Error::AuthError(e.to_string()))
}

/// Maps a failed branch-protection read to an error kind.
///
/// The two absence conditions have no structured reason code; GitHub only
/// distinguishes them by status code and exact message text, so this is the one
/// place in the crate that matches on message strings.
fn classify_protection_error(operation: &'static str, err: octocrab::Error) -> Error {
    if let octocrab::Error::GitHub { ref source, .. } = err {
        if source.status_code == StatusCode::NOT_FOUND
            && source.message == BRANCH_NOT_PROTECTED_MESSAGE
        {
            return Error::BranchNotProtected;
        }
        if source.status_code == StatusCode::FORBIDDEN && source.message == UPGRADE_REQUIRED_MESSAGE
        {
            return Error::ProtectionUnavailable;
        }
    }

    let message = err.to_string();
    log_octocrab_error(operation, err);
    Error::ApiError { operation, message }
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            let err = source;
            error!(
                error_message = err.message,
                backtrace = backtrace.to_string(),
                "{}. Received an error from GitHub",
                message
            )
        }
        octocrab::Error::UriParse { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. Failed to parse URI.",
            message
        ),

        octocrab::Error::Uri { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}, Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidHeaderValue { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. One of the header values was invalid.",
            message
        ),
        octocrab::Error::InvalidUtf8 { source, backtrace } => error!(
            error_message = source.to_string(),
            backtrace = backtrace.to_string(),
            "{}. The message wasn't valid UTF-8.",
            message,
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
