//! # Models
//!
//! This module contains the data models shared by the cleanup tooling.
//!
//! The central type is [`RepositorySummary`], the normalized form of a repository
//! entry returned by the organization listing endpoint. Summaries are read-only:
//! they are produced once by the listing call and discarded after the repository
//! has been processed.

use serde::{Deserialize, Serialize};
use url::Url;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Branch name assumed when the listing entry does not carry one.
const FALLBACK_DEFAULT_BRANCH: &str = "main";

/// Normalized summary of a repository returned by the organization listing.
///
/// Raw listing entries mark almost every field as optional; this type pins down
/// the handful of fields the cleanup run actually needs, with absent booleans
/// normalized to `false` and an absent default branch normalized to `"main"`.
///
/// # Examples
///
/// ```rust
/// use github_client::RepositorySummary;
/// use url::Url;
///
/// let summary = RepositorySummary {
///     id: 1296269,
///     name: "hello-world".to_string(),
///     owner_login: "octocat".to_string(),
///     default_branch: "main".to_string(),
///     url: Url::parse("https://github.com/octocat/hello-world").unwrap(),
///     private: false,
///     fork: false,
///     archived: false,
/// };
///
/// println!("{}/{}", summary.owner_login, summary.name);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RepositorySummary {
    /// The unique numeric ID of the repository
    pub id: u64,
    /// The name of the repository (without owner)
    pub name: String,
    /// The login of the owning user or organization
    pub owner_login: String,
    /// The default branch of the repository
    pub default_branch: String,
    /// The HTML URL of the repository
    pub url: Url,
    /// Whether the repository is private
    pub private: bool,
    /// Whether the repository is a fork
    pub fork: bool,
    /// Whether the repository is archived
    pub archived: bool,
}

impl From<octocrab::models::Repository> for RepositorySummary {
    fn from(value: octocrab::models::Repository) -> Self {
        let owner_login = value.owner.map(|owner| owner.login).unwrap_or_default();
        let url = value.html_url.unwrap_or_else(|| {
            Url::parse(&format!(
                "https://github.com/{}/{}",
                owner_login, value.name
            ))
            .expect("Valid GitHub repository URL")
        });
        Self {
            id: *value.id,
            name: value.name,
            owner_login,
            default_branch: value
                .default_branch
                .unwrap_or_else(|| FALLBACK_DEFAULT_BRANCH.to_string()),
            url,
            private: value.private.unwrap_or(false),
            fork: value.fork.unwrap_or(false),
            archived: value.archived.unwrap_or(false),
        }
    }
}
