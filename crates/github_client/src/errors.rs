//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when interacting with the GitHub API
//! through the github_client crate. The two branch-protection absence conditions are modeled
//! as dedicated variants so that callers can pattern-match on kind instead of inspecting
//! status codes or message strings themselves.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.get_branch_protection("org", "repo", "main").await {
///     Ok(protection) => println!("branch is protected"),
///     Err(Error::BranchNotProtected) => println!("no protection configured"),
///     Err(Error::ProtectionUnavailable) => println!("not available on this plan"),
///     Err(err) => eprintln!("request failed: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A GitHub API request failed for a reason the client does not distinguish further.
    ///
    /// Covers transport failures, authentication rejections, rate limiting, and any
    /// GitHub error response that is not one of the recognized branch-protection
    /// absence conditions.
    #[error("{operation}: {message}")]
    ApiError {
        /// The operation that was being performed when the request failed.
        operation: &'static str,
        /// The underlying error description.
        message: String,
    },

    /// Authentication or GitHub client initialization failure.
    ///
    /// The contained string provides specific details about the failure.
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// The requested branch has no branch protection configured.
    ///
    /// GitHub signals this as a 404 with the message `Branch not protected`.
    /// Callers treat this as "empty configuration", not as a failure.
    #[error("Branch not protected")]
    BranchNotProtected,

    /// Error deserializing the response from GitHub.
    ///
    /// This occurs when the GitHub API returns a response that cannot be parsed
    /// into the expected data structure.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Branch protection is not available on the repository's plan tier.
    ///
    /// GitHub signals this as a 403 asking to upgrade the plan or make the
    /// repository public. Callers treat this the same as [`Error::BranchNotProtected`].
    #[error("Branch protection is not available for this repository's plan")]
    ProtectionUnavailable,
}
