//! Branch protection domain types and the Datree check removal.
//!
//! This module contains types representing GitHub branch protection rules, split into
//! the read-side shape returned by `GET /repos/{owner}/{repo}/branches/{branch}/protection`
//! and the write-side payload accepted by the matching `PUT` endpoint, plus the pure
//! transformation that removes the two Datree status checks from a fetched configuration.
//!
//! The update endpoint is a full replace: omitting a field means "disable this
//! protection", not "leave unchanged", so [`BranchProtectionUpdate`] serializes every
//! field on every call, with `null` standing in for absent settings.
//!
//! See: https://docs.github.com/en/rest/branches/branch-protection

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "branch_protection_tests.rs"]
mod tests;

/// Status check name registered by the Datree policy enforcement integration.
pub const DATREE_SMART_POLICY: &str = "Datree Smart Policy";

/// Status check name registered by the Datree insights integration.
pub const DATREE_INSIGHTS: &str = "Datree insights";

/// Whether a status check context belongs to Datree. Matching is case-sensitive
/// and exact.
fn is_datree_check(context: &str) -> bool {
    context == DATREE_SMART_POLICY || context == DATREE_INSIGHTS
}

/// Branch protection settings as returned by the GitHub read endpoint.
///
/// Every field is optional: repositories routinely have only a subset of the
/// protections configured, and a branch with no protection at all is represented
/// by `BranchProtection::default()`.
///
/// `required_pull_request_reviews` is carried as an opaque JSON value; the cleanup
/// never interprets it, it only writes it back verbatim.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BranchProtection {
    /// Required status checks configuration, if any
    pub required_status_checks: Option<RequiredStatusChecks>,
    /// Whether the protections also apply to administrators
    pub enforce_admins: Option<EnabledSetting>,
    /// Pull request review requirements, passed through uninterpreted
    pub required_pull_request_reviews: Option<serde_json::Value>,
    /// Push restrictions, if any
    pub restrictions: Option<Restrictions>,
    /// Whether force pushes are allowed
    pub allow_force_pushes: Option<EnabledSetting>,
    /// Whether branch deletion is allowed
    pub allow_deletions: Option<EnabledSetting>,
}

/// Required status checks as returned by the read endpoint.
///
/// GitHub reports the required checks in two forms that may coexist: the legacy
/// `contexts` list of bare names and the newer `checks` list carrying the source
/// app for each context. Both must stay consistent when entries are removed.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RequiredStatusChecks {
    /// Whether branches must be up to date before merging
    pub strict: Option<bool>,
    /// Legacy list of required check names
    pub contexts: Option<Vec<String>>,
    /// Required checks with their originating app
    pub checks: Option<Vec<StatusCheck>>,
}

/// A single required status check entry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusCheck {
    /// The name of the check
    pub context: String,
    /// The ID of the GitHub App that must provide the check, `null` for any source
    pub app_id: Option<i64>,
}

/// A protection sub-setting GitHub reports as `{ "enabled": bool }`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EnabledSetting {
    /// Whether the setting is enabled
    pub enabled: bool,
}

/// Push restrictions as returned by the read endpoint.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Restrictions {
    /// Users with push access
    pub users: Option<Vec<RestrictedUser>>,
    /// Teams with push access
    pub teams: Option<Vec<RestrictedTeam>>,
}

/// A user entry inside [`Restrictions`]. Only the login is relevant for write-back.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RestrictedUser {
    /// The login name of the user
    pub login: String,
}

/// A team entry inside [`Restrictions`]. Only the slug is relevant for write-back.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RestrictedTeam {
    /// The slug of the team
    pub slug: String,
}

/// Full replacement payload for the branch protection update endpoint.
///
/// All fields serialize unconditionally; `None` becomes JSON `null`, which the
/// endpoint interprets as "this protection is unset". Never skip fields here.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BranchProtectionUpdate {
    /// Required status checks, `null` to clear them
    pub required_status_checks: Option<RequiredStatusChecksUpdate>,
    /// Whether protections apply to administrators, `null` when unset
    pub enforce_admins: Option<bool>,
    /// Pull request review requirements, written back verbatim
    pub required_pull_request_reviews: Option<serde_json::Value>,
    /// Push restrictions normalized to name lists, `null` when unset
    pub restrictions: Option<RestrictionsUpdate>,
    /// Whether force pushes are allowed
    pub allow_force_pushes: bool,
    /// Whether branch deletion is allowed
    pub allow_deletions: bool,
}

/// Required status checks in the shape the update endpoint expects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RequiredStatusChecksUpdate {
    /// Whether branches must be up to date before merging
    pub strict: bool,
    /// Legacy list of required check names
    pub contexts: Vec<String>,
    /// Required checks with their originating app
    pub checks: Vec<StatusCheck>,
}

/// Push restrictions in the shape the update endpoint expects: user logins and
/// team slugs instead of full objects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestrictionsUpdate {
    /// Login names of users with push access
    pub users: Vec<String>,
    /// Slugs of teams with push access
    pub teams: Vec<String>,
}

/// Derives the full replacement configuration with the Datree checks removed.
///
/// Every protection setting other than the required status checks is carried over
/// unchanged, normalized to the shape the update endpoint expects:
///
/// - `enforce_admins` collapses to its `enabled` flag, `None` when absent.
/// - `restrictions` collapses to login/slug lists, with an absent user or team
///   list becoming an empty list.
/// - `allow_force_pushes` and `allow_deletions` default to `false` when absent.
/// - `required_pull_request_reviews` is cloned verbatim.
///
/// The required status checks follow the removal rules documented on
/// `remaining_status_checks`, including the collapse of an emptied checks
/// list to `null`.
///
/// The transformation is idempotent: applying it to an already cleaned
/// configuration produces the same payload again.
pub fn strip_datree_checks(protection: &BranchProtection) -> BranchProtectionUpdate {
    BranchProtectionUpdate {
        required_status_checks: remaining_status_checks(protection.required_status_checks.as_ref()),
        enforce_admins: protection.enforce_admins.as_ref().map(|s| s.enabled),
        required_pull_request_reviews: protection.required_pull_request_reviews.clone(),
        restrictions: protection.restrictions.as_ref().map(|r| RestrictionsUpdate {
            users: r
                .users
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|user| user.login.clone())
                .collect(),
            teams: r
                .teams
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|team| team.slug.clone())
                .collect(),
        }),
        allow_force_pushes: protection
            .allow_force_pushes
            .as_ref()
            .map(|s| s.enabled)
            .unwrap_or(false),
        allow_deletions: protection
            .allow_deletions
            .as_ref()
            .map(|s| s.enabled)
            .unwrap_or(false),
    }
}

/// Computes the required status checks that survive Datree removal.
///
/// Returns `None` (clearing the status check protection) when:
///
/// - the source has no `required_status_checks` at all,
/// - the source has no structured `checks` list — a legacy or malformed shape
///   this tool does not attempt to normalize, or
/// - removing the Datree entries leaves the `checks` list empty. The update
///   endpoint rejects an empty enforced-checks structure, so emptiness collapses
///   to absence.
///
/// Otherwise the Datree names are filtered out of both the legacy `contexts`
/// list and the `checks` list (keyed on the `context` field of each entry), and
/// the `strict` flag is preserved.
fn remaining_status_checks(
    source: Option<&RequiredStatusChecks>,
) -> Option<RequiredStatusChecksUpdate> {
    let source = source?;
    let checks = source.checks.as_ref()?;

    let checks: Vec<StatusCheck> = checks
        .iter()
        .filter(|check| !is_datree_check(&check.context))
        .cloned()
        .collect();
    if checks.is_empty() {
        return None;
    }

    let contexts = source
        .contexts
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|context| !is_datree_check(context))
        .cloned()
        .collect();

    Some(RequiredStatusChecksUpdate {
        // The read endpoint always reports strict; true is only the synthesized default.
        strict: source.strict.unwrap_or(true),
        contexts,
        checks,
    })
}
