//! Unit tests for the github_client crate.

use super::*; // Import items from lib.rs
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_client(mock_server: &MockServer) -> GitHubClient {
    let octocrab = octocrab::Octocrab::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .personal_token("test-token".to_string())
        .build()
        .unwrap();
    GitHubClient::new(octocrab)
}

fn listing_entry(id: u64, name: &str, owner: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "node_id": format!("R_{id}"),
        "url": format!("https://api.github.com/repos/{owner}/{name}"),
        "html_url": format!("https://github.com/{owner}/{name}"),
        "private": false,
        "fork": false,
        "archived": false,
        "default_branch": "main",
        "owner": {
            "login": owner,
            "id": 78910,
            "node_id": "MDQ6VXNlcjc4OTEw",
            "avatar_url": "https://avatars.githubusercontent.com/u/78910?v=4",
            "gravatar_id": "",
            "url": format!("https://api.github.com/users/{owner}"),
            "html_url": format!("https://github.com/{owner}"),
            "followers_url": format!("https://api.github.com/users/{owner}/followers"),
            "following_url": format!("https://api.github.com/users/{owner}/following{{/other_user}}"),
            "gists_url": format!("https://api.github.com/users/{owner}/gists{{/gist_id}}"),
            "starred_url": format!("https://api.github.com/users/{owner}/starred{{/owner}}{{/repo}}"),
            "subscriptions_url": format!("https://api.github.com/users/{owner}/subscriptions"),
            "organizations_url": format!("https://api.github.com/users/{owner}/orgs"),
            "repos_url": format!("https://api.github.com/users/{owner}/repos"),
            "events_url": format!("https://api.github.com/users/{owner}/events{{/privacy}}"),
            "received_events_url": format!("https://api.github.com/users/{owner}/received_events"),
            "type": "Organization",
            "site_admin": false
        }
    })
}

#[tokio::test]
async fn test_list_org_repositories_follows_pagination() {
    let mock_server = MockServer::start().await;
    let org = "test-org";

    Mock::given(method("GET"))
        .and(path(format!("/orgs/{org}/repos")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing_entry(1, "alpha", org),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/orgs/{org}/repos")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing_entry(2, "beta", org),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/orgs/{org}/repos")))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let repos = client
        .list_org_repositories(org)
        .await
        .expect("listing failed");

    // Platform order preserved across pages
    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0].name, "alpha");
    assert_eq!(repos[1].name, "beta");
    assert_eq!(repos[0].owner_login, org);
    assert_eq!(repos[0].default_branch, "main");
}

#[tokio::test]
async fn test_list_org_repositories_propagates_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/test-org/repos"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Internal server error"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let result = client.list_org_repositories("test-org").await;

    assert!(matches!(result, Err(Error::ApiError { .. })));
}

#[tokio::test]
async fn test_get_branch_protection_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test-org/alpha/branches/main/protection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "required_status_checks": {
                "strict": true,
                "contexts": ["Datree Smart Policy", "ci/build"],
                "checks": [
                    {"context": "Datree Smart Policy", "app_id": 15368},
                    {"context": "ci/build", "app_id": null}
                ]
            },
            "enforce_admins": {"enabled": true}
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let protection = client
        .get_branch_protection("test-org", "alpha", "main")
        .await
        .expect("get_branch_protection failed");

    let status_checks = protection
        .required_status_checks
        .expect("missing required_status_checks");
    assert_eq!(status_checks.strict, Some(true));
    assert_eq!(status_checks.checks.map(|c| c.len()), Some(2));
    assert!(protection.enforce_admins.unwrap().enabled);
}

#[tokio::test]
async fn test_get_branch_protection_branch_not_protected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test-org/alpha/branches/main/protection"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Branch not protected",
            "documentation_url": "https://docs.github.com/rest/branches/branch-protection"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let result = client
        .get_branch_protection("test-org", "alpha", "main")
        .await;

    assert!(matches!(result, Err(Error::BranchNotProtected)));
}

#[tokio::test]
async fn test_get_branch_protection_plan_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test-org/alpha/branches/main/protection"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Upgrade to GitHub Pro or make this repository public to enable this feature.",
            "documentation_url": "https://docs.github.com/rest/branches/branch-protection"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let result = client
        .get_branch_protection("test-org", "alpha", "main")
        .await;

    assert!(matches!(result, Err(Error::ProtectionUnavailable)));
}

#[tokio::test]
async fn test_get_branch_protection_other_404_is_not_swallowed() {
    let mock_server = MockServer::start().await;

    // A 404 with a different message (e.g. missing repository) must stay an error.
    Mock::given(method("GET"))
        .and(path("/repos/test-org/gone/branches/main/protection"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server).await;
    let result = client
        .get_branch_protection("test-org", "gone", "main")
        .await;

    assert!(matches!(result, Err(Error::ApiError { .. })));
}

#[tokio::test]
async fn test_update_branch_protection_sends_full_replacement() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/test-org/alpha/branches/main/protection"))
        .and(body_partial_json(json!({
            "required_status_checks": {
                "strict": true,
                "contexts": ["ci/build"],
                "checks": [{"context": "ci/build", "app_id": null}]
            },
            "enforce_admins": true,
            "allow_force_pushes": false,
            "allow_deletions": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "required_status_checks": {
                "strict": true,
                "contexts": ["ci/build"],
                "checks": [{"context": "ci/build", "app_id": null}]
            },
            "enforce_admins": {"enabled": true}
        })))
        .mount(&mock_server)
        .await;

    let update = BranchProtectionUpdate {
        required_status_checks: Some(RequiredStatusChecksUpdate {
            strict: true,
            contexts: vec!["ci/build".to_string()],
            checks: vec![StatusCheck {
                context: "ci/build".to_string(),
                app_id: None,
            }],
        }),
        enforce_admins: Some(true),
        required_pull_request_reviews: None,
        restrictions: None,
        allow_force_pushes: false,
        allow_deletions: false,
    };

    let client = test_client(&mock_server).await;
    let applied = client
        .update_branch_protection("test-org", "alpha", "main", &update)
        .await
        .expect("update_branch_protection failed");

    assert!(applied.required_status_checks.is_some());
}

#[tokio::test]
async fn test_update_branch_protection_propagates_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/repos/test-org/alpha/branches/main/protection"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed"
        })))
        .mount(&mock_server)
        .await;

    let update = strip_datree_checks(&BranchProtection::default());
    let client = test_client(&mock_server).await;
    let result = client
        .update_branch_protection("test-org", "alpha", "main", &update)
        .await;

    assert!(matches!(result, Err(Error::ApiError { .. })));
}
