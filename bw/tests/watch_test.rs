//! End-to-end watcher tests against a mock GitHub API
//!
//! These drive the real HTTP client, file store and detector together.

use std::time::Duration;

use branchwatch::config::ResolvedConfig;
use branchwatch::{ChangeReport, CursorStore, Detector, GitHubClient, RevisionId, WatchError, WatchTarget, report};
use tempfile::TempDir;

const OLD: &str = "aaa1110000000000000000000000000000000000";
const NEW: &str = "bbb2220000000000000000000000000000000000";

fn resolved(api_url: &str, tracking: &TempDir) -> ResolvedConfig {
    ResolvedConfig {
        target: WatchTarget::new("favour-nz", "foodme-app", "dev"),
        token: "test-token".to_string(),
        api_url: api_url.to_string(),
        timeout: Duration::from_secs(5),
        tracking_dir: tracking.path().to_path_buf(),
    }
}

fn tip_body(sha: &str) -> String {
    serde_json::json!({ "sha": sha, "commit": { "message": "tip" } }).to_string()
}

fn compare_body() -> String {
    serde_json::json!({
        "ahead_by": 1,
        "commits": [
            {
                "sha": NEW,
                "commit": {
                    "message": "Fix bug\n\nDetails that should not appear",
                    "author": { "name": "Jane" }
                }
            }
        ],
        "files": [
            { "filename": "src/x.py", "status": "modified" }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_first_run_then_change() {
    let mut server = mockito::Server::new_async().await;
    let tracking = TempDir::new().expect("Failed to create temp dir");
    let config = resolved(&server.url(), &tracking);
    let client = GitHubClient::from_config(&config).expect("Failed to build client");
    let store = CursorStore::new(&config.tracking_dir);
    let detector = Detector::new(&config.target, &client, &store);

    // First run: baseline only, no compare request
    let tip_old = server
        .mock("GET", "/repos/favour-nz/foodme-app/commits/dev")
        .match_header("authorization", "token test-token")
        .with_status(200)
        .with_body(tip_body(OLD))
        .expect(1)
        .create_async()
        .await;
    let compare = server
        .mock("GET", format!("/repos/favour-nz/foodme-app/compare/{}...{}", OLD, NEW).as_str())
        .match_header("authorization", "token test-token")
        .with_status(200)
        .with_body(compare_body())
        .expect(1)
        .create_async()
        .await;

    let report = detector.check().await.expect("first run failed");
    assert_eq!(
        report,
        ChangeReport::FirstRun {
            observed_tip: RevisionId::new(OLD)
        }
    );
    tip_old.assert_async().await;
    tip_old.remove_async().await;

    // Branch advanced
    let tip_new = server
        .mock("GET", "/repos/favour-nz/foodme-app/commits/dev")
        .with_status(200)
        .with_body(tip_body(NEW))
        .expect(2)
        .create_async()
        .await;

    let report = detector.check().await.expect("change run failed");
    compare.assert_async().await;
    assert!(report.has_changes());

    let text = report::render(&report);
    assert!(text.lines().any(|l| l == "bbb2220: Fix bug (Jane)"));
    assert!(text.lines().any(|l| l == "src/x.py (modified)"));
    assert!(!text.contains("Details that should not appear"));

    assert_eq!(store.read(&config.target).unwrap(), Some(RevisionId::new(NEW)));

    // Nothing new on the next run
    let report = detector.check().await.expect("no-change run failed");
    assert_eq!(report, ChangeReport::NoChange { tip: RevisionId::new(NEW) });
    tip_new.assert_async().await;
}

#[tokio::test]
async fn test_upstream_failure_preserves_cursor() {
    let mut server = mockito::Server::new_async().await;
    let tracking = TempDir::new().expect("Failed to create temp dir");
    let config = resolved(&server.url(), &tracking);
    let client = GitHubClient::from_config(&config).expect("Failed to build client");
    let store = CursorStore::new(&config.tracking_dir);
    store.write(&config.target, &RevisionId::new(OLD)).unwrap();

    let _tip = server
        .mock("GET", "/repos/favour-nz/foodme-app/commits/dev")
        .with_status(200)
        .with_body(tip_body(NEW))
        .create_async()
        .await;
    let _compare = server
        .mock("GET", format!("/repos/favour-nz/foodme-app/compare/{}...{}", OLD, NEW).as_str())
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let err = Detector::new(&config.target, &client, &store)
        .check()
        .await
        .expect_err("compare failure should fail the run");

    assert!(matches!(err, WatchError::Upstream { status: 503, .. }));
    assert!(err.is_retryable());
    assert_eq!(store.read(&config.target).unwrap(), Some(RevisionId::new(OLD)));
}

#[tokio::test]
async fn test_auth_failure_is_fatal_and_leaves_no_state() {
    let mut server = mockito::Server::new_async().await;
    let tracking = TempDir::new().expect("Failed to create temp dir");
    let config = resolved(&server.url(), &tracking);
    let client = GitHubClient::from_config(&config).expect("Failed to build client");
    let store = CursorStore::new(&config.tracking_dir);

    let _tip = server
        .mock("GET", "/repos/favour-nz/foodme-app/commits/dev")
        .with_status(403)
        .with_body(r#"{"message": "Resource not accessible by personal access token"}"#)
        .create_async()
        .await;

    let err = Detector::new(&config.target, &client, &store)
        .check()
        .await
        .expect_err("auth failure should fail the run");

    assert!(matches!(err, WatchError::Auth { status: 403, .. }));
    assert!(err.is_fatal());
    assert_eq!(store.read(&config.target).unwrap(), None);
}
