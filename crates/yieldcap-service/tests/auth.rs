//! Registration, login, and account view integration tests.

mod common;

use common::{TestHarness, TEST_PASSWORD};
use serde_json::json;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_with_mistyped_field_returns_error_body() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/auth/register")
        .json(&json!({
            "name": 5,
            "email": "ada@example.com",
            "password": TEST_PASSWORD,
            "referralCode": harness.root.referral_code.to_string()
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn register_with_valid_code_returns_token_and_account() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": "  Ada@Example.com ",
            "password": TEST_PASSWORD,
            "referralCode": harness.root.referral_code.as_str().to_lowercase()
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["account"]["email"], "ada@example.com");
    assert_eq!(body["account"]["referredBy"], harness.root.referral_code.as_str());
    assert_eq!(body["account"]["totalInvested"], 0.0);
    assert_eq!(body["account"]["remainingCap"], 0.0);
    assert!(body["account"].get("passwordHash").is_none());

    let code = body["account"]["referralCode"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert_ne!(code, harness.root.referral_code.as_str());
}

#[tokio::test]
async fn register_with_unknown_code_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": TEST_PASSWORD,
            "referralCode": "ZZZZZ9"
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["message"], "Invalid referral code");
}

#[tokio::test]
async fn register_without_code_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": TEST_PASSWORD
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["message"], "Referral code is required");
}

#[tokio::test]
async fn register_with_missing_fields_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/auth/register")
        .json(&json!({
            "email": "ada@example.com",
            "referralCode": harness.root.referral_code.as_str()
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "bad_request");
    assert_eq!(body["error"]["message"], "Please enter all fields");
}

#[tokio::test]
async fn register_duplicate_email_fails() {
    let harness = TestHarness::new();
    harness
        .register("Ada", harness.root.referral_code.as_str())
        .await;

    let response = harness
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Ada Again",
            "email": "ADA@example.com",
            "password": TEST_PASSWORD,
            "referralCode": harness.root.referral_code.as_str()
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["message"], "User already exists");
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_returns_working_token() {
    let harness = TestHarness::new();
    let root = harness.login_root().await;

    let account = harness.account(&root).await;
    assert_eq!(account["id"], root.id.get());
    assert_eq!(account["name"], "Root");
    assert!(account["referredBy"].is_null());
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "root@example.com",
            "password": "not-the-password"
        }))
        .await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn login_with_unknown_email_fails_the_same_way() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "nobody@example.com",
            "password": TEST_PASSWORD
        }))
        .await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["message"], "Invalid credentials");
}

// ============================================================================
// Account view
// ============================================================================

#[tokio::test]
async fn account_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness.server.get("/account").await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn account_with_garbage_token_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/account")
        .add_header("authorization", "Bearer not.a.jwt")
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn referrals_list_newest_first() {
    let harness = TestHarness::new();
    let root = harness.login_root().await;
    let code = root.referral_code.clone();

    harness.register("Ada", &code).await;
    harness.register("Bob", &code).await;

    let response = harness
        .server
        .get("/account/referrals")
        .add_header("authorization", root.auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Bob", "Ada"]);
}
