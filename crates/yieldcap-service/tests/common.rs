//! Common test utilities for yieldcap integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Value};
use tempfile::TempDir;

use yieldcap_core::{Account, AccountId};
use yieldcap_service::bootstrap::bootstrap_root;
use yieldcap_service::{create_router, AppState, BootstrapConfig, ServiceConfig};
use yieldcap_store::{RocksStore, Store};

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "password123";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct store access for arranging ledger state.
    pub store: Arc<RocksStore>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The bootstrapped root account.
    pub root: Account,
    /// The admin key accepted by the service.
    pub admin_key: String,
}

/// A registered account and its bearer token.
pub struct TestAccount {
    /// Account id.
    pub id: AccountId,
    /// Referral code handed out by the account.
    pub referral_code: String,
    /// Bearer token.
    pub token: String,
}

impl TestAccount {
    /// Authorization header value for this account.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl TestHarness {
    /// Create a new test harness with a fresh database and a root account.
    pub fn new() -> Self {
        Self::with_admin_key("test-admin-key")
    }

    /// Create a harness whose service is configured with `admin_key`.
    pub fn with_admin_key(admin_key: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let admin_key = admin_key.to_string();
        let bootstrap = BootstrapConfig {
            email: "root@example.com".into(),
            password: TEST_PASSWORD.into(),
            name: "Root".into(),
        };

        let root = bootstrap_root(store.as_ref(), &bootstrap, Utc::now())
            .expect("Failed to bootstrap root")
            .expect("Fresh store should bootstrap");

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            jwt_secret: "test-jwt-secret".into(),
            jwt_ttl_hours: 1,
            admin_key: Some(admin_key.clone()),
            bootstrap: Some(bootstrap),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(Arc::clone(&store), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            _temp_dir: temp_dir,
            root,
            admin_key,
        }
    }

    /// Log in as the root account.
    pub async fn login_root(&self) -> TestAccount {
        let response = self
            .server
            .post("/auth/login")
            .json(&json!({
                "email": "root@example.com",
                "password": TEST_PASSWORD
            }))
            .await;

        response.assert_status_ok();
        test_account(&response.json())
    }

    /// Register an account referred by `referral_code`.
    pub async fn register(&self, name: &str, referral_code: &str) -> TestAccount {
        let response = self
            .server
            .post("/auth/register")
            .json(&json!({
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
                "password": TEST_PASSWORD,
                "referralCode": referral_code
            }))
            .await;

        response.assert_status_ok();
        test_account(&response.json())
    }

    /// Deposit `amount` for `account`, asserting success.
    pub async fn deposit(&self, account: &TestAccount, amount: f64) {
        self.server
            .post("/deposit")
            .add_header("authorization", account.auth_header())
            .json(&json!({ "amount": amount }))
            .await
            .assert_status_ok();
    }

    /// Fetch `GET /account` for `account`.
    pub async fn account(&self, account: &TestAccount) -> Value {
        let response = self
            .server
            .get("/account")
            .add_header("authorization", account.auth_header())
            .await;

        response.assert_status_ok();
        response.json()
    }

    /// Overwrite an account's cached totals, in cents.
    pub fn set_totals(&self, account_id: AccountId, invested_cents: i64, earned_cents: i64) {
        let mut account = self
            .store
            .get_account(account_id)
            .expect("store read")
            .expect("account exists");
        account.total_invested_cents = invested_cents;
        account.total_earned_cents = earned_cents;
        self.store.put_account(&account).expect("store write");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn test_account(body: &Value) -> TestAccount {
    TestAccount {
        id: AccountId::new(body["account"]["id"].as_u64().expect("account id")),
        referral_code: body["account"]["referralCode"]
            .as_str()
            .expect("referral code")
            .to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}
