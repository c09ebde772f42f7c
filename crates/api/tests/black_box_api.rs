//! Black-box HTTP tests: the real router on an ephemeral port, driven with
//! reqwest against the seeded in-memory directory.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use warden_auth::{Claims, RoleName};
use warden_core::UserId;
use warden_infra::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port; no env overrides,
        // so services come up in-memory and seeded.
        let app = warden_api::app::build_app("test-secret".to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn login(client: &reqwest::Client, base_url: &str, email: &str, password: &str) -> String {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");

    let body: Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn admin_token(client: &reqwest::Client, base_url: &str) -> String {
    login(client, base_url, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD).await
}

/// Register a user and return their id.
async fn register(client: &reqwest::Client, base_url: &str, name: &str, email: &str) -> String {
    let res = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({ "name": name, "email": email, "password": "a-long-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await.unwrap();
    body["user"]["id"].as_str().unwrap().to_string()
}

async fn role_id_by_name(client: &reqwest::Client, base_url: &str, token: &str, name: &str) -> String {
    let res = client
        .get(format!("{base_url}/role"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|role| role["name"] == name)
        .unwrap_or_else(|| panic!("role '{name}' not found"))["id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn permission_id_by_name(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
) -> String {
    let res = client
        .get(format!("{base_url}/permission"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == name)
        .unwrap_or_else(|| panic!("permission '{name}' not found"))["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn protected_endpoints_require_a_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/user", "/role", "/permission", "/dashboard/stats"] {
        let res = client
            .get(format!("{}{path}", srv.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], "error");
    }

    // Health stays public.
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn forged_or_garbage_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Well-formed claims, wrong signing key.
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: UserId::new(),
        email: "intruder@example.com".to_string(),
        name: "Intruder".to_string(),
        kind: RoleName::Admin,
        iat: now,
        exp: now + 3600,
    };
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"not-the-server-secret"),
    )
    .unwrap();

    for token in [forged.as_str(), "garbage"] {
        let res = client
            .get(format!("{}/user", srv.base_url))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn login_failures_never_reveal_which_field_was_wrong() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let wrong_password = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": DEFAULT_ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let body: Value = wrong_password.json().await.unwrap();
    assert_eq!(body["message"], "Invalid email or password!");

    let unknown_email = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "nobody@example.com", "password": DEFAULT_ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let body: Value = unknown_email.json().await.unwrap();
    assert_eq!(body["message"], "Invalid email or password!");
}

#[tokio::test]
async fn register_then_login_and_duplicate_registration_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "Jane Roe", "jane@x.com").await;
    login(&client, &srv.base_url, "jane@x.com", "a-long-password").await;

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "name": "Jane Roe", "email": "jane@x.com", "password": "a-long-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn permission_lifecycle_create_duplicate_fetch_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &srv.base_url).await;

    let res = client
        .post(format!("{}/permission", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "EXPORT_reports" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/permission", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "EXPORT_reports" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let id = permission_id_by_name(&client, &srv.base_url, &token, "EXPORT_reports").await;

    let res = client
        .get(format!("{}/permission/{id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["roles"], json!([]));

    let res = client
        .delete(format!("{}/permission/{id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["affectedRoles"], json!([]));

    let res = client
        .get(format!("{}/permission/{id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_held_permission_detaches_it_from_every_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &srv.base_url).await;

    // EDIT_owners is seeded onto both the admin and owner roles.
    let id = permission_id_by_name(&client, &srv.base_url, &token, "EDIT_owners").await;

    let res = client
        .delete(format!("{}/permission/{id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let affected: Vec<&str> = body["affectedRoles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(affected.contains(&"admin"));
    assert!(affected.contains(&"owner"));

    // The roles survive, minus the permission.
    let res = client
        .get(format!("{}/role", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    for role in body["data"].as_array().unwrap() {
        let names: Vec<&str> = role["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert!(!names.contains(&"EDIT_owners"));
    }
}

#[tokio::test]
async fn duplicate_role_names_conflict_with_distinguishing_messages() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &srv.base_url).await;

    // Collect the admin role's current permission ids.
    let res = client
        .get(format!("{}/role", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let admin_role = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "admin")
        .unwrap();
    let mut permission_ids: Vec<String> = admin_role["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();

    // Identical set (order shuffled).
    permission_ids.reverse();
    let res = client
        .post(format!("{}/role", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "admin", "permissionsId": permission_ids }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("identical permissions")
    );

    // Same name, smaller set: still a conflict, different message.
    let res = client
        .post(format!("{}/role", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "admin", "permissionsId": [permission_ids[0]] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("already exists"));
    assert!(!message.contains("identical permissions"));
}

#[tokio::test]
async fn role_deletion_blocked_while_held_and_allowed_when_free() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &srv.base_url).await;

    register(&client, &srv.base_url, "Holder", "holder@x.com").await;

    let user_role = role_id_by_name(&client, &srv.base_url, &token, "user").await;
    let res = client
        .delete(format!("{}/role/{user_role}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Cannot delete role"));

    // Nobody holds the owner role.
    let owner_role = role_id_by_name(&client, &srv.base_url, &token, "owner").await;
    let res = client
        .delete(format!("{}/role/{owner_role}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("deleted successfully"));
}

#[tokio::test]
async fn user_listing_is_filtered_by_the_callers_permissions() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "Jane Roe", "jane@x.com").await;
    let jane_token = login(&client, &srv.base_url, "jane@x.com", "a-long-password").await;

    // Jane holds only READ_users: she sees user-kind rows and nothing else,
    // regardless of the admin row also existing.
    let res = client
        .get(format!("{}/user", srv.base_url))
        .bearer_auth(&jane_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total"], 1);
    for user in body["users"].as_array().unwrap() {
        assert_eq!(user["type"], "user");
    }

    // The admin sees every kind.
    let token = admin_token(&client, &srv.base_url).await;
    let res = client
        .get(format!("{}/user", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total"], 2);

    // Jane cannot touch the admin-gated registries at all.
    let res = client
        .post(format!("{}/permission", srv.base_url))
        .bearer_auth(&jane_token)
        .json(&json!({ "name": "SNEAKY_perm" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_assignment_is_kind_scoped_and_promotes_the_target() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let jane_id = register(&client, &srv.base_url, "Jane Roe", "jane@x.com").await;
    let jane_token = login(&client, &srv.base_url, "jane@x.com", "a-long-password").await;
    let token = admin_token(&client, &srv.base_url).await;
    let admin_role = role_id_by_name(&client, &srv.base_url, &token, "admin").await;

    // Jane passes the route gate (READ_users) but fails the kind-scoped
    // EDIT_users check.
    let res = client
        .put(format!("{}/user", srv.base_url))
        .bearer_auth(&jane_token)
        .json(&json!({ "userId": jane_id, "roleId": admin_role }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "You don't have a permission to edit user");

    // The admin assigns; a repeat is an informational no-op.
    let res = client
        .put(format!("{}/user", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "userId": jane_id, "roleId": admin_role }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User edited successfully!");

    let res = client
        .put(format!("{}/user", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "userId": jane_id, "roleId": admin_role }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User already has this role.");

    // Role state is re-read per request: Jane's next request reflects the
    // promotion without re-issuing her token.
    let res = client
        .get(format!("{}/user/{jane_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["type"], "admin");
    let roles: Vec<&str> = body["roles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(roles.contains(&"user") && roles.contains(&"admin"));
}

#[tokio::test]
async fn profile_updates_recheck_email_uniqueness() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "Jane Roe", "jane@x.com").await;
    let jane_token = login(&client, &srv.base_url, "jane@x.com", "a-long-password").await;

    let res = client
        .put(format!("{}/user/profile", srv.base_url))
        .bearer_auth(&jane_token)
        .json(&json!({ "name": "Jane R. Roe", "email": "jane.roe@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Profile updated successfully!");

    // Colliding with another account's email is rejected.
    let res = client
        .put(format!("{}/user/profile", srv.base_url))
        .bearer_auth(&jane_token)
        .json(&json!({ "email": DEFAULT_ADMIN_EMAIL }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn user_deletion_requires_the_targets_kind_permission() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let jane_id = register(&client, &srv.base_url, "Jane Roe", "jane@x.com").await;
    let jane_token = login(&client, &srv.base_url, "jane@x.com", "a-long-password").await;
    let token = admin_token(&client, &srv.base_url).await;

    // Jane holds no DELETE_* permission.
    let res = client
        .delete(format!("{}/user/{jane_id}", srv.base_url))
        .bearer_auth(&jane_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/user/{jane_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/user/{jane_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_aggregates_are_admin_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "Jane Roe", "jane@x.com").await;
    let jane_token = login(&client, &srv.base_url, "jane@x.com", "a-long-password").await;
    let token = admin_token(&client, &srv.base_url).await;

    let res = client
        .get(format!("{}/dashboard/stats", srv.base_url))
        .bearer_auth(&jane_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/dashboard/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["stats"]["users"]["total"], 2);
    assert_eq!(body["stats"]["roles"]["total"], 3);
    assert_eq!(body["stats"]["permissions"]["total"], 12);

    let activities = body["recentActivities"].as_array().unwrap();
    assert!(!activities.is_empty());
    assert_eq!(activities[0]["type"], "user_registered");
    assert_eq!(activities[0]["data"]["email"], "jane@x.com");
}
