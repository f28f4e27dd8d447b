//! HTTP server for Glossa.
//!
//! Exposes spaces, branches, translations, diff and merge as a JSON API.
//! Callers are identified by an [`AuthProvider`] and checked against project
//! roles by the SDK before every call.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AuthProvider, ConfigAuth, Credentials, ANONYMOUS, USER_HEADER};
pub use config::{AuthConfig, GrantConfig, ServerConfig, DEFAULT_PORT};
pub use error::{ErrorResponse, ServerError, ServerResult};
pub use server::GlossaServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use glossa_sdk::{BranchId, Glossa, StaticAccessList, StoreConfig};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::*;

    fn app() -> Router {
        let glossa = Glossa::open(StoreConfig::in_memory()).unwrap();
        let auth = ConfigAuth::new(&AuthConfig::default());
        router::build_router(AppState::new(Arc::new(glossa), Arc::new(auth)))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_HEADER, "olivia");
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Create a space and return `(space_id, default_branch_id)`.
    async fn space(app: &Router) -> (String, String) {
        let (status, body) = send(
            app,
            Method::POST,
            "/spaces",
            Some(json!({ "projectId": "acme", "name": "Web" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (
            body["id"].as_str().unwrap().to_string(),
            body["defaultBranch"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn set(app: &Router, branch: &str, name: &str, language: &str, value: &str) {
        let (status, _) = send(
            app,
            Method::PUT,
            &format!("/branches/{branch}/translations"),
            Some(json!({ "name": name, "language": language, "value": value })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn fork(app: &Router, space: &str, from: &str, name: &str) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            &format!("/spaces/{space}/branches"),
            Some(json!({ "name": name, "fromBranchId": from })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send(&app(), Method::GET, "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (status, body) = send(&app(), Method::GET, "/v1/info", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "glossa-server");
    }

    #[tokio::test]
    async fn create_space_and_fork() {
        let app = app();
        let (space_id, main) = space(&app).await;

        let branch = fork(&app, &space_id, &main, "Feature Checkout").await;
        assert_eq!(branch["slug"], "feature-checkout");
        assert_eq!(branch["sourceBranchId"], main.as_str());
        assert_eq!(branch["isDefault"], false);

        let (status, list) =
            send(&app, Method::GET, &format!("/spaces/{space_id}/branches"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);

        // Same name again derives the same slug.
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/spaces/{space_id}/branches"),
            Some(json!({ "name": "feature checkout", "fromBranchId": main })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn fork_copies_keys() {
        let app = app();
        let (space_id, main) = space(&app).await;
        set(&app, &main, "greeting", "en", "Hello").await;
        let feature = fork(&app, &space_id, &main, "feature").await;
        let feature_id = feature["id"].as_str().unwrap();

        let (status, keys) =
            send(&app, Method::GET, &format!("/branches/{feature_id}/keys"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(keys[0]["name"], "greeting");
        assert_eq!(keys[0]["values"]["en"], "Hello");
    }

    #[tokio::test]
    async fn diff_then_merge_with_resolution() {
        let app = app();
        let (space_id, main) = space(&app).await;
        set(&app, &main, "greeting", "en", "Hello").await;
        let feature = fork(&app, &space_id, &main, "feature").await;
        let feature_id = feature["id"].as_str().unwrap().to_string();

        set(&app, &feature_id, "greeting", "en", "Hi").await;
        set(&app, &feature_id, "farewell", "en", "Bye").await;

        let (status, diff) = send(
            &app,
            Method::GET,
            &format!("/branches/{feature_id}/diff/{main}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(diff["added"].as_array().unwrap().len(), 1);
        assert_eq!(diff["modified"][0]["name"], "greeting");
        assert_eq!(diff["stats"]["modified"], 1);
        let fingerprint = diff["fingerprint"].as_str().unwrap().to_string();

        let uri = format!("/branches/{feature_id}/merge");
        let (status, result) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "targetBranchId": main })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["success"], false);
        assert_eq!(result["conflicts"][0]["name"], "greeting");
        assert!(result.get("appliedCount").is_none());

        let (status, result) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({
                "targetBranchId": main,
                "resolutions": [{ "name": "greeting", "resolution": "source" }],
                "expectedFingerprint": fingerprint,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["success"], true);
        assert_eq!(result["appliedCount"], 2);

        let (_, diff) = send(
            &app,
            Method::GET,
            &format!("/branches/{feature_id}/diff/{main}"),
            None,
        )
        .await;
        assert!(diff["added"].as_array().unwrap().is_empty());
        assert!(diff["modified"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_fingerprint_is_conflict() {
        let app = app();
        let (space_id, main) = space(&app).await;
        let feature = fork(&app, &space_id, &main, "feature").await;
        let feature_id = feature["id"].as_str().unwrap();
        set(&app, feature_id, "greeting", "en", "Hi").await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/branches/{feature_id}/merge"),
            Some(json!({
                "targetBranchId": main,
                "expectedFingerprint": "00".repeat(32),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn delete_rules() {
        let app = app();
        let (space_id, main) = space(&app).await;
        let feature = fork(&app, &space_id, &main, "feature").await;
        let feature_id = feature["id"].as_str().unwrap();

        let (status, _) = send(&app, Method::DELETE, &format!("/branches/{main}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) =
            send(&app, Method::DELETE, &format!("/branches/{feature_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &format!("/branches/{feature_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn set_default_and_rename() {
        let app = app();
        let (space_id, main) = space(&app).await;
        let feature = fork(&app, &space_id, &main, "feature").await;
        let feature_id = feature["id"].as_str().unwrap();

        let (status, branch) = send(
            &app,
            Method::PUT,
            &format!("/branches/{feature_id}/default"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(branch["isDefault"], true);

        let (_, old_main) = send(&app, Method::GET, &format!("/branches/{main}"), None).await;
        assert_eq!(old_main["isDefault"], false);

        let (status, renamed) = send(
            &app,
            Method::PATCH,
            &format!("/branches/{feature_id}"),
            Some(json!({ "name": "Release" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Release");
        assert_eq!(renamed["slug"], "feature");

        let (status, chain) = send(
            &app,
            Method::GET,
            &format!("/branches/{feature_id}/lineage"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chain.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_branch_is_not_found() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/branches/{}", BranchId::new()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn diff_of_branch_with_itself_is_empty() {
        let app = app();
        let (_, main) = space(&app).await;
        set(&app, &main, "greeting", "en", "Hello").await;

        let (status, diff) = send(
            &app,
            Method::GET,
            &format!("/branches/{main}/diff/{main}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        for bucket in ["added", "modified", "deleted"] {
            assert!(diff[bucket].as_array().unwrap().is_empty());
        }

        // Merging a branch into itself is still refused.
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/branches/{main}/merge"),
            Some(json!({ "targetBranchId": main })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn locked_down_server_rejects_anonymous() {
        let glossa = Glossa::open(StoreConfig::in_memory()).unwrap();
        let auth = ConfigAuth::new(&AuthConfig {
            tokens: [("s3cret".to_string(), "olivia".to_string())].into(),
            trust_user_header: false,
            allow_anonymous: false,
        });
        let app = router::build_router(AppState::new(Arc::new(glossa), Arc::new(auth)));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/spaces")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "projectId": "acme", "name": "Web" }).to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/spaces")
            .header("authorization", "Bearer s3cret")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "projectId": "acme", "name": "Web" }).to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn missing_role_is_forbidden() {
        let store = glossa_sdk::SqliteStore::open(StoreConfig::in_memory()).unwrap();
        let access = StaticAccessList::new();
        access.grant("olivia", "acme", glossa_sdk::Role::Viewer);
        let glossa = Glossa::builder(Arc::new(store))
            .access(Arc::new(access))
            .build();
        let auth = ConfigAuth::new(&AuthConfig::default());
        let app = router::build_router(AppState::new(Arc::new(glossa), Arc::new(auth)));

        let (status, _) = send(
            &app,
            Method::POST,
            "/spaces",
            Some(json!({ "projectId": "acme", "name": "Web" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
