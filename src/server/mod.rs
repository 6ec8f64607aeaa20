//! HTTP server exposing the blog as a JSON API

mod api;
mod error;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

use crate::auth::AdminGate;
use crate::drafting::Drafter;
use crate::store::Repository;
use crate::Anomia;

/// Server state shared by all handlers
pub struct AppState {
    pub repo: Repository,
    pub gate: AdminGate,
    pub drafter: Arc<dyn Drafter>,
    /// Image hint used when a new post does not supply one
    pub default_image_hint: String,
}

impl AppState {
    pub fn from_site(anomia: &Anomia) -> Result<Self> {
        Ok(Self {
            repo: anomia.open_repository()?,
            gate: AdminGate::new(&anomia.config.admin),
            drafter: anomia.drafter()?,
            default_image_hint: anomia.config.images.default_hint.clone(),
        })
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/posts", get(api::list_posts).post(api::create_post))
        .route(
            "/api/posts/:id",
            get(api::get_post)
                .patch(api::update_post)
                .delete(api::delete_post),
        )
        .route(
            "/api/posts/:id/comments",
            get(api::list_comments).post(api::create_comment),
        )
        .route("/api/login", post(api::login))
        .route("/api/logout", post(api::logout))
        .route("/api/drafts/generate", post(api::generate_draft))
        .route("/api/drafts/refine", post(api::refine_draft))
        .route("/api/drafts/image", post(api::generate_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server and run until Ctrl+C
pub async fn start(anomia: &Anomia, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_site(anomia)?);
    tracing::info!("Using {} store", state.repo.backend());
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminConfig;
    use crate::drafting::DisabledDrafter;
    use crate::store::{Author, ContentStore, ImagePlaceholder, JsonFileStore, MemoryStore};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app_with_store(store: Arc<dyn ContentStore>) -> Router {
        let repo = Repository::new(
            store,
            Author {
                name: "Ana".to_string(),
                image: String::new(),
            },
            ImagePlaceholder::new("https://picsum.photos/seed/:seed/1200/800"),
        );
        router(Arc::new(AppState {
            repo,
            gate: AdminGate::new(&AdminConfig {
                password: "password".to_string(),
                ..Default::default()
            }),
            drafter: Arc::new(DisabledDrafter),
            default_image_hint: "filosofia abstrata".to_string(),
        }))
    }

    fn app() -> Router {
        app_with_store(Arc::new(MemoryStore::new()))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
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

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/login",
            None,
            Some(json!({ "username": "admin", "password": "password" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    fn valid_post() -> Value {
        json!({
            "title": "A Caverna",
            "subtitle": "Sombras",
            "content": "C".repeat(15),
            "tags": "x, y"
        })
    }

    #[tokio::test]
    async fn test_post_lifecycle() {
        let app = app();
        let token = login(&app).await;

        let (status, created) = send(&app, "POST", "/api/posts", Some(&token), Some(valid_post())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["tags"], json!(["x", "y"]));
        assert_eq!(created["imageHint"], "filosofia abstrata");
        assert!(created["imageUrl"].as_str().unwrap().starts_with("https://picsum.photos/seed/"));
        let id = created["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/posts/{}/comments", id),
            None,
            Some(json!({ "author": "Bob", "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, detail) = send(&app, "GET", &format!("/api/posts/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["title"], "A Caverna");
        assert_eq!(detail["comments"].as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &app,
            "PATCH",
            &format!("/api/posts/{}", id),
            Some(&token),
            Some(json!({ "title": "A Saída da Caverna" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "A Saída da Caverna");
        assert_eq!(updated["subtitle"], "Sombras");

        let (status, _) = send(&app, "DELETE", &format!("/api/posts/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", &format!("/api/posts/{}", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &format!("/api/posts/{}", id), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, comments) =
            send(&app, "GET", &format!("/api/posts/{}/comments", id), None, None).await;
        assert_eq!(comments, json!([]));
    }

    #[tokio::test]
    async fn test_mutations_require_login() {
        let app = app();
        let (status, _) = send(&app, "POST", "/api/posts", None, Some(valid_post())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "DELETE", "/api/posts/p1", Some("forged"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            "POST",
            "/api/login",
            None,
            Some(json!({ "username": "admin", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let app = app();
        let token = login(&app).await;
        let (status, _) = send(&app, "POST", "/api/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "POST", "/api/posts", Some(&token), Some(valid_post())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validation_errors_name_fields() {
        let app = app();
        let token = login(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/posts",
            Some(&token),
            Some(json!({ "title": "A", "subtitle": "B", "content": "curto" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["fields"]["title"].is_array());
        assert!(body["fields"]["content"].is_array());

        let (status, body) = send(
            &app,
            "POST",
            "/api/posts/p1/comments",
            None,
            Some(json!({ "author": "B", "content": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["fields"]["author"].is_array());
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let app = app();
        let token = login(&app).await;
        let (status, _) = send(
            &app,
            "PATCH",
            "/api/posts/nonexistent-id",
            Some(&token),
            Some(json!({ "title": "Fantasma" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, posts) = send(&app, "GET", "/api/posts", None, None).await;
        assert_eq!(posts, json!([]));
    }

    #[tokio::test]
    async fn test_search_query() {
        let app = app();
        let token = login(&app).await;
        send(&app, "POST", "/api/posts", Some(&token), Some(valid_post())).await;
        let mut other = valid_post();
        other["title"] = json!("Nietzsche");
        other["tags"] = json!(["vontade"]);
        send(&app, "POST", "/api/posts", Some(&token), Some(other)).await;

        let (_, all) = send(&app, "GET", "/api/posts", None, None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, found) = send(&app, "GET", "/api/posts?query=VONTADE", None, None).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["title"], "Nietzsche");
    }

    #[tokio::test]
    async fn test_drafting_disabled() {
        let app = app();
        let token = login(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/drafts/generate",
            Some(&token),
            Some(json!({ "topic": "liberdade" })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_broken_store_degrades_reads_and_fails_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "not json").unwrap();
        let app = app_with_store(Arc::new(JsonFileStore::new(&path)));
        let token = login(&app).await;

        let (status, posts) = send(&app, "GET", "/api/posts", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(posts, json!([]));

        let (status, _) = send(&app, "POST", "/api/posts", Some(&token), Some(valid_post())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&app, "GET", "/api/posts/p1", None, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_rejected_bodies_use_error_shape() {
        let app = app();
        let token = login(&app).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/posts")
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 400);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &app,
            "POST",
            "/api/posts",
            Some(&token),
            Some(json!({ "subtitle": "B", "content": "0123456789" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], 422);
    }

    #[tokio::test]
    async fn test_patched_date_is_returned_as_stored() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with_store(Arc::new(JsonFileStore::new(dir.path().join("db.json"))));
        let token = login(&app).await;
        let (_, created) = send(&app, "POST", "/api/posts", Some(&token), Some(valid_post())).await;
        let uri = format!("/api/posts/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(
            &app,
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "date": "2024-01-15T10:30:00.123456Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["date"], "2024-01-15T10:30:00.123Z");

        let (_, fetched) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(fetched["date"], updated["date"]);
    }
}
