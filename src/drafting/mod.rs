//! Drafting - client for the external generative-content service
//!
//! The service turns a topic into a draft post, polishes an existing draft,
//! and produces cover images. Any failure leaves the caller's state as it was;
//! nothing here touches the repository.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::DraftingConfig;

/// Drafting failures
#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Drafting service is not configured")]
    Disabled,

    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("Drafting request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Drafting service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Image generation returned no URL")]
    EmptyImage,
}

/// A generated post draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub content: String,
}

/// A refined version of an existing draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinedDraft {
    pub refined_title: String,
    pub refined_content: String,
}

/// Generative operations available to post authors
#[async_trait]
pub trait Drafter: Send + Sync {
    async fn generate_post(&self, topic: &str) -> Result<PostDraft, DraftError>;

    async fn refine_post(&self, title: &str, content: &str) -> Result<RefinedDraft, DraftError>;

    /// Returns an image reference (URL or data URI)
    async fn generate_image(&self, prompt: &str) -> Result<String, DraftError>;
}

/// Used when no service is configured
#[derive(Debug, Default)]
pub struct DisabledDrafter;

#[async_trait]
impl Drafter for DisabledDrafter {
    async fn generate_post(&self, _topic: &str) -> Result<PostDraft, DraftError> {
        Err(DraftError::Disabled)
    }

    async fn refine_post(&self, _title: &str, _content: &str) -> Result<RefinedDraft, DraftError> {
        Err(DraftError::Disabled)
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, DraftError> {
        Err(DraftError::Disabled)
    }
}

#[derive(Serialize)]
struct TopicRequest<'a> {
    topic: &'a str,
}

#[derive(Serialize)]
struct RefineRequest<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    image_url: String,
}

/// JSON-over-HTTP client for the drafting service
#[derive(Debug, Clone)]
pub struct HttpDrafter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpDrafter {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DraftError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn call<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, DraftError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let url = format!("{}/{}", self.endpoint, path);
        tracing::debug!("Calling drafting service: {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Drafting service {} returned {}", path, status);
            return Err(DraftError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Resp>().await?)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), DraftError> {
    if value.trim().is_empty() {
        return Err(DraftError::EmptyInput(field));
    }
    Ok(())
}

#[async_trait]
impl Drafter for HttpDrafter {
    async fn generate_post(&self, topic: &str) -> Result<PostDraft, DraftError> {
        require(topic, "topic")?;
        self.call("generate-post", &TopicRequest { topic }).await
    }

    async fn refine_post(&self, title: &str, content: &str) -> Result<RefinedDraft, DraftError> {
        require(title, "title")?;
        require(content, "content")?;
        self.call("refine-post", &RefineRequest { title, content }).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, DraftError> {
        require(prompt, "prompt")?;
        let response: ImageResponse = self.call("generate-image", &ImageRequest { prompt }).await?;
        if response.image_url.is_empty() {
            return Err(DraftError::EmptyImage);
        }
        Ok(response.image_url)
    }
}

/// Build the drafter described by `config`
pub fn from_config(config: &DraftingConfig) -> Result<Arc<dyn Drafter>, DraftError> {
    match &config.endpoint {
        Some(endpoint) if !endpoint.trim().is_empty() => {
            let drafter = HttpDrafter::new(
                endpoint.as_str(),
                config.api_key.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            tracing::info!("Drafting service at {}", endpoint);
            Ok(Arc::new(drafter))
        }
        _ => Ok(Arc::new(DisabledDrafter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Stand-in drafting service on an ephemeral port
    async fn spawn_service() -> String {
        let app = Router::new()
            .route(
                "/generate-post",
                post(|Json(body): Json<Value>| async move {
                    let topic = body["topic"].as_str().unwrap_or_default().to_string();
                    Json(json!({ "title": format!("Sobre {}", topic), "content": "Texto" }))
                }),
            )
            .route(
                "/refine-post",
                post(|Json(body): Json<Value>| async move {
                    let title = body["title"].as_str().unwrap_or_default().to_string();
                    Json(json!({ "refinedTitle": format!("{}!", title), "refinedContent": "Melhor" }))
                }),
            )
            .route(
                "/generate-image",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "quota exceeded") }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_disabled_drafter() {
        let drafter = from_config(&DraftingConfig::default()).unwrap();
        assert!(matches!(
            drafter.generate_post("liberdade").await,
            Err(DraftError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_empty_input_rejected_before_request() {
        let drafter =
            HttpDrafter::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        assert!(matches!(
            drafter.generate_post("  ").await,
            Err(DraftError::EmptyInput("topic"))
        ));
        assert!(matches!(
            drafter.refine_post("Título", "").await,
            Err(DraftError::EmptyInput("content"))
        ));
    }

    #[tokio::test]
    async fn test_generate_and_refine() {
        let endpoint = spawn_service().await;
        let drafter = HttpDrafter::new(endpoint, None, Duration::from_secs(5)).unwrap();

        let draft = drafter.generate_post("liberdade").await.unwrap();
        assert_eq!(draft.title, "Sobre liberdade");
        assert_eq!(draft.subtitle, None);

        let refined = drafter.refine_post("Ética", "rascunho").await.unwrap();
        assert_eq!(refined.refined_title, "Ética!");
        assert_eq!(refined.refined_content, "Melhor");
    }

    #[tokio::test]
    async fn test_service_error_is_reported() {
        let endpoint = spawn_service().await;
        let drafter = HttpDrafter::new(endpoint, None, Duration::from_secs(5)).unwrap();

        match drafter.generate_image("caverna de Platão").await {
            Err(DraftError::Service { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
