use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Value};
use std::any::Any;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::docs::model::Document;

pub mod append;
pub mod count;
pub mod model;

const DOCS_API_BASE: &str = "https://docs.googleapis.com/";

/// Failures reported by the Docs API that callers react to individually.
/// Carried inside `anyhow::Error`; recover with `downcast_ref`.
#[derive(Debug, Error)]
pub enum DocsError {
    #[error("access denied to document: {0}")]
    Forbidden(String),
    #[error("rate limited by Docs API: {0}")]
    RateLimited(String),
    #[error("docs error {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

impl DocsError {
    /// True when a batch was refused because of its bullet preset.
    pub fn is_bullet_preset_rejection(&self) -> bool {
        match self {
            DocsError::Rejected { status, body } => {
                *status == StatusCode::BAD_REQUEST
                    && (body.contains("bulletPreset") || body.contains("BULLET_CHECKBOX"))
            }
            _ => false,
        }
    }
}

#[async_trait]
pub trait DocsService: Send + Sync + Any {
    async fn get_document(&self, document_id: &str) -> Result<Document>;

    async fn batch_update(&self, document_id: &str, requests: Vec<Value>) -> Result<()>;
}

#[derive(Clone)]
pub struct DocsClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for DocsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DocsClient {
    pub fn new(token: String) -> Result<Self> {
        let base_url = Url::parse(DOCS_API_BASE).context("invalid default Docs URL")?;
        Self::with_base_url(token, base_url)
    }

    pub fn with_base_url(token: String, base_url: Url) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("link-inbox/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    fn document_url(&self, document_id: &str) -> Result<Url> {
        self.base_url
            .join(&format!("v1/documents/{}", document_id))
            .context("invalid Docs base URL")
    }

    pub fn build_get_request(&self, document_id: &str) -> Result<reqwest::Request> {
        self.http
            .get(self.document_url(document_id)?)
            .bearer_auth(&self.token)
            .build()
            .context("failed to build Docs request")
    }

    pub fn build_batch_update_request(
        &self,
        document_id: &str,
        requests: &[Value],
    ) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join(&format!("v1/documents/{}:batchUpdate", document_id))
            .context("invalid Docs base URL")?;
        self.http
            .post(endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "requests": requests }))
            .build()
            .context("failed to build Docs request")
    }

    async fn execute(&self, request: reqwest::Request) -> Result<String> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "docs request");

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Docs API")?;
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        debug!(%status, bytes = body.len(), "docs response");

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::FORBIDDEN => {
                warn!(%url, "docs access denied");
                Err(DocsError::Forbidden(body).into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("rate limited by Docs API");
                Err(DocsError::RateLimited(body).into())
            }
            _ => {
                warn!(%status, body = %body, "docs API error");
                Err(DocsError::Rejected { status, body }.into())
            }
        }
    }
}

#[async_trait]
impl DocsService for DocsClient {
    async fn get_document(&self, document_id: &str) -> Result<Document> {
        let request = self.build_get_request(document_id)?;
        let body = self.execute(request).await?;
        serde_json::from_str(&body).context("invalid Docs document JSON")
    }

    async fn batch_update(&self, document_id: &str, requests: Vec<Value>) -> Result<()> {
        let count = requests.len();
        let request = self.build_batch_update_request(document_id, &requests)?;
        self.execute(request).await?;
        info!(document_id, requests = count, "docs batch update applied");
        Ok(())
    }
}
