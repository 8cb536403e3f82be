//! Search indexer clients.
//!
//! The index itself is an external service; the forum only tells it which
//! documents to (re)index or drop. It fetches content on its own.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use super::traits::BaseSearchIndexer;
use crate::common::DocumentId;

/// HTTP client for an external indexer exposing
/// `POST {base}/documents` and `DELETE {base}/documents/{id}`.
pub struct HttpSearchIndexer {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertRequest<'a> {
    document_id: &'a str,
}

impl HttpSearchIndexer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BaseSearchIndexer for HttpSearchIndexer {
    async fn upsert(&self, document_id: &DocumentId) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/documents", self.base_url))
            .json(&UpsertRequest {
                document_id: document_id.as_str(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "search upsert rejected");
            anyhow::bail!("search indexer error {}: {}", status, body);
        }

        debug!(document_id = %document_id, "search index updated");
        Ok(())
    }

    async fn remove(&self, document_id: &DocumentId) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/documents/{}", self.base_url, document_id))
            .send()
            .await?;

        // Already gone is fine.
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "search remove rejected");
            anyhow::bail!("search indexer error {}: {}", status, body);
        }

        debug!(document_id = %document_id, "search index entry removed");
        Ok(())
    }
}

/// Used when no indexer is configured.
pub struct NoopSearchIndexer;

#[async_trait]
impl BaseSearchIndexer for NoopSearchIndexer {
    async fn upsert(&self, _document_id: &DocumentId) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _document_id: &DocumentId) -> Result<()> {
        Ok(())
    }
}
