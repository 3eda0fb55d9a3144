use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{NotificationApi, PageRequest, SessionProvider};
use crate::config::CoreConfig;
use crate::constants::paths;
use crate::error::FeedError;
use crate::models::NotificationRecord;

/// Unread-count endpoint answers either a bare number or a small object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UnreadCountResponse {
    Bare(u64),
    Count { count: u64 },
    #[serde(rename_all = "camelCase")]
    UnreadCount { unread_count: u64 },
}

impl UnreadCountResponse {
    fn value(&self) -> u64 {
        match self {
            UnreadCountResponse::Bare(n) => *n,
            UnreadCountResponse::Count { count } => *count,
            UnreadCountResponse::UnreadCount { unread_count } => *unread_count,
        }
    }
}

/// Notification REST client
pub struct HttpNotificationApi {
    client: reqwest::Client,
    config: CoreConfig,
    session: Arc<dyn SessionProvider>,
}

impl HttpNotificationApi {
    pub fn new(config: CoreConfig, session: Arc<dyn SessionProvider>) -> Self {
        Self::with_client(reqwest::Client::new(), config, session)
    }

    pub fn with_client(
        client: reqwest::Client,
        config: CoreConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            client,
            config,
            session,
        }
    }

    fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, FeedError> {
        let token = self.session.bearer_token().ok_or(FeedError::NotAuthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, FeedError> {
        let response = self.authorized(builder)?.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status { status, body });
        }

        Ok(response)
    }
}

/// Query parameters for a page request
pub(crate) fn page_query(request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("status", request.mode.as_query().to_string()),
        ("size", request.size.to_string()),
    ];
    if let Some(cursor) = &request.cursor {
        query.push(("cursor", cursor.as_str().to_string()));
    }
    query
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn list_page(&self, request: &PageRequest) -> Result<Vec<NotificationRecord>, FeedError> {
        let url = self.config.url(paths::LIST);
        tracing::debug!(
            mode = request.mode.as_query(),
            size = request.size,
            cursor = request.cursor.as_ref().map(|c| c.as_str()),
            "fetching notification page"
        );

        let response = self
            .send(self.client.get(&url).query(&page_query(request)))
            .await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn unread_count(&self) -> Result<u64, FeedError> {
        let url = self.config.url(paths::UNREAD_COUNT);
        let response = self.send(self.client.get(&url)).await?;
        let body = response.bytes().await?;
        let parsed: UnreadCountResponse = serde_json::from_slice(&body)?;
        Ok(parsed.value())
    }

    async fn mark_read(&self, id: &str) -> Result<(), FeedError> {
        let url = self.config.url(&paths::mark_read(id));
        self.send(self.client.patch(&url)).await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), FeedError> {
        let url = self.config.url(paths::READ_ALL);
        self.send(self.client.patch(&url)).await?;
        Ok(())
    }
}
