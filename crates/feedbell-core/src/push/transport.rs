use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use super::sse::{SseDecoder, SseFrame};
use crate::api::SessionProvider;
use crate::error::FeedError;

pub type FrameStream = BoxStream<'static, Result<SseFrame, FeedError>>;

/// Opens the long-lived event stream. The channel owns reconnection; a
/// transport only reports failure by ending or erroring its stream.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn open(&self, endpoint: &str) -> Result<FrameStream, FeedError>;
}

/// `text/event-stream` over a streaming reqwest body
pub struct HttpPushTransport {
    client: reqwest::Client,
    session: Arc<dyn SessionProvider>,
}

impl HttpPushTransport {
    pub fn new(session: Arc<dyn SessionProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            session,
        }
    }
}

#[async_trait]
impl PushTransport for HttpPushTransport {
    async fn open(&self, endpoint: &str) -> Result<FrameStream, FeedError> {
        let token = self
            .session
            .bearer_token()
            .ok_or(FeedError::NotAuthenticated)?;

        let response = self
            .client
            .get(endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status { status, body });
        }

        let frames = response
            .bytes_stream()
            .scan(SseDecoder::new(), |decoder, chunk| {
                let batch: Vec<Result<SseFrame, FeedError>> = match chunk {
                    Ok(bytes) => decoder.push(&bytes).into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(FeedError::from(e))],
                };
                futures::future::ready(Some(stream::iter(batch)))
            })
            .flatten()
            .boxed();

        Ok(frames)
    }
}
