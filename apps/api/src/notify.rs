//! Completion notifications. Fire-and-forget: the pipeline never waits on
//! delivery and a failure here never changes a document's status.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct AnalysisCompleted {
    analysis_id: Uuid,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn analysis_completed(&self, analysis_id: Uuid) -> Result<(), NotifyError>;
}

/// Pushes `{"analysis_id": "..."}` onto a Redis list. The multiplexed
/// connection is opened on first use and shared by every later notification;
/// a failed connect is not cached.
pub struct RedisNotifier {
    client: redis::Client,
    queue: String,
    connection: OnceCell<MultiplexedConnection>,
}

impl RedisNotifier {
    pub fn new(client: redis::Client, queue: String) -> Self {
        Self {
            client,
            queue,
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, NotifyError> {
        let conn = self
            .connection
            .get_or_try_init(|| self.client.get_multiplexed_async_connection())
            .await?;
        Ok(conn.clone())
    }
}

pub fn encode_payload(analysis_id: Uuid) -> Result<String, NotifyError> {
    Ok(serde_json::to_string(&AnalysisCompleted { analysis_id })?)
}

#[async_trait]
impl Notifier for RedisNotifier {
    async fn analysis_completed(&self, analysis_id: Uuid) -> Result<(), NotifyError> {
        let payload = encode_payload(analysis_id)?;
        let mut conn = self.connection().await?;
        let depth: i64 = conn.rpush(&self.queue, payload).await?;
        debug!("Queued completion of {analysis_id} on {} (depth {depth})", self.queue);
        Ok(())
    }
}
