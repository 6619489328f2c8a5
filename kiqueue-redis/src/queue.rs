use crate::keys::Keys;
use anyhow::Context;
use async_trait::async_trait;
use kiqueue::core::job::Job;
use kiqueue::core::queue::{Queue, QueueError};
use kiqueue::core::DateTime;
use redis::aio::{ConnectionLike, ConnectionManager};
use redis::AsyncCommands;
use serde::Serialize;
use tracing::instrument;

/// An implementation of the Queue backed by Redis, writing the keys Sidekiq reads.
///
/// The connection handle belongs to the caller: it is never dialed or reconfigured here. Every
/// operation clones it for its own duration, so anything cheap to clone and safe to share works
/// (`ConnectionManager`, `MultiplexedConnection`). Timeouts and reconnects are the handle's job.
#[derive(Clone)]
pub struct RedisQueue<C = ConnectionManager> {
    pool: C,
    keys: Keys,
}

impl<C> RedisQueue<C>
where
    C: ConnectionLike + Clone + Send + Sync,
{
    pub fn with_pool(pool: C) -> Self {
        Self {
            pool,
            keys: Keys::default(),
        }
    }

    /// Put every key under `namespace`, the way redis-namespace does for Sidekiq.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.keys = Keys::with_namespace(namespace);
        self
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }
}

#[async_trait]
impl<C> Queue for RedisQueue<C>
where
    C: ConnectionLike + Clone + Send + Sync,
{
    /// `SADD queues <name>` and `LPUSH queue:<name> <job>` in one pipeline. Consumers `BRPOP`, so
    /// the newest job sits at the tail of their FIFO. The two writes are not atomic.
    #[instrument(skip_all, fields(jid = %job.jid(), queue = job.queue(), payload_size))]
    async fn enqueue<A>(&self, job: &Job<A>) -> Result<(), QueueError>
    where
        A: Serialize + Sync,
    {
        let payload = job.payload()?;
        tracing::Span::current().record("payload_size", &payload.len());

        let queues_key = self.keys.queues();
        let queue_key = self.keys.queue(job.queue());
        let mut conn = self.pool.clone();
        let (added, length): (i64, i64) = redis::pipe()
            .sadd(&queues_key, job.queue())
            .lpush(&queue_key, &payload)
            .query_async(&mut conn)
            .await
            .context("Failed to add job to the queue")?;

        // 0 means the queue was already registered.
        if !(0..=1).contains(&added) {
            return Err(QueueError::UnexpectedReply {
                command: "SADD",
                key: queues_key,
                reply: added,
            });
        }
        if length < 1 {
            return Err(QueueError::UnexpectedReply {
                command: "LPUSH",
                key: queue_key,
                reply: length,
            });
        }
        tracing::debug!(length, "Job enqueued");
        Ok(())
    }

    /// `ZADD schedule <unix seconds> <job>`. An identical payload already in the set only gets
    /// its score moved, which Redis reports as 0 added.
    #[instrument(skip_all, fields(jid = %job.jid(), queue = job.queue(), at = %at, payload_size))]
    async fn enqueue_at<A>(&self, job: &Job<A>, at: DateTime) -> Result<(), QueueError>
    where
        A: Serialize + Sync,
    {
        let payload = job.payload()?;
        tracing::Span::current().record("payload_size", &payload.len());

        let schedule_key = self.keys.schedule();
        let mut conn = self.pool.clone();
        let added: i64 = conn
            .zadd(&schedule_key, &payload, at.timestamp())
            .await
            .context("Failed to add job to the schedule")?;

        if !(0..=1).contains(&added) {
            return Err(QueueError::UnexpectedReply {
                command: "ZADD",
                key: schedule_key,
                reply: added,
            });
        }
        tracing::debug!(score = at.timestamp(), "Job scheduled");
        Ok(())
    }
}
