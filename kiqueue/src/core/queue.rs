use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::core::job::Job;
use crate::core::wire::SerializeError;
use crate::core::{DateTime, Duration};

/// An interface to the store that consumers read jobs from. Responsible for making a job visible
/// either right away or at a point in time. For an implementation look at `kiqueue_redis`.
///
/// Implementations hold a handle to a caller-owned connection pool. They must serialize the job
/// before touching the store, so a job that fails to serialize leaves no trace.
///
/// ### Atomicity
///
/// An immediate enqueue may need more than one write. Nothing here promises those writes land
/// together; consumers have to tolerate a queue name being registered without a job behind it.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Make the job available to consumers of its queue right away.
    async fn enqueue<A>(&self, job: &Job<A>) -> Result<(), QueueError>
    where
        A: Serialize + Sync;

    /// Make the job available to consumers once `at` has passed.
    async fn enqueue_at<A>(&self, job: &Job<A>, at: DateTime) -> Result<(), QueueError>
    where
        A: Serialize + Sync;

    /// Make the job available to consumers once `delay` has elapsed from now.
    async fn enqueue_in<A>(&self, job: &Job<A>, delay: Duration) -> Result<(), QueueError>
    where
        A: Serialize + Sync,
    {
        let when = Utc::now()
            .checked_add_signed(delay)
            .ok_or(QueueError::InvalidDelay(delay))?;
        self.enqueue_at(job, when).await
    }
}

/// Errors related to queue operation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum QueueError {
    /// Encountered an error when tried to serialize the job. Nothing was written.
    #[error("Failed to serialize job")]
    Serialization {
        #[from]
        source: SerializeError,
    },
    #[error("Job is missing a {0} name")]
    InvalidJob(&'static str),
    #[error("Delay is out of range: {0:?}")]
    InvalidDelay(Duration),
    /// The store accepted the command but replied with something the write protocol rules out.
    #[error("Couldn't insert job into {key}: unexpected {command} reply {reply}")]
    UnexpectedReply {
        command: &'static str,
        key: String,
        reply: i64,
    },
    /// The write never completed, e.g. the connection failed.
    #[error(transparent)]
    Insertion(#[from] anyhow::Error),
}

impl QueueError {
    /// Whether the failure happened while talking to the store, as opposed to before any write.
    pub fn is_insertion(&self) -> bool {
        matches!(
            self,
            QueueError::UnexpectedReply { .. } | QueueError::Insertion(_)
        )
    }
}
