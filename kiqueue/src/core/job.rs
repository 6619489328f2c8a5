use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::core::jid::{new_jid, Jid};
use crate::core::queue::{Queue, QueueError};
use crate::core::wire::{SerializeError, WireJob};
use crate::core::{DateTime, Duration};

/// A job ready to be handed to a Sidekiq-compatible consumer.
///
/// The id and the enqueue timestamp are fixed at construction and nothing can change the record
/// afterwards. The same job can be enqueued any number of times; every call serializes it again
/// and adds a separate entry to the store.
///
/// ## Example
/// ```rust
/// use kiqueue::prelude::Job;
/// use serde_json::json;
///
/// let job = Job::new("HardWorker", "default", vec![json!("bob"), json!(5)], 0);
/// assert_eq!(job.jid().as_str().len(), 24);
/// assert!(job.to_json().unwrap().contains(r#""args":["bob",5]"#));
/// ```
///
/// Arguments can be any `Serialize` type, `serde_json::Value` is the default. Whether they are
/// representable as JSON is only checked when the job is serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Job<A = Value> {
    jid: Jid,
    retry: u32,
    queue: String,
    class: String,
    args: Vec<A>,
    enqueued_at: i64,
}

impl<A> Job<A> {
    /// Build a job for consumer-side handler `class` on `queue`. `retry` is how many times the
    /// consumer may retry it.
    pub fn new(
        class: impl Into<String>,
        queue: impl Into<String>,
        args: Vec<A>,
        retry: u32,
    ) -> Self {
        Self {
            jid: new_jid(),
            retry,
            queue: queue.into(),
            class: class.into(),
            args,
            enqueued_at: Utc::now().timestamp(),
        }
    }

    pub fn jid(&self) -> &Jid {
        &self.jid
    }

    pub fn retry(&self) -> u32 {
        self.retry
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn args(&self) -> &[A] {
        &self.args
    }

    /// Unix timestamp (seconds) of construction.
    pub fn enqueued_at(&self) -> i64 {
        self.enqueued_at
    }
}

impl<A: Serialize> Job<A> {
    /// Wire representation of the job.
    pub fn to_json(&self) -> Result<String, SerializeError> {
        WireJob {
            jid: self.jid.as_str(),
            retry: self.retry,
            queue: &self.queue,
            class: &self.class,
            args: &self.args,
            enqueued_at: self.enqueued_at,
        }
        .to_json()
    }

    /// Everything a store needs to write before it writes anything: the job is checked for
    /// routing names and serialized.
    pub fn payload(&self) -> Result<String, QueueError> {
        if self.queue.is_empty() {
            return Err(QueueError::InvalidJob("queue"));
        }
        if self.class.is_empty() {
            return Err(QueueError::InvalidJob("class"));
        }
        Ok(self.to_json()?)
    }
}

impl<A: Serialize + Sync> Job<A> {
    /// Push the job to its queue now.
    pub async fn enqueue<Q: Queue>(&self, queue: &Q) -> Result<(), QueueError> {
        queue.enqueue(self).await
    }

    /// Schedule the job for `at`.
    pub async fn enqueue_at<Q: Queue>(&self, queue: &Q, at: DateTime) -> Result<(), QueueError> {
        queue.enqueue_at(self, at).await
    }

    /// Schedule the job for `delay` from now.
    pub async fn enqueue_in<Q: Queue>(
        &self,
        queue: &Q,
        delay: Duration,
    ) -> Result<(), QueueError> {
        queue.enqueue_in(self, delay).await
    }
}
