/// Sidekiq key layout, optionally under a namespace (`<namespace>:queues` and so on).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keys {
    prefix: String,
}

impl Keys {
    pub fn with_namespace(namespace: &str) -> Self {
        if namespace.is_empty() {
            return Self::default();
        }
        Self {
            prefix: format!("{namespace}:"),
        }
    }

    /// Set of every queue name that has seen a job.
    pub fn queues(&self) -> String {
        format!("{}queues", self.prefix)
    }

    /// List of pending jobs for `queue`.
    pub fn queue(&self, queue: &str) -> String {
        format!("{}queue:{queue}", self.prefix)
    }

    /// Sorted set of scheduled jobs, scored by Unix seconds.
    pub fn schedule(&self) -> String {
        format!("{}schedule", self.prefix)
    }
}
