pub use jid::{new_jid, Jid};

pub type DateTime = chrono::DateTime<chrono::Utc>;
pub use chrono::{Duration, Utc};
pub use serde_json;

pub mod jid;
pub mod job;
pub mod queue;
pub mod wire;
