#![doc = include_str!("../README.md")]

pub mod core;

/// Re-exports to simplify importing this crate types.
pub mod prelude {
    pub use super::core::{
        jid::{new_jid, Jid},
        job::Job,
        queue::{Queue, QueueError},
        wire::SerializeError,
        DateTime, Duration, Utc,
    };
}
