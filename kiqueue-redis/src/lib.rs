#![doc = include_str!("../README.md")]

pub mod keys;
pub mod queue;

#[cfg(test)]
mod mock;

pub use keys::Keys;
pub use queue::RedisQueue;
