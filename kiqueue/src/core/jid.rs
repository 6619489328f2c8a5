use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Number of random bytes behind every job id.
pub const JID_BYTES: usize = 12;

/// Job identifier: 12 random bytes rendered as 24 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Jid(String);

impl Jid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Jid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate a fresh job id from the operating system's secure random source.
///
/// Panics if the OS random source fails. There is no sensible recovery from that.
pub fn new_jid() -> Jid {
    let mut bytes = [0u8; JID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Jid(hex::encode(bytes))
}
