//! Server identity.
//!
//! A server is identified by a small, dense, caller-assigned integer. The
//! load balancer never allocates ids itself; it only ever routes by an id a
//! caller already chose.

use std::fmt;

/// Identifier for a logical server participating in the ring.
///
/// Newtype over `u32` so comparisons and hashing are cheap; dense small ids
/// are expected (see the data model notes on `ServerId`).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ServerId(pub u32);

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ServerId {
    fn from(id: u32) -> Self {
        ServerId(id)
    }
}
