//! The two pinned hash functions the whole ring is built on.
//!
//! Both are 32-bit, unsigned, and pure. Their exact bit patterns are
//! normative: the ring's lookup and insertion order depend on them being
//! reproduced bit-for-bit across implementations, so nothing here is
//! tunable or swappable behind a trait the way a partitioner abstraction
//! would suggest.

use crate::ServerId;

/// Replica-index multiplier used to derive a server's three replica keys.
///
/// `replica_key(id, 0) == id.0`; replica indices `1` and `2` add `R` and
/// `2R` respectively. This constant is part of the wire-compatible contract
/// with the reference implementation and must not change.
pub const REPLICA_FACTOR: u32 = 100_000;

/// Number of virtual replicas placed on the ring per server.
pub const REPLICAS_PER_SERVER: u32 = 3;

/// djb2 string hash, seeded at `5381`.
///
/// Operates directly on the bytes of `data`; unlike the C reference this
/// never reads a trailing NUL since Rust byte slices carry their own length.
pub fn hash_key(data: &[u8]) -> u32 {
    let mut hash: u32 = 5381;
    for &b in data {
        hash = (hash << 5).wrapping_add(hash).wrapping_add(b as u32);
    }
    hash
}

/// Integer bit-mix used to place a server's replica tags on the ring.
///
/// Credit: <https://stackoverflow.com/a/12996028/7883884>, the same mix the
/// reference C program cites.
pub fn hash_server(x: u32) -> u32 {
    let mut x = x;
    x = (x >> 16 ^ x).wrapping_mul(0x45d9f3b);
    x = (x >> 16 ^ x).wrapping_mul(0x45d9f3b);
    x >> 16 ^ x
}

/// Derives the replica input for server `id` at replica index `k` (0, 1, 2).
pub fn replica_key(id: ServerId, k: u32) -> u32 {
    k.wrapping_mul(REPLICA_FACTOR).wrapping_add(id.0)
}
