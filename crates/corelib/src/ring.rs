//! The consistent-hash ring: a sorted sequence of replica tags and the two
//! ordered-search primitives everything else is built on.

use crate::ServerId;

/// A server's 32-bit position on the ring.
pub type HashValue = u32;

/// One virtual replica: a hashed position owned by a server.
///
/// `Ord` is derived in field order (`hash` then `id`), which is exactly the
/// `(hash, id)` comparison the ring's sortedness invariant is defined over —
/// ties on `hash` break toward the smaller `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplicaTag {
    pub hash: HashValue,
    pub id: ServerId,
}

/// The sorted ring of replica tags.
///
/// Backed by a `Vec`, which already gives the amortized-doubling growth and
/// ordered binary search the design calls for; there is no separate
/// capacity/length bookkeeping to hand-roll.
#[derive(Debug, Default)]
pub struct Ring {
    tags: Vec<ReplicaTag>,
}

impl Ring {
    pub fn new() -> Self {
        Self { tags: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the tag at `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= self.len()`.
    pub fn tag_at(&self, idx: usize) -> ReplicaTag {
        self.tags[idx]
    }

    /// The object-lookup rule: the id of the tag with the smallest
    /// `(hash, id)` such that `hash >= h`, wrapping to `tags[0]` if none
    /// exists. Returns `None` on an empty ring rather than the undefined
    /// behavior the design allows, since panicking for free is cheap in
    /// Rust and far easier for callers to guard against.
    pub fn locate_object(&self, h: HashValue) -> Option<ServerId> {
        if self.tags.is_empty() {
            return None;
        }
        let idx = self.tags.partition_point(|t| t.hash < h);
        let idx = if idx == self.tags.len() { 0 } else { idx };
        Some(self.tags[idx].id)
    }

    /// The server-insertion rule: the index at which `(h, id)` must be
    /// inserted to keep the ring sorted. If a tag with the identical
    /// `(h, id)` pair already exists, returns its index.
    pub fn locate_insert_slot(&self, h: HashValue, id: ServerId) -> usize {
        self.tags.partition_point(|t| (t.hash, t.id) < (h, id))
    }

    /// Inserts `tag` at `pos`, shifting everything from `pos` onward right.
    ///
    /// Callers MUST supply a `pos` obtained from [`Ring::locate_insert_slot`]
    /// — this does not re-derive sortedness on its own.
    pub fn insert_at(&mut self, pos: usize, tag: ReplicaTag) {
        self.tags.insert(pos, tag);
    }

    /// Removes and returns the tag at `pos`, shifting everything after it
    /// left.
    ///
    /// # Panics
    /// Panics if the ring is empty or `pos` is out of bounds — removing
    /// from an empty ring is a programmer error the design requires be
    /// reported, not silently absorbed.
    pub fn remove_at(&mut self, pos: usize) -> ReplicaTag {
        assert!(!self.tags.is_empty(), "remove_at called on an empty ring");
        self.tags.remove(pos)
    }

    /// Index of the tag immediately after `pos`, wrapping to `0`.
    ///
    /// # Panics
    /// Panics if the ring is empty.
    pub fn successor_index(&self, pos: usize) -> usize {
        (pos + 1) % self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplicaTag> {
        self.tags.iter()
    }
}
