//! The load balancer: owns the ring and every server's store, and
//! coordinates the remap protocol that keeps the placement invariant tight
//! across membership changes.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::hash::{hash_key, hash_server, replica_key, REPLICAS_PER_SERVER};
use crate::ring::{ReplicaTag, Ring};
use crate::server_store::ServerStore;
use crate::ServerId;

/// Front door for the distributed key-value store.
///
/// Owns the ring and every live server's [`ServerStore`] exclusively; there
/// is no other component that observes either. A caller needing shared
/// access across threads is expected to add their own lock around a
/// `LoadBalancer`, the same way the reference workspace treats locking as a
/// concern layered over a plain owned structure rather than baked in here.
#[derive(Debug, Default)]
pub struct LoadBalancer {
    ring: Ring,
    stores: HashMap<ServerId, ServerStore>,
}

impl LoadBalancer {
    pub fn new() -> Self {
        Self {
            ring: Ring::new(),
            stores: HashMap::new(),
        }
    }

    /// Number of live servers.
    pub fn server_count(&self) -> usize {
        self.stores.len()
    }

    /// Registers `id`, places its three replica tags on the ring, and
    /// donates any keys from each replica's new successor that now belong
    /// on the freshly split arc.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateServer`] if `id` is already live. The
    /// reference C program silently adds a second, duplicate set of replica
    /// tags in this case, which would break the ring-triplet invariant —
    /// this implementation rejects it instead (see DESIGN.md).
    pub fn add_server(&mut self, id: ServerId) -> Result<()> {
        if self.stores.contains_key(&id) {
            return Err(Error::DuplicateServer(id));
        }
        self.stores.insert(id, ServerStore::new());

        for k in 0..REPLICAS_PER_SERVER {
            let h = hash_server(replica_key(id, k));
            let pos = self.ring.locate_insert_slot(h, id);
            self.ring.insert_at(pos, ReplicaTag { hash: h, id });
            self.remap_on_insert(pos);
        }

        tracing::debug!(server = %id, "server added");
        Ok(())
    }

    /// Unregisters `id`: for each of its three replica tags, donates the
    /// keys that tag was responsible for to the ring successor, then
    /// removes the tag. Destroys the server's store once all three tags
    /// are gone.
    ///
    /// # Panics
    /// Removing an id with no tags on the ring is a programmer error: per
    /// the design, it fails fast and terminates the process with a
    /// diagnostic rather than returning a recoverable `Err`.
    pub fn remove_server(&mut self, id: ServerId) {
        if !self.stores.contains_key(&id) {
            panic!("remove_server: no such server {id}");
        }

        for k in 0..REPLICAS_PER_SERVER {
            let h = hash_server(replica_key(id, k));
            let pos = self.ring.locate_insert_slot(h, id);
            self.remap_on_remove(pos);
            self.ring.remove_at(pos);
        }
        self.stores.remove(&id);

        tracing::debug!(server = %id, "server removed");
    }

    /// Stores `(key, value)` on the server the current ring selects for
    /// `key`, returning that server's id.
    ///
    /// # Panics
    /// Storing against an empty ring is a programmer error: per the design,
    /// it fails fast and terminates the process with a diagnostic rather
    /// than returning a recoverable `Err`.
    pub fn store(&mut self, key: &str, value: &str) -> ServerId {
        let id = self.locate(key);
        self.stores
            .get_mut(&id)
            .expect("locate() only returns ids with a live store")
            .put(key.to_string(), value.to_string());
        id
    }

    /// Looks up `key`, returning its value (or `None` if absent) alongside
    /// the id of the server responsible for it.
    ///
    /// A missing key is a logical miss, not an error: it still reports the
    /// chosen server id.
    ///
    /// # Panics
    /// Retrieving against an empty ring is a programmer error: per the
    /// design, it fails fast and terminates the process with a diagnostic
    /// rather than returning a recoverable `Err`.
    pub fn retrieve(&self, key: &str) -> (Option<String>, ServerId) {
        let id = self.locate(key);
        let value = self
            .stores
            .get(&id)
            .and_then(|store| store.get(key))
            .map(str::to_string);
        (value, id)
    }

    fn locate(&self, key: &str) -> ServerId {
        if self.ring.is_empty() {
            panic!("operation requires at least one live server");
        }
        self.ring
            .locate_object(hash_key(key.as_bytes()))
            .expect("ring is non-empty")
    }

    /// After inserting a tag at `pos`, re-files any keys from the ring
    /// successor that now fall in the newly split arc.
    fn remap_on_insert(&mut self, pos: usize) {
        let inserted = self.ring.tag_at(pos);
        let next = self.ring.tag_at(self.ring.successor_index(pos));
        if next.id == inserted.id {
            // Same server's own replica succeeds it: nothing to migrate.
            return;
        }
        let donor_id = next.id;

        let donor_keys: Vec<(String, String)> = self
            .stores
            .get(&donor_id)
            .expect("donor server is registered")
            .iterate()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut moved = 0usize;
        for (key, value) in donor_keys {
            let new_id = self
                .ring
                .locate_object(hash_key(key.as_bytes()))
                .expect("ring is non-empty");
            if new_id != donor_id {
                self.stores.get_mut(&new_id).expect("target server is registered").put(key.clone(), value);
                self.stores.get_mut(&donor_id).expect("donor server is registered").remove(&key);
                moved += 1;
                tracing::trace!(key, from = %donor_id, to = %new_id, "remapped key on insert");
            }
        }
        if moved > 0 {
            tracing::debug!(donor = %donor_id, new_owner = %inserted.id, moved, "remap-on-insert complete");
        }
    }

    /// Before removing the tag at `pos`, donates any keys in its owned arc
    /// `(prev_hash, hash]` to the ring successor.
    fn remap_on_remove(&mut self, pos: usize) {
        let removed = self.ring.tag_at(pos);
        let prev_hash = if pos > 0 { self.ring.tag_at(pos - 1).hash } else { 0 };
        let successor_id = self.ring.tag_at(self.ring.successor_index(pos)).id;
        if successor_id == removed.id {
            // Another replica of the same server succeeds us: local move.
            return;
        }

        let dying_keys: Vec<(String, String)> = self
            .stores
            .get(&removed.id)
            .expect("server being removed is registered")
            .iterate()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut moved = 0usize;
        for (key, value) in dying_keys {
            let h = hash_key(key.as_bytes());
            if h > prev_hash && h <= removed.hash {
                self.stores.get_mut(&successor_id).expect("successor server is registered").put(key.clone(), value);
                self.stores.get_mut(&removed.id).expect("server being removed is registered").remove(&key);
                moved += 1;
                tracing::trace!(key, from = %removed.id, to = %successor_id, "remapped key on remove");
            }
        }
        if moved > 0 {
            tracing::debug!(dying = %removed.id, successor = %successor_id, moved, "remap-on-remove complete");
        }
    }
}
