//! Placement and remap property tests for the load balancer.
//!
//! # Test Strategy
//!
//! 1. **Boundary behavior**: wraparound, exact-hash ties, empty ring errors.
//! 2. **Invariants**: placement, ring sortedness/triplet, determinism.
//! 3. **Scenarios**: the literal spec fixtures (kittens, 100-key churn).

use corelib::{hash_key, hash_server, replica_key, LoadBalancer, ReplicaTag, Ring, ServerId};
use proptest::prelude::*;

fn ring_with_servers(ids: &[u32]) -> (LoadBalancer, Ring) {
    let mut lb = LoadBalancer::new();
    for &id in ids {
        lb.add_server(ServerId(id)).unwrap();
    }
    let mut ring = Ring::new();
    for &id in ids {
        for k in 0..3 {
            let h = hash_server(replica_key(ServerId(id), k));
            let pos = ring.locate_insert_slot(h, ServerId(id));
            ring.insert_at(pos, ReplicaTag { hash: h, id: ServerId(id) });
        }
    }
    (lb, ring)
}

#[test]
#[should_panic(expected = "at least one live server")]
fn empty_ring_store_is_fatal_not_silent() {
    let mut lb = LoadBalancer::new();
    lb.store("key", "value");
}

#[test]
#[should_panic(expected = "at least one live server")]
fn empty_ring_retrieve_is_fatal_not_silent() {
    let lb = LoadBalancer::new();
    lb.retrieve("key");
}

#[test]
#[should_panic(expected = "no such server")]
fn remove_server_on_unknown_id_is_fatal_not_silent() {
    let mut lb = LoadBalancer::new();
    lb.remove_server(ServerId(9));
}

#[test]
fn scenario_kittens_move_to_a_different_server_on_removal() {
    let mut lb = LoadBalancer::new();
    lb.add_server(ServerId(1)).unwrap();
    lb.add_server(ServerId(2)).unwrap();
    lb.add_server(ServerId(3)).unwrap();

    let (_, owner) = lb.retrieve("kittens");
    let stored_owner = lb.store("kittens", "cute");
    assert_eq!(owner, stored_owner);

    lb.remove_server(stored_owner);
    let (value, new_owner) = lb.retrieve("kittens");
    assert_eq!(value.as_deref(), Some("cute"));
    assert_ne!(new_owner, stored_owner);
}

#[test]
fn scenario_a_hundred_keys_survive_a_server_joining_and_leaving() {
    let mut lb = LoadBalancer::new();
    lb.add_server(ServerId(7)).unwrap();

    let pairs: Vec<(String, String)> =
        (0..100).map(|i| (format!("key{i}"), format!("value{i}"))).collect();
    for (k, v) in &pairs {
        lb.store(k, v);
    }

    lb.add_server(ServerId(8)).unwrap();
    lb.remove_server(ServerId(7));

    for (k, v) in &pairs {
        let (got, _id) = lb.retrieve(k);
        assert_eq!(got.as_deref(), Some(v.as_str()));
    }
}

proptest! {
    /// Placement invariant: every stored key resides on exactly the server
    /// that `locate_object` selects for it on the current ring.
    #[test]
    fn placement_invariant_holds_after_random_churn(
        server_ids in prop::collection::vec(0u32..50, 1..8),
        keys in prop::collection::vec("[a-z]{1,12}", 1..40),
    ) {
        let mut lb = LoadBalancer::new();
        let mut live: Vec<u32> = Vec::new();
        for id in server_ids {
            if !live.contains(&id) {
                lb.add_server(ServerId(id)).unwrap();
                live.push(id);
            }
        }
        prop_assume!(!live.is_empty());

        for key in &keys {
            lb.store(key, "v");
        }

        let (_, ring) = ring_with_servers(&live);
        for key in &keys {
            let (value, chosen) = lb.retrieve(key);
            prop_assert_eq!(value.as_deref(), Some("v"));
            let expected = ring.locate_object(hash_key(key.as_bytes())).unwrap();
            prop_assert_eq!(chosen, expected);
        }
    }

    /// Determinism: two independently driven instances given the same
    /// operation sequence agree on every retrieve.
    #[test]
    fn determinism_across_independent_instances(
        server_ids in prop::collection::vec(0u32..50, 1..6),
        keys in prop::collection::vec("[a-z]{1,12}", 1..20),
    ) {
        let mut a = LoadBalancer::new();
        let mut b = LoadBalancer::new();
        let mut live: Vec<u32> = Vec::new();
        for id in server_ids {
            if !live.contains(&id) {
                a.add_server(ServerId(id)).unwrap();
                b.add_server(ServerId(id)).unwrap();
                live.push(id);
            }
        }
        prop_assume!(!live.is_empty());

        for key in &keys {
            a.store(key, "v");
            b.store(key, "v");
        }

        for key in &keys {
            prop_assert_eq!(a.retrieve(key), b.retrieve(key));
        }
    }

    /// Conservation: add_server immediately followed by remove_server of the
    /// same id, with no intervening client operations, leaves every key's
    /// resident server exactly where the surviving ring would put it.
    #[test]
    fn add_remove_same_id_conserves_placement(
        base_ids in prop::collection::vec(1u32..50, 1..5),
        joining_id in 100u32..200,
        keys in prop::collection::vec("[a-z]{1,12}", 1..30),
    ) {
        let mut lb = LoadBalancer::new();
        let mut live: Vec<u32> = Vec::new();
        for id in base_ids {
            if !live.contains(&id) {
                lb.add_server(ServerId(id)).unwrap();
                live.push(id);
            }
        }
        prop_assume!(!live.is_empty());

        for key in &keys {
            lb.store(key, "v");
        }

        lb.add_server(ServerId(joining_id)).unwrap();
        lb.remove_server(ServerId(joining_id));

        let (_, ring) = ring_with_servers(&live);
        for key in &keys {
            let (value, chosen) = lb.retrieve(key);
            prop_assert_eq!(value.as_deref(), Some("v"));
            let expected = ring.locate_object(hash_key(key.as_bytes())).unwrap();
            prop_assert_eq!(chosen, expected);
        }
    }
}
