//! Delegate sessions: base-implementation write-back through a forked
//! storage, path re-basing of faults, and the empty-session fallback.

mod common;

use common::{Employee, Entity};
use serde_json::json;
use treewrap::{
    decode, decode_from_raw, encode, encode_to_raw, Adapter, BasicAdapter, DecodeError, Encodable,
    EncodeError, Encoder, Node, Storage,
};

#[test]
fn delegate_write_back_lands_in_parent() {
    let adapter = BasicAdapter::new();
    let employee = Employee {
        entity: Entity { id: 17 },
        role: "engineer".to_string(),
    };
    let raw = encode_to_raw(&adapter, &employee).unwrap();
    assert_eq!(
        raw,
        json!({
            "role": "engineer",
            "base": {"id": 17},
        })
    );
    assert_eq!(
        decode_from_raw::<_, Employee>(&adapter, raw).unwrap(),
        employee
    );
}

#[test]
fn delegate_round_trip_nested_twice() {
    // An employee inside a sequence inside another struct: the delegate
    // fork must compose with ordinary nesting.
    struct Team {
        members: Vec<Employee>,
    }

    impl Encodable for Team {
        fn encode<S: Storage, A: Adapter>(
            &self,
            encoder: &mut Encoder<'_, S, A>,
        ) -> Result<(), EncodeError> {
            let mut map = encoder.container_keyed()?;
            map.encode_field("members", &self.members)?;
            Ok(())
        }
    }

    let adapter = BasicAdapter::new();
    let team = Team {
        members: vec![
            Employee {
                entity: Entity { id: 1 },
                role: "a".to_string(),
            },
            Employee {
                entity: Entity { id: 2 },
                role: "b".to_string(),
            },
        ],
    };
    let raw = encode_to_raw(&adapter, &team).unwrap();
    assert_eq!(
        raw,
        json!({
            "members": [
                {"role": "a", "base": {"id": 1}},
                {"role": "b", "base": {"id": 2}},
            ],
        })
    );
}

/// A derived value that never feeds its delegate session.
struct Hollow;

impl Encodable for Hollow {
    fn encode<S: Storage, A: Adapter>(
        &self,
        encoder: &mut Encoder<'_, S, A>,
    ) -> Result<(), EncodeError> {
        let mut map = encoder.container_keyed()?;
        let base = map.delegate_encoder("base")?;
        base.finish()
    }
}

#[test]
fn unfed_delegate_flushes_empty_container_fallback() {
    let adapter = BasicAdapter::new();
    let node = encode(&adapter, &Hollow).unwrap();
    let map = node.as_keyed().expect("keyed node");
    assert_eq!(map["base"], Node::empty_keyed());
}

#[test]
fn delegate_fault_paths_are_rebased_onto_outer_session() {
    let adapter = BasicAdapter::new();
    // "base" is present but missing the entity's "id" entry; the fault is
    // raised inside the forked session and must surface with the full
    // outer path.
    let node = Node::from(json!({"role": "x", "base": {}}));
    match decode::<_, Employee>(&adapter, node) {
        Err(DecodeError::KeyNotFound { key, path }) => {
            assert_eq!(key, "id");
            assert_eq!(path.to_string(), "/base");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn unkeyed_delegate_reserves_a_stable_slot() {
    // Elements routed through per-element delegate sessions keep their
    // positions even with ordinary elements interleaved.
    struct Mixed;

    impl Encodable for Mixed {
        fn encode<S: Storage, A: Adapter>(
            &self,
            encoder: &mut Encoder<'_, S, A>,
        ) -> Result<(), EncodeError> {
            let mut seq = encoder.container_unkeyed()?;
            seq.encode_element(&0i64)?;
            let mut delegate = seq.delegate_encoder()?;
            delegate.encode_value(&Entity { id: 9 })?;
            delegate.finish()?;
            seq.encode_element(&2i64)?;
            Ok(())
        }
    }

    let adapter = BasicAdapter::new();
    let raw = encode_to_raw(&adapter, &Mixed).unwrap();
    assert_eq!(raw, json!([0, {"id": 9}, 2]));
}
