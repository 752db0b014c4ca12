use super::*;

use std::time::Duration;

use shared::domain::{Axis, Component};
use tokio::time::timeout;

#[test]
fn new_store_starts_empty() {
    let store = TransformStore::new();
    let snapshot = store.snapshot();
    assert!(snapshot.chains.is_empty());
    assert!(snapshot.transforms.is_empty());
    assert!(snapshot.hovered.is_empty());
    assert_eq!(snapshot.selected, None);
}

#[test]
fn chain_edit_scenario() {
    let store = TransformStore::new();
    store.add_chain(TransformChain::new("c1"));
    store.add_transform(Transform::translation("t1", 1.0, 2.0, 3.0));
    store.set_chain(SetPayload::update("c1", |prev: &TransformChain| {
        TransformChain {
            id: prev.id.clone(),
            transforms: prev
                .transforms
                .iter()
                .cloned()
                .chain([EntityId::from("t1")])
                .collect(),
        }
    }));

    let c1 = EntityId::from("c1");
    assert_eq!(
        store.resolve_chain(&c1),
        vec![Transform::translation("t1", 1.0, 2.0, 3.0)]
    );

    store.remove_transform(&EntityId::from("t1"));
    assert!(store.resolve_chain(&c1).is_empty());
}

#[test]
fn snapshots_are_immutable() {
    let store = TransformStore::new();
    store.add_chain(TransformChain::new("c1"));
    let before = store.snapshot();
    store.add_chain(TransformChain::new("c2"));
    assert_eq!(before.chains.len(), 1);
    assert_eq!(store.snapshot().chains.len(), 2);
}

#[test]
fn reports_whether_state_changed() {
    let store = TransformStore::new();
    let id = EntityId::from("t1");
    assert!(store.add_transform(Transform::unit_translation("t1")));
    assert!(store.remove_transform(&id));
    assert!(!store.remove_transform(&id));
    assert!(!store.set_transform(Transform::unit_translation("t1")));
    assert!(store.set_hovered(&id));
    assert!(!store.set_hovered(&id));
}

#[test]
fn negative_zero_edit_is_stored() {
    let store = TransformStore::new();
    store.add_transform(Transform::translation("t1", 0.0, 0.0, 0.0));

    let changed = store.set_transform(SetPayload::update("t1", |old: &Transform| {
        old.with_field(Axis::X, Component::from_input("-0"))
    }));

    assert!(changed);
    let snapshot = store.snapshot();
    let x = snapshot
        .transform(&EntityId::from("t1"))
        .and_then(|t| t.field(Axis::X))
        .and_then(Component::as_number)
        .expect("x is a number");
    assert!(x == 0.0 && x.is_sign_negative());
}

#[test]
fn nan_components_do_not_turn_noops_into_changes() {
    let store = TransformStore::new();
    store.add_transform(Transform::translation("t1", f64::NAN, 0.0, 0.0));
    store.set_hovered(&EntityId::from("t1"));

    let ghost = EntityId::from("ghost");
    assert!(!store.remove_transform(&ghost));
    assert!(!store.remove_transform(&ghost));
    assert!(!store.set_hovered(&EntityId::from("t1")));
}

#[test]
fn dispatch_applies_serialized_actions() {
    let store = TransformStore::new();
    let script = r#"[
        {"type":"add_chain","payload":{"id":"c1","transforms":[]}},
        {"type":"append_transform","payload":{"chain_id":"c1","transform":{"type":"rotation","id":"r1","x":0,"y":0,"z":0,"w":1}}},
        {"type":"set_transform_field","payload":{"id":"r1","axis":"w","value":"-"}}
    ]"#;
    let actions: Vec<StoreAction> = serde_json::from_str(script).expect("parse script");
    for action in actions {
        assert!(store.dispatch(action));
    }

    let r1 = EntityId::from("r1");
    assert!(!store.is_transform_valid(&r1));
    assert_eq!(
        store.snapshot().transform(&r1).and_then(|t| t.field(Axis::W)).cloned(),
        Some(Component::Text("-".into()))
    );
}

#[tokio::test]
async fn subscribers_see_changes_but_not_noops() {
    let store = TransformStore::new();
    let mut rx = store.subscribe();

    store.remove_chain(&EntityId::from("ghost"));
    assert!(!rx.has_changed().expect("store alive"));

    store.add_chain(TransformChain::new("c1"));
    timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("notified")
        .expect("store alive");
    assert_eq!(rx.borrow_and_update().chains.len(), 1);
}

#[tokio::test]
async fn subscriber_errors_after_store_drop() {
    let store = TransformStore::new();
    let mut rx = store.subscribe();
    drop(store);
    assert!(rx.changed().await.is_err());
}
