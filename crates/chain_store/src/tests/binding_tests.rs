use super::*;

use std::time::Duration;

use shared::protocol::NO_ITEM;
use tokio::time::timeout;

fn seeded_provider() -> StoreProvider {
    let provider = StoreProvider::new();
    let store = provider.store();
    store.add_chain(TransformChain::new("c1"));
    store.append_transform(&EntityId::from("c1"), Transform::unit_translation("t1"));
    store.append_transform(&EntityId::from("c1"), Transform::identity_rotation("r1"));
    provider
}

#[test]
fn provider_hands_out_the_same_store() {
    let provider = StoreProvider::new();
    provider.store().add_chain(TransformChain::new("c1"));
    assert_eq!(provider.store().snapshot().chains.len(), 1);
}

#[test]
fn field_handler_keeps_partial_input_as_text() {
    let provider = seeded_provider();
    let binding = provider.field_binding("t1");
    let on_x = binding.on_change(Axis::X);

    assert!(on_x.handle("-"));
    let snapshot = provider.store().snapshot();
    let t1 = snapshot.transform(&EntityId::from("t1")).expect("t1");
    assert_eq!(t1.field(Axis::X), Some(&Component::Text("-".into())));
    assert!(!t1.is_valid());

    assert!(on_x.handle("-4.5"));
    let snapshot = provider.store().snapshot();
    let t1 = snapshot.transform(&EntityId::from("t1")).expect("t1");
    assert_eq!(t1.field(Axis::X), Some(&Component::Number(-4.5)));
    assert!(t1.is_valid());
}

#[test]
fn field_handler_on_missing_transform_is_a_noop() {
    let provider = seeded_provider();
    let handler = provider.field_binding("ghost").on_change(Axis::X);
    assert!(!handler.handle("1"));
}

#[test]
fn named_fields_are_checked_against_the_transform_kind() {
    let provider = seeded_provider();
    assert_eq!(
        provider.field_binding("t1").on_change_named("w").err(),
        Some(ModelError::AxisNotOnKind {
            kind: shared::domain::TransformKind::Translation,
            axis: Axis::W,
        })
    );
    assert_eq!(
        provider.field_binding("r1").on_change_named("W").map(|h| h.axis()),
        Ok(Axis::W)
    );
    assert!(matches!(
        provider.field_binding("r1").on_change_named("scale"),
        Err(ModelError::UnknownField(_))
    ));
}

#[test]
fn hover_handle_toggles_membership() {
    let provider = seeded_provider();
    let hover = provider.hover("t1");
    assert!(!hover.is_hovered());
    hover.set(true);
    assert!(hover.is_hovered());
    hover.set(false);
    assert!(!hover.is_hovered());
}

#[test]
fn chain_view_flags_rows() {
    let provider = seeded_provider();
    let store = provider.store();
    store.set_hovered(&EntityId::from("r1"));
    store.set_selected(&EntityId::from("c1"));
    provider.field_binding("t1").on_change(Axis::Z).handle("");

    let view = chain_view(&store.snapshot(), &EntityId::from("c1")).expect("view");
    assert!(view.selected);
    assert!(!view.is_valid());
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].invalid_fields, vec![Axis::Z]);
    assert!(!view.rows[0].hovered);
    assert!(view.rows[1].hovered);
    assert!(view.rows[1].valid);

    assert!(chain_view(&store.snapshot(), &EntityId::from("ghost")).is_none());
}

#[test]
fn drop_moves_reference_to_the_back() {
    let provider = seeded_provider();
    let store = provider.store();
    let drag = DragPayload {
        item_id: "t1".into(),
        container_id: "c1".into(),
    };

    assert!(handle_drop(&store, &drag, &DropTarget::from_indicator(NO_ITEM, "c1")));
    assert_eq!(
        store.snapshot().chain(&EntityId::from("c1")).map(|c| c.transforms.clone()),
        Some(vec![EntityId::from("r1"), EntityId::from("t1")])
    );
    assert!(!handle_drop(&store, &drag, &DropTarget::from_indicator("t1", "c1")));
}

#[test]
fn buttons_create_default_rows() {
    let provider = StoreProvider::new();
    let store = provider.store();
    let chain = new_chain(&store);
    let rotation = new_rotation(&store, &chain);
    let translation = new_translation(&store, &chain);

    let resolved = store.resolve_chain(&chain);
    assert_eq!(
        resolved,
        vec![
            Transform::identity_rotation(rotation),
            Transform::unit_translation(translation)
        ]
    );
}

#[tokio::test]
async fn selection_wakes_only_when_projection_changes() {
    let provider = seeded_provider();
    let store = provider.store();
    let mut chain_count = provider.select(|state| state.chains.len());
    assert_eq!(*chain_count.last(), 1);

    // hover does not touch the projection
    store.set_hovered(&EntityId::from("t1"));
    store.add_chain(TransformChain::new("c2"));

    let next = timeout(Duration::from_secs(1), chain_count.changed())
        .await
        .expect("notified")
        .expect("store alive");
    assert_eq!(next, 2);
    assert_eq!(chain_count.get(), 2);
}

#[tokio::test]
async fn selection_closes_with_the_store() {
    let store = TransformStore::new();
    let mut selection = Selection::new(&store, |state: &StoreState| state.transforms.len());
    drop(store);
    assert_eq!(selection.changed().await, Err(SelectionClosed));
}
