//! Glue between the store and presentation code: the per-mount provider,
//! projections that re-read on change, and the handlers editor rows call.

use std::sync::Arc;

use shared::{
    domain::{Axis, ChainId, Component, EntityId, Transform, TransformChain, TransformId},
    error::ModelError,
    protocol::{DragPayload, DropTarget},
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::{
    state::{SetPayload, StoreState},
    store::TransformStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transform store was dropped")]
pub struct SelectionClosed;

/// Owns the one store of an application mount.
pub struct StoreProvider {
    store: Arc<TransformStore>,
}

impl StoreProvider {
    pub fn new() -> Self {
        debug!("mounting transform store");
        Self {
            store: TransformStore::new(),
        }
    }

    pub fn store(&self) -> Arc<TransformStore> {
        Arc::clone(&self.store)
    }

    pub fn select<T, F>(&self, selector: F) -> Selection<T, F>
    where
        T: Clone + PartialEq,
        F: Fn(&StoreState) -> T,
    {
        Selection::new(&self.store, selector)
    }

    pub fn field_binding(&self, id: impl Into<TransformId>) -> TransformFieldBinding {
        TransformFieldBinding::new(self.store(), id)
    }

    pub fn hover(&self, id: impl Into<EntityId>) -> HoverHandle {
        HoverHandle::new(self.store(), id)
    }
}

impl Default for StoreProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// A projection of the store state that can be re-read or awaited.
pub struct Selection<T, F> {
    rx: watch::Receiver<Arc<StoreState>>,
    selector: F,
    last: T,
}

impl<T, F> Selection<T, F>
where
    T: Clone + PartialEq,
    F: Fn(&StoreState) -> T,
{
    pub fn new(store: &TransformStore, selector: F) -> Self {
        let rx = store.subscribe();
        let snapshot = rx.borrow().clone();
        let last = selector(&*snapshot);
        Self { rx, selector, last }
    }

    /// Projection of the latest snapshot.
    pub fn get(&self) -> T {
        let snapshot = self.rx.borrow().clone();
        (self.selector)(&*snapshot)
    }

    /// Last value handed out by `new` or `changed`.
    pub fn last(&self) -> &T {
        &self.last
    }

    /// Waits for the next store change that alters this projection.
    pub async fn changed(&mut self) -> Result<T, SelectionClosed> {
        loop {
            self.rx.changed().await.map_err(|_| SelectionClosed)?;
            let snapshot = self.rx.borrow_and_update().clone();
            let next = (self.selector)(&*snapshot);
            if next != self.last {
                self.last = next.clone();
                return Ok(next);
            }
        }
    }
}

/// Issues field edits for one transform.
pub struct TransformFieldBinding {
    store: Arc<TransformStore>,
    id: TransformId,
}

impl TransformFieldBinding {
    pub fn new(store: Arc<TransformStore>, id: impl Into<TransformId>) -> Self {
        Self {
            store,
            id: id.into(),
        }
    }

    pub fn on_change(&self, axis: Axis) -> FieldHandler {
        FieldHandler {
            store: Arc::clone(&self.store),
            id: self.id.clone(),
            axis,
        }
    }

    /// Like [`Self::on_change`], for field names coming from the UI.
    pub fn on_change_named(&self, field: &str) -> Result<FieldHandler, ModelError> {
        let axis: Axis = field.parse()?;
        if let Some(transform) = self.store.snapshot().transform(&self.id) {
            let kind = transform.kind();
            if !kind.has_axis(axis) {
                return Err(ModelError::AxisNotOnKind { kind, axis });
            }
        }
        Ok(self.on_change(axis))
    }
}

pub struct FieldHandler {
    store: Arc<TransformStore>,
    id: TransformId,
    axis: Axis,
}

impl FieldHandler {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Stores the raw input as a number when it parses, otherwise as text.
    pub fn handle(&self, raw: &str) -> bool {
        let value = Component::from_input(raw);
        let axis = self.axis;
        self.store.set_transform(SetPayload::update(
            self.id.clone(),
            move |old: &Transform| old.with_field(axis, value),
        ))
    }
}

/// Hover flag of one entity.
pub struct HoverHandle {
    store: Arc<TransformStore>,
    id: EntityId,
}

impl HoverHandle {
    pub fn new(store: Arc<TransformStore>, id: impl Into<EntityId>) -> Self {
        Self {
            store,
            id: id.into(),
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.store.snapshot().is_hovered(&self.id)
    }

    pub fn set(&self, hovered: bool) -> bool {
        if hovered {
            self.store.set_hovered(&self.id)
        } else {
            self.store.remove_hovered(&self.id)
        }
    }
}

/// Applies a finished drag. Returns whether any chain changed.
pub fn handle_drop(store: &TransformStore, drag: &DragPayload, target: &DropTarget) -> bool {
    match drag.drop_onto(target) {
        Some(mv) => store.move_reference(&mv),
        None => false,
    }
}

/// "Add chain" button: a new empty chain with a fresh id.
pub fn new_chain(store: &TransformStore) -> ChainId {
    let id = EntityId::generate();
    store.add_chain(TransformChain::new(id.clone()));
    id
}

/// "Add rotation" button: an identity quaternion appended to `chain_id`.
pub fn new_rotation(store: &TransformStore, chain_id: &ChainId) -> TransformId {
    let id = EntityId::generate();
    store.append_transform(chain_id, Transform::identity_rotation(id.clone()));
    id
}

/// "Add translation" button: a unit vector appended to `chain_id`.
pub fn new_translation(store: &TransformStore, chain_id: &ChainId) -> TransformId {
    let id = EntityId::generate();
    store.append_transform(chain_id, Transform::unit_translation(id.clone()));
    id
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub transform: Transform,
    pub valid: bool,
    pub invalid_fields: Vec<Axis>,
    pub hovered: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainView {
    pub id: ChainId,
    pub rows: Vec<RowView>,
    pub hovered: bool,
    pub selected: bool,
}

impl ChainView {
    pub fn is_valid(&self) -> bool {
        self.rows.iter().all(|row| row.valid)
    }
}

pub fn chain_view(state: &StoreState, id: &ChainId) -> Option<ChainView> {
    let chain = state.chain(id)?;
    let rows = state
        .resolve_chain(id)
        .into_iter()
        .map(|transform| RowView {
            valid: transform.is_valid(),
            invalid_fields: transform.invalid_fields(),
            hovered: state.is_hovered(transform.id()),
            selected: state.is_selected(transform.id()),
            transform,
        })
        .collect();
    Some(ChainView {
        id: chain.id.clone(),
        rows,
        hovered: state.is_hovered(&chain.id),
        selected: state.is_selected(&chain.id),
    })
}

/// Every chain in display order.
pub fn chain_views(state: &StoreState) -> Vec<ChainView> {
    state
        .chains
        .iter()
        .filter_map(|chain| chain_view(state, &chain.id))
        .collect()
}

#[cfg(test)]
#[path = "tests/binding_tests.rs"]
mod tests;
