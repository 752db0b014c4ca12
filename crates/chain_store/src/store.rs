use std::sync::Arc;

use shared::{
    domain::{ChainId, EntityId, Transform, TransformChain, TransformId},
    protocol::{MoveReference, StoreAction},
};
use tokio::sync::watch;
use tracing::debug;

use crate::state::{SetPayload, StoreState};

/// Process-wide handle over one editing session's state.
///
/// Every mutation reads the latest snapshot, runs a reducer and publishes the
/// result as a new `Arc<StoreState>`. Subscribers are only woken when the
/// reducer actually changed something. Mutation methods return whether it did.
///
/// Updaters run while the snapshot is being committed and must not call back
/// into the store.
pub struct TransformStore {
    state: watch::Sender<Arc<StoreState>>,
}

impl TransformStore {
    pub fn new() -> Arc<Self> {
        Self::with_state(StoreState::default())
    }

    pub fn with_state(initial: StoreState) -> Arc<Self> {
        let (state, _) = watch::channel(Arc::new(initial));
        Arc::new(Self { state })
    }

    pub fn snapshot(&self) -> Arc<StoreState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreState>> {
        self.state.subscribe()
    }

    fn commit(&self, action: &'static str, reduce: impl FnOnce(&StoreState) -> StoreState) -> bool {
        let changed = self.state.send_if_modified(|current| {
            let next = reduce(&**current);
            if next == **current {
                return false;
            }
            *current = Arc::new(next);
            true
        });
        debug!(action, changed, "applied store action");
        changed
    }

    pub fn dispatch(&self, action: StoreAction) -> bool {
        let name = action.name();
        self.commit(name, |state| state.apply(action))
    }

    pub fn add_chain(&self, chain: TransformChain) -> bool {
        self.commit("add_chain", |state| state.add_chain(chain))
    }

    pub fn remove_chain(&self, id: &ChainId) -> bool {
        self.commit("remove_chain", |state| state.remove_chain(id))
    }

    pub fn set_chain(&self, payload: impl Into<SetPayload<TransformChain>>) -> bool {
        let payload = payload.into();
        self.commit("set_chain", |state| state.set_chain(payload))
    }

    pub fn set_chains(&self, chains: Vec<TransformChain>) -> bool {
        self.commit("set_chains", |state| state.set_chains(chains))
    }

    pub fn add_transform(&self, transform: Transform) -> bool {
        self.commit("add_transform", |state| state.add_transform(transform))
    }

    pub fn append_transform(&self, chain_id: &ChainId, transform: Transform) -> bool {
        self.commit("append_transform", |state| {
            state.append_transform(chain_id, transform)
        })
    }

    pub fn remove_transform(&self, id: &TransformId) -> bool {
        self.commit("remove_transform", |state| state.remove_transform(id))
    }

    pub fn set_transform(&self, payload: impl Into<SetPayload<Transform>>) -> bool {
        let payload = payload.into();
        self.commit("set_transform", |state| state.set_transform(payload))
    }

    pub fn commit_transform(&self, id: &TransformId) -> bool {
        self.commit("commit_transform", |state| state.commit_transform(id))
    }

    pub fn move_reference(&self, mv: &MoveReference) -> bool {
        self.commit("move_reference", |state| state.move_reference(mv))
    }

    pub fn set_hovered(&self, id: &EntityId) -> bool {
        self.commit("set_hovered", |state| state.set_hovered(id))
    }

    pub fn remove_hovered(&self, id: &EntityId) -> bool {
        self.commit("remove_hovered", |state| state.remove_hovered(id))
    }

    pub fn clear_hovered(&self) -> bool {
        self.commit("clear_hovered", StoreState::clear_hovered)
    }

    pub fn set_selected(&self, id: &EntityId) -> bool {
        self.commit("set_selected", |state| state.set_selected(id))
    }

    pub fn clear_selected(&self) -> bool {
        self.commit("clear_selected", StoreState::clear_selected)
    }

    pub fn is_transform_valid(&self, id: &TransformId) -> bool {
        self.state.borrow().is_transform_valid(id)
    }

    pub fn resolve_chain(&self, id: &ChainId) -> Vec<Transform> {
        self.state.borrow().resolve_chain(id)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
