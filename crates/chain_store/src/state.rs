//! Immutable store snapshot and the pure reducers that derive the next one.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Axis, ChainId, Component, EntityId, Transform, TransformChain, TransformId},
    protocol::{MoveReference, StoreAction},
};
use tracing::debug;

pub type Updater<T> = Box<dyn FnOnce(&T) -> T>;

/// Argument of `set_chain` / `set_transform`: a full replacement, or an
/// updater applied to the entity currently stored under `id`.
pub enum SetPayload<T> {
    Replace(T),
    Update { id: EntityId, updater: Updater<T> },
}

impl<T> SetPayload<T> {
    pub fn update(id: impl Into<EntityId>, updater: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::Update {
            id: id.into(),
            updater: Box::new(updater),
        }
    }

    fn target(&self) -> &EntityId
    where
        T: Keyed,
    {
        match self {
            Self::Replace(item) => item.key(),
            Self::Update { id, .. } => id,
        }
    }
}

impl<T> From<T> for SetPayload<T> {
    fn from(value: T) -> Self {
        Self::Replace(value)
    }
}

pub trait Keyed {
    fn key(&self) -> &EntityId;
}

impl Keyed for TransformChain {
    fn key(&self) -> &EntityId {
        &self.id
    }
}

impl Keyed for Transform {
    fn key(&self) -> &EntityId {
        self.id()
    }
}

fn replace_by_id<T: Keyed + Clone>(items: &[T], payload: SetPayload<T>) -> Option<Vec<T>> {
    let index = items
        .iter()
        .position(|item| item.key() == payload.target())?;
    let replacement = match payload {
        SetPayload::Replace(item) => item,
        SetPayload::Update { updater, .. } => updater(&items[index]),
    };
    let mut next = items.to_vec();
    next[index] = replacement;
    Some(next)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub chains: Vec<TransformChain>,
    #[serde(default)]
    pub transforms: Vec<Transform>,
    #[serde(default)]
    pub hovered: BTreeSet<EntityId>,
    #[serde(default)]
    pub selected: Option<EntityId>,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chain(&self, chain: TransformChain) -> Self {
        Self {
            chains: self.chains.iter().cloned().chain([chain]).collect(),
            ..self.clone()
        }
    }

    pub fn remove_chain(&self, id: &ChainId) -> Self {
        Self {
            chains: self
                .chains
                .iter()
                .filter(|chain| &chain.id != id)
                .map(|chain| chain.without_reference(id))
                .collect(),
            ..self.clone()
        }
    }

    pub fn set_chain(&self, payload: SetPayload<TransformChain>) -> Self {
        let target = payload.target().clone();
        match replace_by_id(&self.chains, payload) {
            Some(chains) => Self {
                chains,
                ..self.clone()
            },
            None => {
                debug!(chain_id = %target, "set_chain: no chain with this id");
                self.clone()
            }
        }
    }

    pub fn set_chains(&self, chains: Vec<TransformChain>) -> Self {
        Self {
            chains,
            ..self.clone()
        }
    }

    pub fn add_transform(&self, transform: Transform) -> Self {
        Self {
            transforms: self.transforms.iter().cloned().chain([transform]).collect(),
            ..self.clone()
        }
    }

    /// The transform is added even when the chain does not exist.
    pub fn append_transform(&self, chain_id: &ChainId, transform: Transform) -> Self {
        let transform_id = transform.id().clone();
        self.add_transform(transform)
            .set_chain(SetPayload::update(chain_id.clone(), move |chain: &TransformChain| {
                TransformChain {
                    id: chain.id.clone(),
                    transforms: chain
                        .transforms
                        .iter()
                        .cloned()
                        .chain([transform_id])
                        .collect(),
                }
            }))
    }

    pub fn remove_transform(&self, id: &TransformId) -> Self {
        Self {
            chains: self
                .chains
                .iter()
                .map(|chain| chain.without_reference(id))
                .collect(),
            transforms: self
                .transforms
                .iter()
                .filter(|transform| transform.id() != id)
                .cloned()
                .collect(),
            hovered: self
                .hovered
                .iter()
                .filter(|hovered| *hovered != id)
                .cloned()
                .collect(),
            selected: self.selected.clone(),
        }
    }

    pub fn set_transform(&self, payload: SetPayload<Transform>) -> Self {
        let target = payload.target().clone();
        match replace_by_id(&self.transforms, payload) {
            Some(transforms) => Self {
                transforms,
                ..self.clone()
            },
            None => {
                debug!(transform_id = %target, "set_transform: no transform with this id");
                self.clone()
            }
        }
    }

    pub fn set_transform_field(&self, id: &TransformId, axis: Axis, value: Component) -> Self {
        self.set_transform(SetPayload::update(id.clone(), move |transform: &Transform| {
            transform.with_field(axis, value)
        }))
    }

    pub fn commit_transform(&self, id: &TransformId) -> Self {
        self.set_transform(SetPayload::update(id.clone(), Transform::committed))
    }

    /// Moves a reference between (or within) chains.
    ///
    /// No-op when the item would land in front of itself, when either chain is
    /// missing, or when `before` is not in the destination chain.
    pub fn move_reference(&self, mv: &MoveReference) -> Self {
        if mv.before.as_ref() == Some(&mv.moved) {
            return self.clone();
        }
        let (Some(source), Some(dest)) = (self.chain(&mv.source), self.chain(&mv.dest)) else {
            debug!(source = %mv.source, dest = %mv.dest, "move_reference: unknown chain");
            return self.clone();
        };

        let source = source.without_reference(&mv.moved);
        let dest = if mv.source == mv.dest {
            source.clone()
        } else {
            dest.clone()
        };

        let insert_at = match &mv.before {
            None => dest.transforms.len(),
            Some(before) => match dest.transforms.iter().position(|id| id == before) {
                Some(index) => index,
                None => {
                    debug!(before = %before, dest = %mv.dest, "move_reference: anchor not in chain");
                    return self.clone();
                }
            },
        };
        let dest = TransformChain {
            id: dest.id.clone(),
            transforms: dest.transforms[..insert_at]
                .iter()
                .cloned()
                .chain([mv.moved.clone()])
                .chain(dest.transforms[insert_at..].iter().cloned())
                .collect(),
        };

        Self {
            chains: self
                .chains
                .iter()
                .map(|chain| {
                    if chain.id == mv.dest {
                        dest.clone()
                    } else if chain.id == mv.source {
                        source.clone()
                    } else {
                        chain.clone()
                    }
                })
                .collect(),
            ..self.clone()
        }
    }

    pub fn set_hovered(&self, id: &EntityId) -> Self {
        let mut hovered = self.hovered.clone();
        hovered.insert(id.clone());
        Self {
            hovered,
            ..self.clone()
        }
    }

    pub fn remove_hovered(&self, id: &EntityId) -> Self {
        let mut hovered = self.hovered.clone();
        hovered.remove(id);
        Self {
            hovered,
            ..self.clone()
        }
    }

    pub fn clear_hovered(&self) -> Self {
        Self {
            hovered: BTreeSet::new(),
            ..self.clone()
        }
    }

    pub fn set_selected(&self, id: &EntityId) -> Self {
        Self {
            selected: Some(id.clone()),
            ..self.clone()
        }
    }

    pub fn clear_selected(&self) -> Self {
        Self {
            selected: None,
            ..self.clone()
        }
    }

    pub fn apply(&self, action: StoreAction) -> Self {
        match action {
            StoreAction::AddChain(chain) => self.add_chain(chain),
            StoreAction::RemoveChain { id } => self.remove_chain(&id),
            StoreAction::SetChain(chain) => self.set_chain(SetPayload::Replace(chain)),
            StoreAction::SetChains(chains) => self.set_chains(chains),
            StoreAction::AddTransform(transform) => self.add_transform(transform),
            StoreAction::AppendTransform {
                chain_id,
                transform,
            } => self.append_transform(&chain_id, transform),
            StoreAction::RemoveTransform { id } => self.remove_transform(&id),
            StoreAction::SetTransform(transform) => {
                self.set_transform(SetPayload::Replace(transform))
            }
            StoreAction::SetTransformField { id, axis, value } => {
                self.set_transform_field(&id, axis, value)
            }
            StoreAction::CommitTransform { id } => self.commit_transform(&id),
            StoreAction::MoveReference(mv) => self.move_reference(&mv),
            StoreAction::SetHovered { id } => self.set_hovered(&id),
            StoreAction::RemoveHovered { id } => self.remove_hovered(&id),
            StoreAction::ClearHovered => self.clear_hovered(),
            StoreAction::SetSelected { id } => self.set_selected(&id),
            StoreAction::ClearSelected => self.clear_selected(),
        }
    }

    pub fn chain(&self, id: &ChainId) -> Option<&TransformChain> {
        self.chains.iter().find(|chain| &chain.id == id)
    }

    pub fn transform(&self, id: &TransformId) -> Option<&Transform> {
        self.transforms.iter().find(|transform| transform.id() == id)
    }

    pub fn is_transform_valid(&self, id: &TransformId) -> bool {
        self.transform(id).is_some_and(Transform::is_valid)
    }

    /// The chain's transforms in order, skipping references that no longer resolve.
    pub fn resolve_chain(&self, id: &ChainId) -> Vec<Transform> {
        let Some(chain) = self.chain(id) else {
            return Vec::new();
        };
        chain
            .transforms
            .iter()
            .filter_map(|transform_id| self.transform(transform_id))
            .cloned()
            .collect()
    }

    pub fn dangling_references(&self, id: &ChainId) -> Vec<&TransformId> {
        let Some(chain) = self.chain(id) else {
            return Vec::new();
        };
        chain
            .transforms
            .iter()
            .filter(|transform_id| self.transform(transform_id).is_none())
            .collect()
    }

    pub fn is_hovered(&self, id: &EntityId) -> bool {
        self.hovered.contains(id)
    }

    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn invalid_transforms(&self) -> Vec<&Transform> {
        self.transforms
            .iter()
            .filter(|transform| !transform.is_valid())
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
