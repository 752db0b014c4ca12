use serde::{Deserialize, Serialize};

use crate::domain::{Axis, ChainId, Component, EntityId, Transform, TransformChain, TransformId};

/// Serializable store actions.
///
/// Updater closures cannot cross a wire, so `SetTransformField` stands in for
/// the per-field updater the editor issues on every keystroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StoreAction {
    AddChain(TransformChain),
    RemoveChain {
        id: ChainId,
    },
    SetChain(TransformChain),
    SetChains(Vec<TransformChain>),
    AddTransform(Transform),
    AppendTransform {
        chain_id: ChainId,
        transform: Transform,
    },
    RemoveTransform {
        id: TransformId,
    },
    SetTransform(Transform),
    SetTransformField {
        id: TransformId,
        axis: Axis,
        value: Component,
    },
    CommitTransform {
        id: TransformId,
    },
    MoveReference(MoveReference),
    SetHovered {
        id: EntityId,
    },
    RemoveHovered {
        id: EntityId,
    },
    ClearHovered,
    SetSelected {
        id: EntityId,
    },
    ClearSelected,
}

impl StoreAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddChain(_) => "add_chain",
            Self::RemoveChain { .. } => "remove_chain",
            Self::SetChain(_) => "set_chain",
            Self::SetChains(_) => "set_chains",
            Self::AddTransform(_) => "add_transform",
            Self::AppendTransform { .. } => "append_transform",
            Self::RemoveTransform { .. } => "remove_transform",
            Self::SetTransform(_) => "set_transform",
            Self::SetTransformField { .. } => "set_transform_field",
            Self::CommitTransform { .. } => "commit_transform",
            Self::MoveReference(_) => "move_reference",
            Self::SetHovered { .. } => "set_hovered",
            Self::RemoveHovered { .. } => "remove_hovered",
            Self::ClearHovered => "clear_hovered",
            Self::SetSelected { .. } => "set_selected",
            Self::ClearSelected => "clear_selected",
        }
    }
}

/// Move `moved` out of chain `source` and into chain `dest`, in front of
/// `before`, or at the back when `before` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReference {
    pub source: ChainId,
    pub dest: ChainId,
    pub moved: EntityId,
    #[serde(default)]
    pub before: Option<EntityId>,
}

/// Drop indicators without an item mark the back of a container.
pub const NO_ITEM: &str = "-1";

/// Data carried by a drag: the dragged row and the chain it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub item_id: String,
    pub container_id: String,
}

/// Where a drag ended: a chain and the row the item lands in front of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub container_id: String,
    pub before_item: Option<String>,
}

impl DropTarget {
    /// Builds a target from raw indicator attributes, where [`NO_ITEM`] means "append".
    pub fn from_indicator(item: &str, container: &str) -> Self {
        Self {
            container_id: container.to_string(),
            before_item: (item != NO_ITEM).then(|| item.to_string()),
        }
    }
}

impl DragPayload {
    /// Resolves a drop into a move, or `None` when the item is dropped in front of itself.
    pub fn drop_onto(&self, target: &DropTarget) -> Option<MoveReference> {
        if target.before_item.as_deref() == Some(self.item_id.as_str()) {
            return None;
        }
        Some(MoveReference {
            source: EntityId::new(self.container_id.clone()),
            dest: EntityId::new(target.container_id.clone()),
            moved: EntityId::new(self.item_id.clone()),
            before: target.before_item.clone().map(EntityId::new),
        })
    }
}
