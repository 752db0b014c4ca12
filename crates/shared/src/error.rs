use thiserror::Error;

use crate::domain::{Axis, TransformKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown transform field '{0}'")]
    UnknownField(String),
    #[error("unknown transform kind '{0}'")]
    UnknownKind(String),
    #[error("{kind} transforms have no '{axis}' component")]
    AxisNotOnKind { kind: TransformKind, axis: Axis },
}
