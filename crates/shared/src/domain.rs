use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Identifier of a chain or a transform.
///
/// Chains and transforms share one namespace: a chain's reference list is
/// cleaned of any removed id regardless of which collection it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

pub type ChainId = EntityId;
pub type TransformId = EntityId;

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a newly created row.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One quaternion or vector component.
///
/// `Text` holds an in-progress edit (`"-"`, `""`, `"1e"`) that may not parse
/// yet. It is stored as-is and only flagged as invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Component {
    Number(f64),
    Text(String),
}

// Bitwise on numbers: `-0` differs from `0`, and a NaN equals itself.
impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Component {
    pub fn from_input(raw: &str) -> Self {
        match parse_numeric(raw) {
            Some(value) => Self::Number(value),
            None => Self::Text(raw.to_string()),
        }
    }

    /// Numeric value, or `None` if the component is NaN or unparseable text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_nan() => None,
            Self::Number(value) => Some(*value),
            Self::Text(text) => parse_numeric(text),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.as_number().is_some()
    }

    pub fn commit(&self) -> Self {
        match self {
            Self::Text(text) => match parse_numeric(text) {
                Some(value) => Self::Number(value),
                None => self.clone(),
            },
            Self::Number(_) => self.clone(),
        }
    }
}

impl From<f64> for Component {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Number coercion for field input.
///
/// Accepts decimal and exponent literals with an optional sign, a signed
/// `Infinity`, and unsigned `0x`/`0o`/`0b` literals. Empty or whitespace-only
/// input does not count as a number.
fn parse_numeric(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let (sign, unsigned) = match text.as_bytes()[0] {
        b'-' => (-1.0, &text[1..]),
        b'+' => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    if unsigned == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    if let Some(value) = parse_radix_literal(text) {
        return Some(value);
    }

    // f64::from_str also takes "inf" and "nan", which are not numbers here.
    let plain_decimal = unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !plain_decimal {
        return None;
    }

    text.parse::<f64>().ok()
}

fn parse_radix_literal(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0, |acc: f64, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
    W,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::W => "w",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "z" => Ok(Self::Z),
            "w" => Ok(Self::W),
            _ => Err(ModelError::UnknownField(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Rotation,
    Translation,
}

impl TransformKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rotation => "rotation",
            Self::Translation => "translation",
        }
    }

    pub fn axes(self) -> &'static [Axis] {
        match self {
            Self::Rotation => &[Axis::X, Axis::Y, Axis::Z, Axis::W],
            Self::Translation => &[Axis::X, Axis::Y, Axis::Z],
        }
    }

    pub fn has_axis(self, axis: Axis) -> bool {
        self.axes().contains(&axis)
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rotation" => Ok(Self::Rotation),
            "translation" => Ok(Self::Translation),
            _ => Err(ModelError::UnknownKind(s.to_string())),
        }
    }
}

/// A single rotation (quaternion) or translation (vector) step of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    Rotation {
        id: TransformId,
        x: Component,
        y: Component,
        z: Component,
        w: Component,
    },
    Translation {
        id: TransformId,
        x: Component,
        y: Component,
        z: Component,
    },
}

impl Transform {
    pub fn rotation(
        id: impl Into<TransformId>,
        x: impl Into<Component>,
        y: impl Into<Component>,
        z: impl Into<Component>,
        w: impl Into<Component>,
    ) -> Self {
        Self::Rotation {
            id: id.into(),
            x: x.into(),
            y: y.into(),
            z: z.into(),
            w: w.into(),
        }
    }

    pub fn translation(
        id: impl Into<TransformId>,
        x: impl Into<Component>,
        y: impl Into<Component>,
        z: impl Into<Component>,
    ) -> Self {
        Self::Translation {
            id: id.into(),
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    /// What the editor's "add rotation" button creates.
    pub fn identity_rotation(id: impl Into<TransformId>) -> Self {
        Self::rotation(id, 0.0, 0.0, 0.0, 1.0)
    }

    pub fn unit_translation(id: impl Into<TransformId>) -> Self {
        Self::translation(id, 1.0, 1.0, 1.0)
    }

    pub fn id(&self) -> &TransformId {
        match self {
            Self::Rotation { id, .. } | Self::Translation { id, .. } => id,
        }
    }

    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Rotation { .. } => TransformKind::Rotation,
            Self::Translation { .. } => TransformKind::Translation,
        }
    }

    pub fn field(&self, axis: Axis) -> Option<&Component> {
        match (self, axis) {
            (Self::Rotation { x, .. } | Self::Translation { x, .. }, Axis::X) => Some(x),
            (Self::Rotation { y, .. } | Self::Translation { y, .. }, Axis::Y) => Some(y),
            (Self::Rotation { z, .. } | Self::Translation { z, .. }, Axis::Z) => Some(z),
            (Self::Rotation { w, .. }, Axis::W) => Some(w),
            (Self::Translation { .. }, Axis::W) => None,
        }
    }

    pub fn with_field(&self, axis: Axis, value: Component) -> Self {
        let mut next = self.clone();
        // translations have no w
        if let Some(slot) = next.field_mut(axis) {
            *slot = value;
        }
        next
    }

    fn field_mut(&mut self, axis: Axis) -> Option<&mut Component> {
        match (self, axis) {
            (Self::Rotation { x, .. } | Self::Translation { x, .. }, Axis::X) => Some(x),
            (Self::Rotation { y, .. } | Self::Translation { y, .. }, Axis::Y) => Some(y),
            (Self::Rotation { z, .. } | Self::Translation { z, .. }, Axis::Z) => Some(z),
            (Self::Rotation { w, .. }, Axis::W) => Some(w),
            (Self::Translation { .. }, Axis::W) => None,
        }
    }

    pub fn fields(&self) -> Vec<(Axis, &Component)> {
        self.kind()
            .axes()
            .iter()
            .filter_map(|&axis| self.field(axis).map(|value| (axis, value)))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_valid())
    }

    pub fn invalid_fields(&self) -> Vec<Axis> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| !value.is_valid())
            .map(|(axis, _)| axis)
            .collect()
    }

    pub fn committed(&self) -> Self {
        self.fields()
            .into_iter()
            .fold(self.clone(), |acc, (axis, value)| {
                acc.with_field(axis, value.commit())
            })
    }
}

pub fn is_field_valid(value: &Component) -> bool {
    value.is_valid()
}

pub fn is_transform_valid(transform: &Transform) -> bool {
    transform.is_valid()
}

/// Ordered references into the global transform collection.
///
/// Ids that no longer resolve are tolerated and skipped when the chain is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformChain {
    pub id: ChainId,
    #[serde(default)]
    pub transforms: Vec<TransformId>,
}

impl TransformChain {
    pub fn new(id: impl Into<ChainId>) -> Self {
        Self {
            id: id.into(),
            transforms: Vec::new(),
        }
    }

    pub fn with_transforms(mut self, transforms: impl IntoIterator<Item = TransformId>) -> Self {
        self.transforms = transforms.into_iter().collect();
        self
    }

    pub fn references(&self, id: &EntityId) -> bool {
        self.transforms.contains(id)
    }

    pub fn without_reference(&self, id: &EntityId) -> Self {
        Self {
            id: self.id.clone(),
            transforms: self
                .transforms
                .iter()
                .filter(|existing| *existing != id)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
