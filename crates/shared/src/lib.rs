//! Transform entity model, action protocol and model errors shared by the store and its consumers.

pub mod domain;
pub mod error;
pub mod protocol;
