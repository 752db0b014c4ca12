//! Normalized state store for chains of rotation and translation transforms.
//!
//! Chains hold ordered references into one global transform collection.
//! Every mutation is a pure reducer over an immutable [`StoreState`]; the
//! [`TransformStore`] handle serializes them and publishes each new snapshot
//! to subscribers. [`binding`] adapts the store for editor and viewport code.

pub mod binding;
pub mod state;
pub mod store;

pub use binding::{
    chain_view, chain_views, handle_drop, ChainView, FieldHandler, HoverHandle, RowView,
    Selection, SelectionClosed, StoreProvider, TransformFieldBinding,
};
pub use state::{SetPayload, StoreState, Updater};
pub use store::TransformStore;
