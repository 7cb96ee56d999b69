//! Graph store and the mutation surface over it.

mod api;
mod error;
mod store;
mod types;

pub use api::{Chain, GraphApi, Outcome};
pub use error::{GraphError, Rejection};
pub use store::GraphStore;
pub use types::{Edge, EdgeKey, GraphSnapshot, Node, NodeId, NodeInput, NodePatch, Viewport};
