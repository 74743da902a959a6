//! Node/edge model and the store that owns it.

mod error;
mod model;
mod store;

pub use error::GraphError;
pub use model::{NodeData, NodeKind, PlanEdge, PlanNode, Position};
pub use store::{IdGenerator, PlanGraph};
