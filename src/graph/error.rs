use thiserror::Error;

use crate::layout::ConfigError;

/// Failures of graph store operations addressed by id.
#[derive(Debug, Error)]
pub enum GraphError {
	/// No node carries this id.
	#[error("Node not found: {0}")]
	UnknownNode(String),
	/// An edge would start and end on the same node.
	#[error("Cannot connect node {0} to itself")]
	SelfLoop(String),
	/// Two nodes were given the same id.
	#[error("Duplicate node id: {0}")]
	DuplicateNode(String),
	/// Two edges were given, or derive, the same id.
	#[error("Duplicate edge id: {0}")]
	DuplicateEdge(String),
	/// The layout configuration failed validation.
	#[error("Invalid layout config: {0}")]
	InvalidConfig(#[from] ConfigError),
}
