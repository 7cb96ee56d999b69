use thiserror::Error;

use super::types::NodeId;

/// Why a mutation was not applied. Never fatal: the store is left as it was.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
	/// An explicit id is already taken.
	#[error("node with id {0} already exists")]
	DuplicateNode(NodeId),
	/// No node with this id.
	#[error("node {0} not found")]
	NodeNotFound(NodeId),
	/// Edge from a node to itself.
	#[error("self-loops are not supported (node {0})")]
	SelfLoop(NodeId),
	/// An edge endpoint does not exist.
	#[error("cannot add edge: source ({source_id}) or target ({target_id}) node not found")]
	MissingEndpoint { source_id: NodeId, target_id: NodeId },
	/// The pair is already connected in some direction.
	#[error("edge between {source_id} and {target_id} already exists")]
	DuplicateEdge { source_id: NodeId, target_id: NodeId },
	/// No edge joins the pair.
	#[error("no edge between {source_id} and {target_id}")]
	EdgeNotFound { source_id: NodeId, target_id: NodeId },
}

/// Hard failures surfaced to the host view.
#[derive(Debug, Error)]
pub enum GraphError {
	/// Response body is not the expected JSON.
	#[error("malformed backend response: {0}")]
	MalformedResponse(#[from] serde_json::Error),
	/// The backend reported a failure.
	#[error("backend error: {0}")]
	Backend(String),
	/// A structure's payload does not match its kind.
	#[error("structure '{name}' has an invalid {kind} payload: {reason}")]
	InvalidPayload {
		name: String,
		kind: String,
		reason: String,
	},
	/// Configuration failed to parse or validate.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

impl GraphError {
	/// Shorthand for [`GraphError::Backend`].
	pub fn backend<T: Into<String>>(msg: T) -> Self {
		GraphError::Backend(msg.into())
	}

	/// Shorthand for [`GraphError::InvalidConfig`].
	pub fn invalid_config<T: Into<String>>(msg: T) -> Self {
		GraphError::InvalidConfig(msg.into())
	}
}
