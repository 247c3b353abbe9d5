use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{ModelError, Result},
    ids::{ProcessGraphId, UserId},
};

/// An immutable, stored process graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessGraph {
    pub process_graph_id: ProcessGraphId,
    pub process_graph: Value,
    pub user_id: UserId,
    pub created: DateTime<Utc>,
}

impl ProcessGraph {
    pub fn new(
        process_graph_id: ProcessGraphId,
        user_id: UserId,
        process_graph: Value,
    ) -> Self {
        Self {
            process_graph_id,
            process_graph,
            user_id,
            created: Utc::now(),
        }
    }
}

/// Checks the structural shape of a process graph body.
///
/// A graph is a non-empty object of nodes; each node is an object carrying a
/// string `process_id` and an object of `arguments`.
pub fn validate_process_graph(graph: &Value) -> Result<()> {
    let nodes = graph.as_object().ok_or_else(|| {
        ModelError::InvalidProcessGraph("process graph must be an object".into())
    })?;

    if nodes.is_empty() {
        return Err(ModelError::InvalidProcessGraph(
            "process graph has no nodes".into(),
        ));
    }

    for (node_id, node) in nodes {
        let node = node.as_object().ok_or_else(|| {
            ModelError::InvalidProcessGraph(format!(
                "node '{node_id}' must be an object"
            ))
        })?;

        match node.get("process_id") {
            Some(Value::String(id)) if !id.is_empty() => {}
            _ => {
                return Err(ModelError::InvalidProcessGraph(format!(
                    "node '{node_id}' is missing 'process_id'"
                )));
            }
        }

        if !matches!(node.get("arguments"), Some(Value::Object(_))) {
            return Err(ModelError::InvalidProcessGraph(format!(
                "node '{node_id}' is missing 'arguments'"
            )));
        }
    }

    Ok(())
}
