use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::UserId;

/// A named process graph registered by, and visible only to, one user.
///
/// `(udp_id, user_id)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDefinedProcess {
    pub udp_id: String,
    pub user_id: UserId,
    pub process_graph: Value,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UserDefinedProcess {
    pub fn new(
        udp_id: impl Into<String>,
        user_id: UserId,
        process_graph: Value,
    ) -> Self {
        Self {
            udp_id: udp_id.into(),
            user_id,
            process_graph,
            created: Utc::now(),
            parameters: None,
            returns: None,
            summary: None,
            description: None,
        }
    }
}
