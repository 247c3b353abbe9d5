use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A backend user, keyed by the subject of their external identity.
///
/// Users are created on first successful authentication and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub oidc_sub: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(oidc_sub: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(),
            oidc_sub: oidc_sub.into(),
            created_at: Utc::now(),
        }
    }
}
