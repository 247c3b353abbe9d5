use async_trait::async_trait;
use openeo_model::{User, UserId};

use crate::error::Result;

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>>;
    async fn get_by_subject(&self, oidc_sub: &str) -> Result<Option<User>>;

    /// Returns the user for `oidc_sub`, creating it on first sight.
    ///
    /// Concurrent calls for the same subject resolve to a single user.
    async fn ensure_user(&self, oidc_sub: &str) -> Result<User>;
}
