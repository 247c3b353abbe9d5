//! Resolving bearer credentials to backend users.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use openeo_model::User;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::database::ports::users::UsersRepository;
use crate::error::{CoreError, Result};

/// Maps a bearer token to the subject of an external identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the token is not recognised.
    async fn subject_for(&self, token: &str) -> Result<Option<String>>;
}

/// One statically configured token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub subject: String,
}

/// Identity provider backed by a fixed token table.
#[derive(Clone, Default)]
pub struct StaticTokenIdentity {
    tokens: HashMap<String, String>,
}

impl fmt::Debug for StaticTokenIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the tokens themselves.
        f.debug_struct("StaticTokenIdentity")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl StaticTokenIdentity {
    pub fn new(grants: impl IntoIterator<Item = TokenGrant>) -> Self {
        Self {
            tokens: grants
                .into_iter()
                .map(|grant| (grant.token, grant.subject))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentity {
    async fn subject_for(&self, token: &str) -> Result<Option<String>> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// Turns an `Authorization` header into a [`User`], registering the user on
/// first successful authentication.
#[derive(Clone)]
pub struct Authenticator {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UsersRepository>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        users: Arc<dyn UsersRepository>,
    ) -> Self {
        Self { provider, users }
    }

    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<User> {
        let header = authorization
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(CoreError::authentication_required)?;
        let token = bearer_token(header).ok_or_else(CoreError::token_invalid)?;

        let Some(subject) = self.provider.subject_for(token).await? else {
            warn!("rejected unknown bearer token");
            return Err(CoreError::token_invalid());
        };

        let user = self.users.ensure_user(&subject).await?;
        debug!(user_id = %user.user_id, "authenticated request");
        Ok(user)
    }
}

/// Extracts the token from `Bearer <token>`; the scheme is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
