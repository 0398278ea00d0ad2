//! Explicit session context.
//!
//! The owner identity and gateway token are handed to the core by whatever
//! hosts it; nothing here reads cookies or other ambient credential stores.

use crate::types::{AuthToken, OwnerIdentity};

/// Identity and credentials for the signed-in owner.
#[derive(Clone, Debug)]
pub struct SessionContext {
    identity: OwnerIdentity,
    token: AuthToken,
}

impl SessionContext {
    pub fn new(identity: impl Into<OwnerIdentity>, token: AuthToken) -> Self {
        Self {
            identity: identity.into(),
            token,
        }
    }

    pub fn identity(&self) -> &OwnerIdentity {
        &self.identity
    }

    pub fn token(&self) -> &AuthToken {
        &self.token
    }
}
