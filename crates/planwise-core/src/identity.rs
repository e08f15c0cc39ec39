//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

use crate::event::UserId;

/// The identity attached to a request after a successful authorization
/// check. Carries exactly what the access token embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
}

impl Identity {
    /// Creates an identity.
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}
