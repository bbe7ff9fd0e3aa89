use serde::{Deserialize, Serialize};

use subway_core::MemberId;

/// An authenticated caller, resolved once per request.
///
/// Handlers receive this as an ordinary parameter; it is never stored in
/// shared state and never outlives the request it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    id: MemberId,
    email: String,
}

impl Principal {
    pub fn new(id: MemberId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
