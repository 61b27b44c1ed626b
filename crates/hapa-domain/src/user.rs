//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status given to every newly created user.
pub const STATUS_ACTIVE: &str = "active";

/// Permission class of a user, embedded as the `role` claim in every token.
///
/// Wire format: snake_case string (`"venue_owner"`, `"anonymous"`, `"authenticated"`).
/// Roles are flat; there is no hierarchy between them. The set is open:
/// any other non-empty name is carried through as [`UserRole::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UserRole {
    VenueOwner,
    Anonymous,
    Authenticated,
    Other(String),
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::VenueOwner => "venue_owner",
            Self::Anonymous => "anonymous",
            Self::Authenticated => "authenticated",
            Self::Other(name) => name,
        }
    }

    /// Role assigned to a first-time delegated-identity login.
    pub fn for_delegated(is_anonymous: bool) -> Self {
        if is_anonymous {
            Self::Anonymous
        } else {
            Self::Authenticated
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("role name must not be empty")]
pub struct EmptyRole;

impl FromStr for UserRole {
    type Err = EmptyRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(EmptyRole),
            "venue_owner" => Ok(Self::VenueOwner),
            "anonymous" => Ok(Self::Anonymous),
            "authenticated" => Ok(Self::Authenticated),
            other => Ok(Self::Other(other.to_owned())),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = EmptyRole;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}
