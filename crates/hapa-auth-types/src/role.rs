//! Role gate for privileged routes.

use hapa_domain::user::UserRole;

use crate::token::TokenInfo;

/// True iff the token's role claim equals `required`. No hierarchy, no role sets.
pub fn authorize(info: &TokenInfo, required: &UserRole) -> bool {
    &info.role == required
}
