use chrono::{DateTime, Utc};
use tracing::info;

use hapa_domain::id::UserId;
use hapa_domain::user::UserRole;

use crate::domain::repository::{IdentityAuthority, UserRepository};
use crate::domain::types::{DelegatedIdentity, User};
use crate::error::ApiError;
use crate::usecase::token::{TokenIssuer, TokenPair};

/// Find-or-create for users, keyed by phone or by delegated subject id.
pub struct IdentityResolver<'a, U: UserRepository> {
    pub users: &'a U,
}

impl<U: UserRepository> IdentityResolver<'_, U> {
    /// Phone-verified login. `phone_number` must already be normalized.
    pub async fn resolve_phone(
        &self,
        phone_number: &str,
        signup_role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<User, ApiError> {
        match self.users.find_by_phone(phone_number).await? {
            Some(user) => self.touch(user, now).await,
            None => {
                let user = User::new(
                    UserId::generate(),
                    Some(phone_number.to_owned()),
                    signup_role,
                    now,
                );
                let created = self.users.create(&user).await?;
                info!(user_id = %created.id, role = %created.role, "user created by phone signup");
                Ok(created)
            }
        }
    }

    /// Delegated login. A new user's id is forced to the external subject id.
    pub async fn resolve_delegated(
        &self,
        identity: &DelegatedIdentity,
        now: DateTime<Utc>,
    ) -> Result<User, ApiError> {
        let id = UserId::from(identity.subject_id.as_str());
        match self.users.find_by_id(&id).await? {
            Some(user) => self.touch(user, now).await,
            None => {
                let user = User::new(
                    id,
                    identity.phone.clone(),
                    UserRole::for_delegated(identity.is_anonymous),
                    now,
                );
                let created = self.users.create(&user).await?;
                info!(user_id = %created.id, role = %created.role, "user created by delegated login");
                Ok(created)
            }
        }
    }

    async fn touch(&self, mut user: User, now: DateTime<Utc>) -> Result<User, ApiError> {
        self.users.touch_last_login(&user.id, now).await?;
        user.last_login_at = Some(now);
        Ok(user)
    }
}

/// Result of any successful login flow.
#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub tokens: TokenPair,
}

pub struct DelegatedLoginInput {
    pub access_token: Option<String>,
}

/// Exchange a token from the external identity authority for a local token pair.
pub struct DelegatedLoginUseCase<A: IdentityAuthority, U: UserRepository> {
    pub authority: A,
    pub users: U,
    pub tokens: TokenIssuer,
}

impl<A: IdentityAuthority, U: UserRepository> DelegatedLoginUseCase<A, U> {
    pub async fn execute(&self, input: DelegatedLoginInput) -> Result<LoginOutput, ApiError> {
        let presented = input
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::validation("access_token is required"))?;

        let identity = self.authority.verify(presented).await?;

        let resolver = IdentityResolver { users: &self.users };
        let user = resolver.resolve_delegated(&identity, Utc::now()).await?;
        let tokens = self.tokens.issue_pair(&user.id, &user.role)?;
        Ok(LoginOutput { user, tokens })
    }
}
