use hapa_domain::id::UserId;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::ApiError;

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, user_id: &UserId) -> Result<User, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}
