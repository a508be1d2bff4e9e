//! User repository trait: the narrow read interface onto the identity store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Read access to users and their role assignments
///
/// The admin CRUD layer owns these records. Implementations return users with
/// `roles` (and each role's permissions) populated.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No such user (deleted accounts included)
    /// * `Err(DomainError)` - Store failure
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by login name (exact match)
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
}
