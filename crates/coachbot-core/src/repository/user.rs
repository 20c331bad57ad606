//! User repository trait definition.

use coachbot_types::error::RepositoryError;
use coachbot_types::user::{User, UserPatch};

use super::Page;

/// Repository trait for registered users.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Store a new user. The id is the chat platform's user id.
    fn create(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Apply a partial update. Returns the updated user, or `None` if missing.
    fn update_by_id(
        &self,
        id: i64,
        patch: &UserPatch,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Returns `true` if a user was deleted.
    fn delete_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// List users ordered by id.
    fn list(
        &self,
        page: Page,
    ) -> impl std::future::Future<Output = Result<Vec<User>, RepositoryError>> + Send;
}
