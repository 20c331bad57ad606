//! In-memory user repository.

use coachbot_core::repository::{Page, UserRepository};
use coachbot_types::error::RepositoryError;
use coachbot_types::user::{User, UserPatch};

use super::MemoryTable;

/// Users keyed by their chat platform id.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    table: MemoryTable<User>,
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        if self.table.get(user.id).is_some() {
            return Err(RepositoryError::Conflict(format!(
                "user {} already exists",
                user.id
            )));
        }
        Ok(self.table.put(user.id, user.clone()))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(self.table.get(id))
    }

    async fn update_by_id(
        &self,
        id: i64,
        patch: &UserPatch,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self.table.update(id, |user| {
            if let Some(role) = patch.role {
                user.role = role;
            }
            if let Some(approved) = patch.approved {
                user.approved = approved;
            }
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.remove(id))
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, RepositoryError> {
        Ok(self.table.page(page))
    }
}
