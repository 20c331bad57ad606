//! Program repository trait definition.

use coachbot_types::error::RepositoryError;
use coachbot_types::program::{NewProgram, Program, ProgramPatch};

use super::Page;

/// Repository trait for training programs.
pub trait ProgramRepository: Send + Sync {
    fn create(
        &self,
        program: &NewProgram,
    ) -> impl std::future::Future<Output = Result<Program, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Program>, RepositoryError>> + Send;

    /// Apply a partial update. Returns the updated program, or `None` if missing.
    fn update_by_id(
        &self,
        id: i64,
        patch: &ProgramPatch,
    ) -> impl std::future::Future<Output = Result<Option<Program>, RepositoryError>> + Send;

    /// Returns `true` if a program was deleted.
    fn delete_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// List programs ordered by id.
    fn list(
        &self,
        page: Page,
    ) -> impl std::future::Future<Output = Result<Vec<Program>, RepositoryError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
