//! Sub-program repository trait definition.

use coachbot_types::error::RepositoryError;
use coachbot_types::program::{NewSubProgram, SubProgram, SubProgramPatch};

/// Repository trait for the days/blocks inside a program.
pub trait SubProgramRepository: Send + Sync {
    fn create(
        &self,
        sub_program: &NewSubProgram,
    ) -> impl std::future::Future<Output = Result<SubProgram, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<SubProgram>, RepositoryError>> + Send;

    fn update_by_id(
        &self,
        id: i64,
        patch: &SubProgramPatch,
    ) -> impl std::future::Future<Output = Result<Option<SubProgram>, RepositoryError>> + Send;

    fn delete_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Days of a program, oldest first.
    fn list_by_program(
        &self,
        program_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<SubProgram>, RepositoryError>> + Send;
}
