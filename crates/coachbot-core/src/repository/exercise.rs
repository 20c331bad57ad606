//! Exercise repository trait definition.

use coachbot_types::error::RepositoryError;
use coachbot_types::program::{Exercise, ExercisePatch, NewExercise};

/// Repository trait for exercises.
pub trait ExerciseRepository: Send + Sync {
    fn create(
        &self,
        exercise: &NewExercise,
    ) -> impl std::future::Future<Output = Result<Exercise, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Exercise>, RepositoryError>> + Send;

    fn update_by_id(
        &self,
        id: i64,
        patch: &ExercisePatch,
    ) -> impl std::future::Future<Output = Result<Option<Exercise>, RepositoryError>> + Send;

    fn delete_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Exercises of a sub-program in creation order.
    fn list_by_sub_program(
        &self,
        sub_program_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Exercise>, RepositoryError>> + Send;
}
