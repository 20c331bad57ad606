//! Record repository trait definition.

use coachbot_types::error::RepositoryError;
use coachbot_types::program::{NewRecord, Record};

use super::Page;

/// Repository trait for results logged by clients.
pub trait RecordRepository: Send + Sync {
    fn create(
        &self,
        record: &NewRecord,
    ) -> impl std::future::Future<Output = Result<Record, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Record>, RepositoryError>> + Send;

    fn delete_by_id(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// List a user's records, newest first.
    fn list_by_user(
        &self,
        user_id: i64,
        page: Page,
    ) -> impl std::future::Future<Output = Result<Vec<Record>, RepositoryError>> + Send;
}
