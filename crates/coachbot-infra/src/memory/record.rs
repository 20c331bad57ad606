//! In-memory record repository.

use chrono::Utc;
use coachbot_core::repository::{Page, RecordRepository};
use coachbot_types::error::RepositoryError;
use coachbot_types::program::{NewRecord, Record};

use super::{MemoryTable, window};

#[derive(Debug, Default)]
pub struct MemoryRecordRepository {
    table: MemoryTable<Record>,
}

impl RecordRepository for MemoryRecordRepository {
    async fn create(&self, record: &NewRecord) -> Result<Record, RepositoryError> {
        let id = self.table.next_id();
        Ok(self.table.put(
            id,
            Record {
                id,
                user_id: record.user_id,
                exercise_id: record.exercise_id,
                value: record.value,
                created_at: Utc::now(),
            },
        ))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>, RepositoryError> {
        Ok(self.table.get(id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.remove(id))
    }

    async fn list_by_user(&self, user_id: i64, page: Page) -> Result<Vec<Record>, RepositoryError> {
        // Ids are assigned in insertion order, so reversing gives newest first
        let rows = self.table.select(|record| record.user_id == user_id);
        Ok(window(rows.into_iter().rev().map(|(_, record)| record), page))
    }
}
