//! In-memory program repository.

use chrono::Utc;
use coachbot_core::repository::{Page, ProgramRepository};
use coachbot_types::error::RepositoryError;
use coachbot_types::program::{NewProgram, Program, ProgramPatch};

use super::MemoryTable;

#[derive(Debug, Default)]
pub struct MemoryProgramRepository {
    table: MemoryTable<Program>,
}

impl ProgramRepository for MemoryProgramRepository {
    async fn create(&self, program: &NewProgram) -> Result<Program, RepositoryError> {
        let id = self.table.next_id();
        Ok(self.table.put(
            id,
            Program {
                id,
                name: program.name.clone(),
                owner_id: program.owner_id,
                created_at: Utc::now(),
            },
        ))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Program>, RepositoryError> {
        Ok(self.table.get(id))
    }

    async fn update_by_id(
        &self,
        id: i64,
        patch: &ProgramPatch,
    ) -> Result<Option<Program>, RepositoryError> {
        Ok(self.table.update(id, |program| {
            if let Some(name) = &patch.name {
                program.name = name.clone();
            }
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.remove(id))
    }

    async fn list(&self, page: Page) -> Result<Vec<Program>, RepositoryError> {
        Ok(self.table.page(page))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.table.len() as u64)
    }
}
