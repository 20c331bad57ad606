//! In-memory sub-program repository.

use coachbot_core::repository::SubProgramRepository;
use coachbot_types::error::RepositoryError;
use coachbot_types::program::{NewSubProgram, SubProgram, SubProgramPatch};

use super::MemoryTable;

#[derive(Debug, Default)]
pub struct MemorySubProgramRepository {
    table: MemoryTable<SubProgram>,
}

impl SubProgramRepository for MemorySubProgramRepository {
    async fn create(&self, sub_program: &NewSubProgram) -> Result<SubProgram, RepositoryError> {
        let id = self.table.next_id();
        Ok(self.table.put(
            id,
            SubProgram {
                id,
                program_id: sub_program.program_id,
                name: sub_program.name.clone(),
            },
        ))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<SubProgram>, RepositoryError> {
        Ok(self.table.get(id))
    }

    async fn update_by_id(
        &self,
        id: i64,
        patch: &SubProgramPatch,
    ) -> Result<Option<SubProgram>, RepositoryError> {
        Ok(self.table.update(id, |sub_program| {
            if let Some(name) = &patch.name {
                sub_program.name = name.clone();
            }
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.remove(id))
    }

    async fn list_by_program(&self, program_id: i64) -> Result<Vec<SubProgram>, RepositoryError> {
        Ok(self
            .table
            .select(|sub_program| sub_program.program_id == program_id)
            .into_iter()
            .map(|(_, sub_program)| sub_program)
            .collect())
    }
}
