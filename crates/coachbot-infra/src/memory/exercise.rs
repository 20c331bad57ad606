//! In-memory exercise repository.

use coachbot_core::repository::ExerciseRepository;
use coachbot_types::error::RepositoryError;
use coachbot_types::program::{Exercise, ExercisePatch, NewExercise};

use super::MemoryTable;

#[derive(Debug, Default)]
pub struct MemoryExerciseRepository {
    table: MemoryTable<Exercise>,
}

impl ExerciseRepository for MemoryExerciseRepository {
    async fn create(&self, exercise: &NewExercise) -> Result<Exercise, RepositoryError> {
        let id = self.table.next_id();
        Ok(self.table.put(
            id,
            Exercise {
                id,
                sub_program_id: exercise.sub_program_id,
                name: exercise.name.clone(),
                description: exercise.description.clone(),
            },
        ))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Exercise>, RepositoryError> {
        Ok(self.table.get(id))
    }

    async fn update_by_id(
        &self,
        id: i64,
        patch: &ExercisePatch,
    ) -> Result<Option<Exercise>, RepositoryError> {
        Ok(self.table.update(id, |exercise| {
            if let Some(name) = &patch.name {
                exercise.name = name.clone();
            }
            if let Some(description) = &patch.description {
                exercise.description = description.clone();
            }
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.remove(id))
    }

    async fn list_by_sub_program(
        &self,
        sub_program_id: i64,
    ) -> Result<Vec<Exercise>, RepositoryError> {
        Ok(self
            .table
            .select(|exercise| exercise.sub_program_id == sub_program_id)
            .into_iter()
            .map(|(_, exercise)| exercise)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn description_survives_rename() {
        let repo = MemoryExerciseRepository::default();
        let exercise = repo
            .create(&NewExercise {
                sub_program_id: 1,
                name: "Squat".to_string(),
                description: "5x5 @ 80%".to_string(),
            })
            .await
            .unwrap();

        let patch = ExercisePatch {
            name: Some("Front Squat".to_string()),
            description: None,
        };
        let updated = repo.update_by_id(exercise.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "Front Squat");
        assert_eq!(updated.description, "5x5 @ 80%");
    }

    #[tokio::test]
    async fn lists_exercises_of_one_day_in_order() {
        let repo = MemoryExerciseRepository::default();
        for (sub_program_id, name) in [(1, "Squat"), (2, "Bench"), (1, "Lunge")] {
            repo.create(&NewExercise {
                sub_program_id,
                name: name.to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        }

        let names: Vec<String> = repo
            .list_by_sub_program(1)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Squat", "Lunge"]);
    }
}
