//! Training program entities.
//!
//! A program groups sub-programs (training days), each of which lists
//! exercises. Clients log records against exercises.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A training program authored by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    /// Admin who created the program.
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A single day or block inside a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubProgram {
    pub id: i64,
    pub program_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub sub_program_id: i64,
    pub name: String,
    /// Free-form prescription, e.g. "5x5 @ 80%".
    pub description: String,
}

/// A result logged by a client for an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub value: f64,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a program; the id is assigned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProgram {
    pub name: String,
    pub owner_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubProgram {
    pub program_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExercise {
    pub sub_program_id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub user_id: i64,
    pub exercise_id: i64,
    pub value: f64,
}

/// Partial update for a program. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramPatch {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubProgramPatch {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub description: Option<String>,
}
