//! In-memory repository implementations.
//!
//! Each repository wraps a [`MemoryTable`]: a `DashMap` keyed by id plus an
//! atomic id sequence. Listing sorts by id so pagination is stable. Data
//! lives for the lifetime of the process.

pub mod exercise;
pub mod program;
pub mod record;
pub mod sub_program;
pub mod user;

use std::sync::atomic::{AtomicI64, Ordering};

use coachbot_core::repository::{Page, Repositories};
use dashmap::DashMap;

pub use exercise::MemoryExerciseRepository;
pub use program::MemoryProgramRepository;
pub use record::MemoryRecordRepository;
pub use sub_program::MemorySubProgramRepository;
pub use user::MemoryUserRepository;

/// Concurrent row storage shared by the in-memory repositories.
pub struct MemoryTable<T> {
    rows: DashMap<i64, T>,
    sequence: AtomicI64,
}

impl<T: Clone> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            sequence: AtomicI64::new(1),
        }
    }

    /// Reserve the next id.
    pub fn next_id(&self) -> i64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    /// Insert or replace a row, returning a copy.
    pub fn put(&self, id: i64, row: T) -> T {
        self.rows.insert(id, row.clone());
        row
    }

    pub fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).map(|entry| entry.value().clone())
    }

    /// Apply `change` to an existing row and return the updated copy.
    pub fn update(&self, id: i64, change: impl FnOnce(&mut T)) -> Option<T> {
        let mut entry = self.rows.get_mut(&id)?;
        change(entry.value_mut());
        Some(entry.value().clone())
    }

    pub fn remove(&self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }

    /// Rows matching `filter`, ordered by id.
    pub fn select(&self, filter: impl Fn(&T) -> bool) -> Vec<(i64, T)> {
        let mut rows: Vec<(i64, T)> = self
            .rows
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows
    }

    /// One window of all rows, ordered by id.
    pub fn page(&self, page: Page) -> Vec<T> {
        window(self.select(|_| true).into_iter().map(|(_, row)| row), page)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: Clone> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for MemoryTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTable")
            .field("rows", &self.rows.len())
            .finish()
    }
}

fn window<T>(rows: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    rows.skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

/// Every in-memory repository behind the core `Repositories` bundle.
#[derive(Debug, Default)]
pub struct MemoryRepositories {
    pub users: MemoryUserRepository,
    pub programs: MemoryProgramRepository,
    pub sub_programs: MemorySubProgramRepository,
    pub exercises: MemoryExerciseRepository,
    pub records: MemoryRecordRepository,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repositories for MemoryRepositories {
    type Users = MemoryUserRepository;
    type Programs = MemoryProgramRepository;
    type SubPrograms = MemorySubProgramRepository;
    type Exercises = MemoryExerciseRepository;
    type Records = MemoryRecordRepository;

    fn users(&self) -> &MemoryUserRepository {
        &self.users
    }

    fn programs(&self) -> &MemoryProgramRepository {
        &self.programs
    }

    fn sub_programs(&self) -> &MemorySubProgramRepository {
        &self.sub_programs
    }

    fn exercises(&self) -> &MemoryExerciseRepository {
        &self.exercises
    }

    fn records(&self) -> &MemoryRecordRepository {
        &self.records
    }
}
