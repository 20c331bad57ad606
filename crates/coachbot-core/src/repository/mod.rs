//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (coachbot-infra) implements. The core crate never depends on any
//! specific storage technology.
//!
//! Lookups return `Ok(None)` for a missing entity; `Err` is reserved for
//! infrastructure failures.

pub mod exercise;
pub mod program;
pub mod record;
pub mod sub_program;
pub mod user;

pub use exercise::ExerciseRepository;
pub use program::ProgramRepository;
pub use record::RecordRepository;
pub use sub_program::SubProgramRepository;
pub use user::UserRepository;

/// Pagination window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Window immediately after this one.
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }

    /// Window immediately before this one, if any.
    pub fn previous(&self) -> Option<Self> {
        (self.offset > 0).then(|| Self {
            limit: self.limit,
            offset: self.offset.saturating_sub(self.limit),
        })
    }
}

/// Bundle of every repository the pipeline needs.
///
/// Interceptors and handlers are generic over one `Repositories` value
/// instead of five separate type parameters.
pub trait Repositories: Send + Sync + 'static {
    type Users: UserRepository;
    type Programs: ProgramRepository;
    type SubPrograms: SubProgramRepository;
    type Exercises: ExerciseRepository;
    type Records: RecordRepository;

    fn users(&self) -> &Self::Users;
    fn programs(&self) -> &Self::Programs;
    fn sub_programs(&self) -> &Self::SubPrograms;
    fn exercises(&self) -> &Self::Exercises;
    fn records(&self) -> &Self::Records;
}
