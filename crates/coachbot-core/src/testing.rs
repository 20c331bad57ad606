//! In-memory fakes for pipeline tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use chrono::Utc;
use coachbot_types::config::BotConfig;
use coachbot_types::error::{RepositoryError, SendError};
use coachbot_types::event::{EventKind, InboundEvent, Keyboard, MessageId};
use coachbot_types::program::{
    Exercise, ExercisePatch, NewExercise, NewProgram, NewRecord, NewSubProgram, Program,
    ProgramPatch, Record, SubProgram, SubProgramPatch,
};
use coachbot_types::user::{Role, User, UserPatch};
use tokio_util::sync::CancellationToken;

use crate::repository::{
    ExerciseRepository, Page, ProgramRepository, RecordRepository, Repositories,
    SubProgramRepository, UserRepository,
};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

pub type TestServices = Services<FakeRepos, RecordingSender>;

pub fn services() -> Arc<TestServices> {
    services_with(BotConfig::default())
}

pub fn services_with(config: BotConfig) -> Arc<TestServices> {
    Arc::new(Services::new(
        FakeRepos::default(),
        RecordingSender::default(),
        config,
    ))
}

pub fn event(chat_id: i64, user_id: i64, kind: EventKind) -> InboundEvent {
    InboundEvent {
        id: format!("ev-{chat_id}-{user_id}"),
        chat_id,
        user_id,
        username: Some("tester".to_string()),
        kind,
    }
}

pub fn text_event(chat_id: i64, user_id: i64, text: &str) -> InboundEvent {
    event(
        chat_id,
        user_id,
        EventKind::Text {
            text: text.to_string(),
        },
    )
}

pub fn callback_event(chat_id: i64, user_id: i64, data: &str) -> InboundEvent {
    event(
        chat_id,
        user_id,
        EventKind::Callback {
            data: data.to_string(),
        },
    )
}

pub fn command_event(chat_id: i64, user_id: i64, name: &str) -> InboundEvent {
    event(
        chat_id,
        user_id,
        EventKind::Command {
            name: name.to_string(),
            args: String::new(),
        },
    )
}

pub fn text_session(chat_id: i64, user_id: i64, text: &str) -> Session {
    Session::new(text_event(chat_id, user_id, text), CancellationToken::new())
}

pub fn callback_session(chat_id: i64, user_id: i64, data: &str) -> Session {
    Session::new(
        callback_event(chat_id, user_id, data),
        CancellationToken::new(),
    )
}

pub fn user(id: i64, role: Role, approved: bool) -> User {
    User {
        id,
        chat_id: id,
        username: format!("user{id}"),
        role,
        approved,
        created_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

pub struct RecordingSender {
    sent: Mutex<Vec<SentMessage>>,
    acked: Mutex<Vec<String>>,
    ack_ok: AtomicBool,
    next_id: AtomicI64,
}

impl Default for RecordingSender {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            acked: Mutex::new(Vec::new()),
            ack_ok: AtomicBool::new(true),
            next_id: AtomicI64::new(1),
        }
    }
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.chat_id == chat_id)
            .collect()
    }

    pub fn acked(&self) -> Vec<String> {
        self.acked.lock().unwrap().clone()
    }

    pub fn reject_acks(&self) {
        self.ack_ok.store(false, Ordering::SeqCst);
    }
}

impl Sender for RecordingSender {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, SendError> {
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn delete(&self, _chat_id: i64, _message_id: MessageId) -> Result<(), SendError> {
        Ok(())
    }

    async fn answer_inbound_event(&self, event_id: &str) -> bool {
        self.acked.lock().unwrap().push(event_id.to_string());
        self.ack_ok.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

struct Table<T> {
    rows: Mutex<BTreeMap<i64, T>>,
    next_id: AtomicI64,
}

impl<T: Clone> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<T: Clone> Table<T> {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn insert(&self, id: i64, row: T) -> T {
        self.rows.lock().unwrap().insert(id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn update(&self, id: i64, apply: impl FnOnce(&mut T)) -> Option<T> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id)?;
        apply(row);
        Some(row.clone())
    }

    fn remove(&self, id: i64) -> bool {
        self.rows.lock().unwrap().remove(&id).is_some()
    }

    fn page(&self, page: Page) -> Vec<T> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect()
    }

    fn select(&self, filter: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .filter(|row| filter(row))
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

/// Shared switch that makes every repository call fail.
#[derive(Default)]
pub struct Outage(AtomicBool);

impl Outage {
    fn check(&self) -> Result<(), RepositoryError> {
        if self.0.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection("database is down".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeUsers {
    table: Table<User>,
    outage: Arc<Outage>,
}

impl FakeUsers {
    pub fn insert(&self, user: User) {
        self.table.insert(user.id, user);
    }

    pub fn get(&self, id: i64) -> Option<User> {
        self.table.get(id)
    }
}

impl UserRepository for FakeUsers {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        self.outage.check()?;
        Ok(self.table.insert(user.id, user.clone()))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        self.outage.check()?;
        Ok(self.table.get(id))
    }

    async fn update_by_id(
        &self,
        id: i64,
        patch: &UserPatch,
    ) -> Result<Option<User>, RepositoryError> {
        self.outage.check()?;
        Ok(self.table.update(id, |user| {
            if let Some(role) = patch.role {
                user.role = role;
            }
            if let Some(approved) = patch.approved {
                user.approved = approved;
            }
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.outage.check()?;
        Ok(self.table.remove(id))
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, RepositoryError> {
        self.outage.check()?;
        Ok(self.table.page(page))
    }
}

#[derive(Default)]
pub struct FakePrograms {
    table: Table<Program>,
    updates: Mutex<Vec<(i64, ProgramPatch)>>,
    outage: Arc<Outage>,
}

impl FakePrograms {
    pub fn seed(&self, id: i64, name: &str) -> Program {
        self.table.insert(
            id,
            Program {
                id,
                name: name.to_string(),
                owner_id: 1,
                created_at: Utc::now(),
            },
        )
    }

    pub fn get(&self, id: i64) -> Option<Program> {
        self.table.get(id)
    }

    pub fn updates(&self) -> Vec<(i64, ProgramPatch)> {
        self.updates.lock().unwrap().clone()
    }
}

impl ProgramRepository for FakePrograms {
    async fn create(&self, program: &NewProgram) -> Result<Program, RepositoryError> {
        self.outage.check()?;
        let id = self.table.next_id();
        Ok(self.table.insert(
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
        self.outage.check()?;
        Ok(self.table.get(id))
    }

    async fn update_by_id(
        &self,
        id: i64,
        patch: &ProgramPatch,
    ) -> Result<Option<Program>, RepositoryError> {
        self.outage.check()?;
        self.updates.lock().unwrap().push((id, patch.clone()));
        Ok(self.table.update(id, |program| {
            if let Some(name) = &patch.name {
                program.name = name.clone();
            }
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        self.outage.check()?;
        Ok(self.table.remove(id))
    }

    async fn list(&self, page: Page) -> Result<Vec<Program>, RepositoryError> {
        self.outage.check()?;
        Ok(self.table.page(page))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        self.outage.check()?;
        Ok(self.table.len() as u64)
    }
}

#[derive(Default)]
pub struct FakeSubPrograms {
    table: Table<SubProgram>,
}

impl FakeSubPrograms {
    pub fn seed(&self, id: i64, program_id: i64, name: &str) -> SubProgram {
        self.table.insert(
            id,
            SubProgram {
                id,
                program_id,
                name: name.to_string(),
            },
        )
    }

    pub fn get(&self, id: i64) -> Option<SubProgram> {
        self.table.get(id)
    }

    pub fn of_program(&self, program_id: i64) -> Vec<SubProgram> {
        self.table.select(|day| day.program_id == program_id)
    }
}

impl SubProgramRepository for FakeSubPrograms {
    async fn create(&self, sub_program: &NewSubProgram) -> Result<SubProgram, RepositoryError> {
        let id = self.table.next_id();
        Ok(self.table.insert(
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
        Ok(self.of_program(program_id))
    }
}

#[derive(Default)]
pub struct FakeExercises {
    table: Table<Exercise>,
}

impl FakeExercises {
    pub fn seed(&self, id: i64, name: &str) -> Exercise {
        self.seed_in(id, 1, name)
    }

    pub fn seed_in(&self, id: i64, sub_program_id: i64, name: &str) -> Exercise {
        self.table.insert(
            id,
            Exercise {
                id,
                sub_program_id,
                name: name.to_string(),
                description: String::new(),
            },
        )
    }

    pub fn of_sub_program(&self, sub_program_id: i64) -> Vec<Exercise> {
        self.table.select(|exercise| exercise.sub_program_id == sub_program_id)
    }

    pub fn get(&self, id: i64) -> Option<Exercise> {
        self.table.get(id)
    }
}

impl ExerciseRepository for FakeExercises {
    async fn create(&self, exercise: &NewExercise) -> Result<Exercise, RepositoryError> {
        let id = self.table.next_id();
        Ok(self.table.insert(
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
        Ok(self.of_sub_program(sub_program_id))
    }
}

#[derive(Default)]
pub struct FakeRecords {
    table: Table<Record>,
}

impl FakeRecords {
    pub fn all(&self) -> Vec<Record> {
        self.table.page(Page::new(u32::MAX, 0))
    }
}

impl RecordRepository for FakeRecords {
    async fn create(&self, record: &NewRecord) -> Result<Record, RepositoryError> {
        let id = self.table.next_id();
        Ok(self.table.insert(
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
        let mut records: Vec<Record> = self
            .all()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        records.reverse();
        Ok(records
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }
}

pub struct FakeRepos {
    pub users: FakeUsers,
    pub programs: FakePrograms,
    pub sub_programs: FakeSubPrograms,
    pub exercises: FakeExercises,
    pub records: FakeRecords,
    outage: Arc<Outage>,
}

impl Default for FakeRepos {
    fn default() -> Self {
        let outage = Arc::new(Outage::default());
        Self {
            users: FakeUsers {
                table: Table::default(),
                outage: Arc::clone(&outage),
            },
            programs: FakePrograms {
                table: Table::default(),
                updates: Mutex::new(Vec::new()),
                outage: Arc::clone(&outage),
            },
            sub_programs: FakeSubPrograms::default(),
            exercises: FakeExercises::default(),
            records: FakeRecords::default(),
            outage,
        }
    }
}

impl FakeRepos {
    /// Make user and program lookups fail with a connection error.
    pub fn go_down(&self) {
        self.outage.0.store(true, Ordering::SeqCst);
    }
}

impl Repositories for FakeRepos {
    type Users = FakeUsers;
    type Programs = FakePrograms;
    type SubPrograms = FakeSubPrograms;
    type Exercises = FakeExercises;
    type Records = FakeRecords;

    fn users(&self) -> &FakeUsers {
        &self.users
    }

    fn programs(&self) -> &FakePrograms {
        &self.programs
    }

    fn sub_programs(&self) -> &FakeSubPrograms {
        &self.sub_programs
    }

    fn exercises(&self) -> &FakeExercises {
        &self.exercises
    }

    fn records(&self) -> &FakeRecords {
        &self.records
    }
}
