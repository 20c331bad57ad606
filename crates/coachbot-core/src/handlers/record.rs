//! Result logging by clients.

use std::sync::Arc;

use coachbot_types::event::Keyboard;
use coachbot_types::program::NewRecord;
use tracing::info;

use super::Dialog;
use crate::middleware::HandlerResult;
use crate::repository::{ExerciseRepository, RecordRepository, Repositories};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// Parse a result typed by a human. Accepts a decimal comma.
fn parse_value(input: &str) -> Option<f64> {
    input
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Ask for a numeric result for the referenced exercise and store it.
pub async fn add_record<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(exercise) = session.exercise.as_ref() else {
        return super::missing(&services, &session, "exercise").await;
    };
    let chat_id = session.chat_id();
    let dialog = Dialog::open(&services, chat_id);

    let mut prompt = format!("Send your result for \"{}\".", exercise.name);
    let value = loop {
        let Some(answer) = dialog.ask(&services, &prompt).await? else {
            return Ok(());
        };
        if let Some(value) = parse_value(&answer) {
            break value;
        }
        prompt = format!("\"{}\" is not a number. Send a number, e.g. 82.5.", answer.trim());
    };

    let record = services
        .repos
        .records()
        .create(&NewRecord {
            user_id: session.user_id(),
            exercise_id: exercise.id,
            value,
        })
        .await?;
    info!(record_id = record.id, exercise_id = exercise.id, "logged record");

    services
        .say(chat_id, &format!("Saved {} for \"{}\".", record.value, exercise.name))
        .await?;
    Ok(())
}

/// The sender's latest records, newest first.
pub async fn my_records<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let page = super::window(&services, &session);
    let records = services
        .repos
        .records()
        .list_by_user(session.user_id(), page)
        .await?;

    let mut lines = Vec::with_capacity(records.len());
    for record in &records {
        let exercise = services.repos.exercises().get_by_id(record.exercise_id).await?;
        let name = exercise.map_or_else(|| format!("#{}", record.exercise_id), |e| e.name);
        lines.push(format!(
            "{} {name}: {}",
            record.created_at.format("%Y-%m-%d"),
            record.value
        ));
    }

    let text = if lines.is_empty() {
        "No records yet.".to_string()
    } else {
        lines.join("\n")
    };
    let keyboard = Keyboard::new()
        .button("Log a result", "my_programs")
        .button("Main menu", "menu_main");
    services
        .say_with_keyboard(session.chat_id(), &text, &keyboard)
        .await?;
    Ok(())
}
