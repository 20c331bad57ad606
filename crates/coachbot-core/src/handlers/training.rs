//! Program browsing for clients. Every exercise links to result logging.

use std::sync::Arc;

use coachbot_types::event::Keyboard;

use crate::middleware::HandlerResult;
use crate::params::{self, Params};
use crate::repository::{ExerciseRepository, ProgramRepository, Repositories, SubProgramRepository};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// One page of programs a client can train with.
pub async fn list_training<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let page = super::window(&services, &session);
    let programs = services.repos.programs().list(page).await?;
    let total = services.repos.programs().count().await?;

    let mut keyboard = Keyboard::new();
    for program in &programs {
        keyboard = keyboard.button(
            program.name.clone(),
            params::encode("my_program", &Params::program(program.id)),
        );
    }
    keyboard = keyboard
        .row(super::navigation("my_programs", page, total))
        .button("Main menu", "menu_main");

    let text = if programs.is_empty() {
        "No programs available yet."
    } else {
        "Pick a program"
    };
    services
        .say_with_keyboard(session.chat_id(), text, &keyboard)
        .await?;
    Ok(())
}

/// Days and exercises of a program, one logging button per exercise.
pub async fn show_training<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(program) = session.program.as_ref() else {
        return super::missing(&services, &session, "program").await;
    };
    let days = services.repos.sub_programs().list_by_program(program.id).await?;

    let mut lines = vec![program.name.clone()];
    let mut keyboard = Keyboard::new();
    for day in &days {
        lines.push(format!("{}:", day.name));
        for exercise in services.repos.exercises().list_by_sub_program(day.id).await? {
            lines.push(if exercise.description.is_empty() {
                format!("- {}", exercise.name)
            } else {
                format!("- {} ({})", exercise.name, exercise.description)
            });
            keyboard = keyboard.button(
                format!("{}: {}", day.name, exercise.name),
                params::encode("rec_add", &Params::exercise(exercise.id)),
            );
        }
    }
    if keyboard.is_empty() {
        lines.push("Nothing to log here yet.".to_string());
    }
    keyboard = keyboard
        .button("<< Programs", "my_programs")
        .button("My records", "my_records");

    services
        .say_with_keyboard(session.chat_id(), &lines.join("\n"), &keyboard)
        .await?;
    Ok(())
}
