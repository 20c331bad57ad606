//! Program and exercise administration.

use std::sync::Arc;

use coachbot_types::event::{Button, Keyboard};
use coachbot_types::program::{ExercisePatch, NewProgram, ProgramPatch};
use tracing::info;

use super::Dialog;
use crate::middleware::HandlerResult;
use crate::params::{self, Params};
use crate::repository::{ExerciseRepository, ProgramRepository, Repositories, SubProgramRepository};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// One page of programs with open/delete buttons and page navigation.
pub async fn list_programs<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let page = super::window(&services, &session);
    let programs = services.repos.programs().list(page).await?;
    let total = services.repos.programs().count().await?;

    let mut keyboard = Keyboard::new();
    for program in &programs {
        keyboard = keyboard.row(vec![
            Button::new(
                program.name.clone(),
                params::encode("prg_view", &Params::program(program.id)),
            ),
            Button::new(
                "Delete",
                params::encode("prg_delete", &Params::program(program.id)),
            ),
        ]);
    }
    keyboard = keyboard
        .button("New program", "prg_create")
        .row(super::navigation("prg_list", page, total))
        .button("Main menu", "menu_main");

    let text = if programs.is_empty() {
        "No programs yet.".to_string()
    } else {
        let first = page.offset + 1;
        let last = page.offset as usize + programs.len();
        format!("Programs {first}-{last} of {total}")
    };
    services
        .say_with_keyboard(session.chat_id(), &text, &keyboard)
        .await?;
    Ok(())
}

/// Ask for a name and create a program owned by the sender.
pub async fn create_program<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let chat_id = session.chat_id();
    let dialog = Dialog::open(&services, chat_id);
    let Some(name) = dialog
        .ask_name(&services, "Send a name for the new program.")
        .await?
    else {
        return Ok(());
    };

    let program = services
        .repos
        .programs()
        .create(&NewProgram {
            name,
            owner_id: session.user_id(),
        })
        .await?;
    info!(program_id = program.id, "created program");

    let keyboard = Keyboard::new().button(
        "Open",
        params::encode("prg_view", &Params::program(program.id)),
    );
    services
        .say_with_keyboard(
            chat_id,
            &format!("Program \"{}\" created.", program.name),
            &keyboard,
        )
        .await?;
    Ok(())
}

/// A program with its days and the actions available on it.
pub async fn show_program<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(program) = session.program.as_ref() else {
        return super::missing(&services, &session, "program").await;
    };
    let days = services.repos.sub_programs().list_by_program(program.id).await?;
    let reference = Params::program(program.id);

    let mut keyboard = Keyboard::new();
    for day in &days {
        keyboard = keyboard.button(
            day.name.clone(),
            params::encode("sub_view", &Params::sub_program(day.id)),
        );
    }
    keyboard = keyboard
        .button("Add day", params::encode("sub_create", &reference))
        .row(vec![
            Button::new("Rename", params::encode("prg_rename", &reference)),
            Button::new("Delete", params::encode("prg_delete", &reference)),
        ])
        .button("<< Programs", "prg_list");

    let text = if days.is_empty() {
        format!("Program \"{}\" has no days yet.", program.name)
    } else {
        format!("Program \"{}\": {} day(s)", program.name, days.len())
    };
    services
        .say_with_keyboard(session.chat_id(), &text, &keyboard)
        .await?;
    Ok(())
}

/// Ask for a new program name and store it.
///
/// Empty replies are re-prompted. A closed conversation ends the handler
/// without touching the program.
pub async fn rename_program<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(program) = session.program.as_ref() else {
        return super::missing(&services, &session, "program").await;
    };
    let chat_id = session.chat_id();
    let dialog = Dialog::open(&services, chat_id);

    let prompt = format!("Send a new name for \"{}\".", program.name);
    let Some(name) = dialog.ask_name(&services, &prompt).await? else {
        return Ok(());
    };

    let patch = ProgramPatch { name: Some(name) };
    match services.repos.programs().update_by_id(program.id, &patch).await? {
        Some(updated) => {
            info!(program_id = updated.id, "renamed program");
            services
                .say(chat_id, &format!("Program renamed to \"{}\".", updated.name))
                .await?;
        }
        None => {
            services
                .say(chat_id, &services.messages().not_found("Program", program.id))
                .await?;
        }
    }
    Ok(())
}

pub async fn delete_program<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(program) = session.program.as_ref() else {
        return super::missing(&services, &session, "program").await;
    };
    let chat_id = session.chat_id();

    if services.repos.programs().delete_by_id(program.id).await? {
        info!(program_id = program.id, "deleted program");
        services
            .say(chat_id, &format!("Program \"{}\" deleted.", program.name))
            .await?;
    } else {
        services
            .say(chat_id, &services.messages().not_found("Program", program.id))
            .await?;
    }
    Ok(())
}

/// Same dialog as [`rename_program`], for an exercise.
pub async fn rename_exercise<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(exercise) = session.exercise.as_ref() else {
        return super::missing(&services, &session, "exercise").await;
    };
    let chat_id = session.chat_id();
    let dialog = Dialog::open(&services, chat_id);

    let prompt = format!("Send a new name for \"{}\".", exercise.name);
    let Some(name) = dialog.ask_name(&services, &prompt).await? else {
        return Ok(());
    };

    let patch = ExercisePatch {
        name: Some(name),
        description: None,
    };
    match services.repos.exercises().update_by_id(exercise.id, &patch).await? {
        Some(updated) => {
            services
                .say(chat_id, &format!("Exercise renamed to \"{}\".", updated.name))
                .await?;
        }
        None => {
            services
                .say(chat_id, &services.messages().not_found("Exercise", exercise.id))
                .await?;
        }
    }
    Ok(())
}
