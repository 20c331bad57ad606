//! Training days (sub-programs) and their exercises.

use std::sync::Arc;

use coachbot_types::event::{Button, Keyboard};
use coachbot_types::program::{NewExercise, NewSubProgram, SubProgramPatch};
use tracing::info;

use super::Dialog;
use crate::middleware::HandlerResult;
use crate::params::{self, Params};
use crate::repository::{ExerciseRepository, Repositories, SubProgramRepository};
use crate::sender::Sender;
use crate::services::Services;
use crate::session::Session;

/// Reply that leaves the prescription empty.
const SKIP: &str = "-";

/// Ask for a day name and add it to the referenced program.
pub async fn create_sub_program<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(program) = session.program.as_ref() else {
        return super::missing(&services, &session, "program").await;
    };
    let chat_id = session.chat_id();
    let dialog = Dialog::open(&services, chat_id);

    let prompt = format!("Send a name for the new day of \"{}\".", program.name);
    let Some(name) = dialog.ask_name(&services, &prompt).await? else {
        return Ok(());
    };

    let day = services
        .repos
        .sub_programs()
        .create(&NewSubProgram {
            program_id: program.id,
            name,
        })
        .await?;
    info!(program_id = program.id, sub_program_id = day.id, "added day");

    let keyboard = Keyboard::new().button(
        "Open",
        params::encode("sub_view", &Params::sub_program(day.id)),
    );
    services
        .say_with_keyboard(
            chat_id,
            &format!("Day \"{}\" added to \"{}\".", day.name, program.name),
            &keyboard,
        )
        .await?;
    Ok(())
}

/// A day with its exercises and authoring actions.
pub async fn show_sub_program<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(day) = session.sub_program.as_ref() else {
        return super::missing(&services, &session, "sub-program").await;
    };
    let exercises = services.repos.exercises().list_by_sub_program(day.id).await?;
    let reference = Params::sub_program(day.id);

    let mut lines = vec![format!("Day \"{}\"", day.name)];
    let mut keyboard = Keyboard::new();
    for exercise in &exercises {
        lines.push(if exercise.description.is_empty() {
            format!("- {}", exercise.name)
        } else {
            format!("- {}: {}", exercise.name, exercise.description)
        });
        keyboard = keyboard.button(
            exercise.name.clone(),
            params::encode("exr_rename", &Params::exercise(exercise.id)),
        );
    }
    if exercises.is_empty() {
        lines.push("No exercises yet.".to_string());
    }
    keyboard = keyboard
        .row(vec![
            Button::new("Add exercise", params::encode("exr_create", &reference)),
            Button::new("Rename", params::encode("sub_rename", &reference)),
            Button::new("Delete day", params::encode("sub_delete", &reference)),
        ])
        .button(
            "<< Program",
            params::encode("prg_view", &Params::program(day.program_id)),
        );

    services
        .say_with_keyboard(session.chat_id(), &lines.join("\n"), &keyboard)
        .await?;
    Ok(())
}

pub async fn rename_sub_program<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(day) = session.sub_program.as_ref() else {
        return super::missing(&services, &session, "sub-program").await;
    };
    let chat_id = session.chat_id();
    let dialog = Dialog::open(&services, chat_id);

    let prompt = format!("Send a new name for \"{}\".", day.name);
    let Some(name) = dialog.ask_name(&services, &prompt).await? else {
        return Ok(());
    };

    let patch = SubProgramPatch { name: Some(name) };
    let text = match services.repos.sub_programs().update_by_id(day.id, &patch).await? {
        Some(updated) => format!("Day renamed to \"{}\".", updated.name),
        None => services.messages().not_found("Sub-program", day.id),
    };
    services.say(chat_id, &text).await?;
    Ok(())
}

pub async fn delete_sub_program<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(day) = session.sub_program.as_ref() else {
        return super::missing(&services, &session, "sub-program").await;
    };
    let chat_id = session.chat_id();

    if !services.repos.sub_programs().delete_by_id(day.id).await? {
        services
            .say(chat_id, &services.messages().not_found("Sub-program", day.id))
            .await?;
        return Ok(());
    }
    info!(sub_program_id = day.id, "deleted day");

    let keyboard = Keyboard::new().button(
        "<< Program",
        params::encode("prg_view", &Params::program(day.program_id)),
    );
    services
        .say_with_keyboard(chat_id, &format!("Day \"{}\" deleted.", day.name), &keyboard)
        .await?;
    Ok(())
}

/// Ask for an exercise name and prescription, then add it to the day.
pub async fn create_exercise<R: Repositories, S: Sender>(
    services: Arc<Services<R, S>>,
    session: Session,
) -> HandlerResult {
    let Some(day) = session.sub_program.as_ref() else {
        return super::missing(&services, &session, "sub-program").await;
    };
    let chat_id = session.chat_id();
    let dialog = Dialog::open(&services, chat_id);

    let prompt = format!("Send a name for the new exercise of \"{}\".", day.name);
    let Some(name) = dialog.ask_name(&services, &prompt).await? else {
        return Ok(());
    };
    let prompt = format!("Send the prescription for \"{name}\", e.g. 5x5 @ 80%, or {SKIP} to skip.");
    let Some(description) = dialog.ask(&services, &prompt).await? else {
        return Ok(());
    };
    let description = match description.trim() {
        SKIP => String::new(),
        text => text.to_string(),
    };

    let exercise = services
        .repos
        .exercises()
        .create(&NewExercise {
            sub_program_id: day.id,
            name,
            description,
        })
        .await?;
    info!(sub_program_id = day.id, exercise_id = exercise.id, "added exercise");

    let keyboard = Keyboard::new().button(
        "<< Day",
        params::encode("sub_view", &Params::sub_program(day.id)),
    );
    services
        .say_with_keyboard(
            chat_id,
            &format!("Exercise \"{}\" added to \"{}\".", exercise.name, day.name),
            &keyboard,
        )
        .await?;
    Ok(())
}
