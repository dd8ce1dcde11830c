mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::app::{App, AppAction};
use crate::core::form::ControlValue;
use crate::ui::printer::{format_form, format_services};

pub enum CommandResult {
    Continue,
    Dispatch(AppAction),
    ProcessAsQuery(String),
    Quit,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsQuery(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsQuery(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(app, invocation)
    } else {
        CommandResult::ProcessAsQuery(input.to_string())
    }
}

fn usage_notice(app: &mut App, usage: &str) -> CommandResult {
    app.set_notice(format!("Usage: {usage}"));
    CommandResult::Continue
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut lines = vec!["Commands:".to_string()];
    for command in all_commands() {
        lines.push(format!("  {:<18} {}", command.usage, command.help));
    }
    lines.push("Any other input is sent as a query to the selected service.".to_string());
    app.set_notice(lines.join("\n"));
    CommandResult::Continue
}

pub(super) fn handle_services(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let lines = format_services(&app.session.services, app.selected_service());
    app.set_notice(lines.join("\n"));
    CommandResult::Continue
}

pub(super) fn handle_service(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return usage_notice(app, "/service NAME");
    }
    CommandResult::Dispatch(AppAction::SelectService {
        service: invocation.args.to_string(),
    })
}

pub(super) fn handle_form(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let lines = format_form(app.selected_service(), &app.form);
    app.set_notice(lines.join("\n"));
    CommandResult::Continue
}

pub(super) fn handle_set(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some((name, value)) = invocation.args.split_once(' ') else {
        return usage_notice(app, "/set NAME VALUE");
    };
    CommandResult::Dispatch(AppAction::SetParameter {
        name: name.to_string(),
        value: ControlValue::Text(value.trim_start().to_string()),
    })
}

pub(super) fn handle_reset(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Dispatch(AppAction::ResetForm)
}

pub(super) fn handle_log(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let result = if invocation.args.is_empty() {
        app.session.logging.toggle_logging()
    } else {
        app.session.logging.set_log_file(invocation.args.to_string())
    };
    match result {
        Ok(message) => app.set_notice(message),
        Err(e) => app.set_notice(format!("Log error: {}", e)),
    }
    CommandResult::Continue
}

pub(super) fn handle_cancel(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Dispatch(AppAction::CancelStreams)
}

pub(super) fn handle_quit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}

#[cfg(test)]
mod tests;
