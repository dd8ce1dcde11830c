use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "services",
        usage: "/services",
        help: "List the services offered by the backend.",
        handler: super::handle_services,
    },
    Command {
        name: "service",
        usage: "/service NAME",
        help: "Select a service and build its parameter form.",
        handler: super::handle_service,
    },
    Command {
        name: "form",
        usage: "/form",
        help: "Show the parameters of the selected service.",
        handler: super::handle_form,
    },
    Command {
        name: "set",
        usage: "/set NAME VALUE",
        help: "Change one parameter of the current form.",
        handler: super::handle_set,
    },
    Command {
        name: "reset",
        usage: "/reset",
        help: "Restore every parameter to its initial value.",
        handler: super::handle_reset,
    },
    Command {
        name: "log",
        usage: "/log [FILE]",
        help: "Toggle transcript logging or set the log file path.",
        handler: super::handle_log,
    },
    Command {
        name: "cancel",
        usage: "/cancel",
        help: "Stop every query still in flight.",
        handler: super::handle_cancel,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the shell.",
        handler: super::handle_quit,
    },
];
