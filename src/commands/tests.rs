use super::*;
use crate::core::app::SessionContext;
use crate::utils::logging::LoggingState;
use tempfile::TempDir;

fn new_app() -> App {
    let session = SessionContext::new(
        reqwest::Client::new(),
        "http://localhost:8000",
        LoggingState::new(None).unwrap(),
    );
    App::new(session, 50)
}

#[test]
fn plain_text_is_a_query() {
    let mut app = new_app();
    match process_input(&mut app, "summarize this") {
        CommandResult::ProcessAsQuery(text) => assert_eq!(text, "summarize this"),
        _ => panic!("expected query"),
    }
    match process_input(&mut app, "/unknown thing") {
        CommandResult::ProcessAsQuery(text) => assert_eq!(text, "/unknown thing"),
        _ => panic!("unknown commands are sent as queries"),
    }
}

#[test]
fn service_and_set_become_actions() {
    let mut app = new_app();
    match process_input(&mut app, "/service text-generator") {
        CommandResult::Dispatch(AppAction::SelectService { service }) => {
            assert_eq!(service, "text-generator")
        }
        _ => panic!("expected service selection"),
    }
    match process_input(&mut app, "/set prompt  two words") {
        CommandResult::Dispatch(AppAction::SetParameter { name, value }) => {
            assert_eq!(name, "prompt");
            assert_eq!(value, ControlValue::from("two words"));
        }
        _ => panic!("expected parameter change"),
    }
}

#[test]
fn missing_arguments_show_usage() {
    let mut app = new_app();
    assert!(matches!(
        process_input(&mut app, "/set temperature"),
        CommandResult::Continue
    ));
    assert_eq!(app.take_notice().as_deref(), Some("Usage: /set NAME VALUE"));

    assert!(matches!(
        process_input(&mut app, "/service"),
        CommandResult::Continue
    ));
    assert_eq!(app.take_notice().as_deref(), Some("Usage: /service NAME"));
}

#[test]
fn log_command_sets_and_toggles_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("session.log");
    let mut app = new_app();

    process_input(&mut app, "/log");
    assert!(app.take_notice().unwrap().starts_with("Log error: "));

    process_input(&mut app, &format!("/log {}", path.display()));
    assert!(app.take_notice().unwrap().starts_with("Logging enabled to: "));
    assert!(app.session.logging.is_active());

    process_input(&mut app, "/LOG");
    assert!(app.take_notice().unwrap().starts_with("Logging paused"));
}

#[test]
fn listing_commands_use_notices() {
    let mut app = new_app();
    app.session.services = vec!["echo".into()];
    process_input(&mut app, "/services");
    let listing = app.take_notice().unwrap();
    assert!(listing.starts_with("  echo "));
    assert!(listing.ends_with(" ECHO"));

    process_input(&mut app, "/form");
    assert_eq!(
        app.take_notice().as_deref(),
        Some("No service selected. Use /service NAME.")
    );

    process_input(&mut app, "/help");
    let help = app.take_notice().unwrap();
    assert!(help.contains("/set NAME VALUE"));
    assert!(help.lines().count() > all_commands().len());
}

#[test]
fn quit_cancel_and_reset() {
    let mut app = new_app();
    assert!(matches!(process_input(&mut app, "/quit"), CommandResult::Quit));
    assert!(matches!(
        process_input(&mut app, "/cancel"),
        CommandResult::Dispatch(AppAction::CancelStreams)
    ));
    assert!(matches!(
        process_input(&mut app, "/reset"),
        CommandResult::Dispatch(AppAction::ResetForm)
    ));
}
