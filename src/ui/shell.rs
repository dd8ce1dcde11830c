use std::error::Error;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{process_input, CommandResult};
use crate::core::app::AppAction;
use crate::ui::event_loop::EventLoop;

enum ShellEvent {
    Line(Option<String>),
    Update,
}

/// Interactive line-based front-end. Queries keep streaming while the next
/// line is typed.
pub async fn run_shell(mut event_loop: EventLoop) -> Result<(), Box<dyn Error>> {
    let mut stdout = std::io::stdout();
    let dispatcher = event_loop.dispatcher();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type a query to send it to the selected service, or /help for commands.");
    event_loop.tick();
    event_loop.flush_output(&mut stdout)?;

    loop {
        let event = tokio::select! {
            line = lines.next_line() => ShellEvent::Line(line?),
            _ = event_loop.next_update() => ShellEvent::Update,
        };

        match event {
            ShellEvent::Line(None) => {
                // Input closed: let running queries finish before leaving.
                event_loop.run_until_idle(&mut stdout).await?;
                break;
            }
            ShellEvent::Line(Some(line)) if line.trim().is_empty() => {}
            ShellEvent::Line(Some(line)) => match process_input(&mut event_loop.app, &line) {
                CommandResult::Continue => {}
                CommandResult::Dispatch(action) => dispatcher.dispatch(action),
                CommandResult::ProcessAsQuery(query) => {
                    dispatcher.dispatch(AppAction::Submit { query })
                }
                CommandResult::Quit => break,
            },
            ShellEvent::Update => {}
        }

        event_loop.tick();
        event_loop.flush_output(&mut stdout)?;
    }

    event_loop.shutdown();
    event_loop.flush_output(&mut stdout)?;
    Ok(())
}
