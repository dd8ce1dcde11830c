use std::io::{self, Write};

use tokio::sync::mpsc;
use tracing::debug;

use crate::core::app::{
    apply_actions, stream_message_action, App, AppAction, AppActionDispatcher, AppCommand,
};
use crate::core::query_stream::{QueryStreamService, StreamMessage};
use crate::ui::printer::TranscriptPrinter;

/// Owns the app state and both inbound queues: actions from the front-end
/// and messages from query tasks. All state changes happen here, one action
/// at a time.
pub struct EventLoop {
    pub app: App,
    dispatcher: AppActionDispatcher,
    action_rx: mpsc::UnboundedReceiver<AppAction>,
    stream_service: QueryStreamService,
    stream_rx: mpsc::UnboundedReceiver<(StreamMessage, u64)>,
    printer: TranscriptPrinter,
}

impl EventLoop {
    pub fn new(app: App) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (stream_service, stream_rx) = QueryStreamService::new();
        Self {
            app,
            dispatcher: AppActionDispatcher::new(action_tx),
            action_rx,
            stream_service,
            stream_rx,
            printer: TranscriptPrinter::new(),
        }
    }

    pub fn dispatcher(&self) -> AppActionDispatcher {
        self.dispatcher.clone()
    }

    /// Apply everything already queued. Returns whether anything was applied.
    pub fn tick(&mut self) -> bool {
        let received_any = process_stream_updates(&self.dispatcher, &mut self.stream_rx);
        let actions_applied =
            drain_action_queue(&mut self.app, &self.stream_service, &mut self.action_rx);
        received_any || actions_applied
    }

    /// Wait for the next action or stream message and apply it.
    pub async fn next_update(&mut self) {
        let action = tokio::select! {
            Some(action) = self.action_rx.recv() => action,
            Some((message, stream_id)) = self.stream_rx.recv() => {
                stream_message_action(message, stream_id)
            }
            else => return,
        };
        let commands = apply_actions(&mut self.app, [action]);
        execute_commands(&self.stream_service, commands);
    }

    /// Print new and changed entries and any pending notice.
    pub fn flush_output<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        for line in self.printer.pending_lines(&self.app.history) {
            writeln!(out, "{line}")?;
        }
        if let Some(notice) = self.app.take_notice() {
            writeln!(out, "{notice}")?;
        }
        out.flush()
    }

    /// Keep processing until no query is in flight and no action is queued.
    pub async fn run_until_idle<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        loop {
            self.tick();
            self.flush_output(out)?;
            if !self.app.has_live_streams() {
                return Ok(());
            }
            self.next_update().await;
        }
    }

    pub fn shutdown(&mut self) {
        let commands = apply_actions(&mut self.app, [AppAction::CancelStreams]);
        execute_commands(&self.stream_service, commands);
    }
}

fn process_stream_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(StreamMessage, u64)>,
) -> bool {
    let mut actions = Vec::new();
    while let Ok((message, stream_id)) = rx.try_recv() {
        actions.push(stream_message_action(message, stream_id));
    }
    if actions.is_empty() {
        return false;
    }
    dispatcher.dispatch_many(actions);
    true
}

fn drain_action_queue(
    app: &mut App,
    stream_service: &QueryStreamService,
    action_rx: &mut mpsc::UnboundedReceiver<AppAction>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(action) = action_rx.try_recv() {
        pending.push(action);
    }
    if pending.is_empty() {
        return false;
    }
    let commands = apply_actions(app, pending);
    execute_commands(stream_service, commands);
    true
}

fn execute_commands(stream_service: &QueryStreamService, commands: Vec<AppCommand>) {
    for cmd in commands {
        match cmd {
            AppCommand::SpawnQuery(params) => {
                debug!(stream_id = params.stream_id, "spawning query");
                stream_service.spawn_query(params);
            }
        }
    }
}
