mod catalog;
mod streaming;

use tokio::sync::mpsc;

use super::App;
use crate::api::StreamEvent;
use crate::core::config::Config;
use crate::core::error::{ClientError, NetworkError, StreamDecodeError};
use crate::core::form::ControlValue;
use crate::core::query_stream::{QueryParams, StreamMessage};

#[derive(Debug)]
pub enum AppAction {
    ConfigLoaded {
        config: Config,
    },
    ConfigLoadFailed {
        error: ClientError,
    },
    ServicesLoaded {
        services: Vec<String>,
    },
    ServicesLoadFailed {
        error: ClientError,
    },
    SelectService {
        service: String,
    },
    SetParameter {
        name: String,
        value: ControlValue,
    },
    ResetForm,
    Submit {
        query: String,
    },
    StreamEvent {
        event: StreamEvent,
        stream_id: u64,
    },
    StreamDecodeFailed {
        error: StreamDecodeError,
        stream_id: u64,
    },
    RequestFailed {
        error: NetworkError,
        stream_id: u64,
    },
    StreamFailed {
        error: NetworkError,
        stream_id: u64,
    },
    StreamCompleted {
        stream_id: u64,
    },
    CancelStreams,
    SetNotice {
        message: String,
    },
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppAction>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppAction>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction) {
        let _ = self.tx.send(action);
    }

    pub fn dispatch_many<I>(&self, actions: I)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            self.dispatch(action);
        }
    }
}

pub enum AppCommand {
    SpawnQuery(QueryParams),
}

pub fn stream_message_action(message: StreamMessage, stream_id: u64) -> AppAction {
    match message {
        StreamMessage::Event(event) => AppAction::StreamEvent { event, stream_id },
        StreamMessage::DecodeError(error) => AppAction::StreamDecodeFailed { error, stream_id },
        StreamMessage::RequestFailed(error) => AppAction::RequestFailed { error, stream_id },
        StreamMessage::StreamFailed(error) => AppAction::StreamFailed { error, stream_id },
        StreamMessage::End => AppAction::StreamCompleted { stream_id },
    }
}

pub fn apply_actions(app: &mut App, actions: impl IntoIterator<Item = AppAction>) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for action in actions {
        if let Some(cmd) = apply_action(app, action) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Submit { .. }
        | AppAction::StreamEvent { .. }
        | AppAction::StreamDecodeFailed { .. }
        | AppAction::RequestFailed { .. }
        | AppAction::StreamFailed { .. }
        | AppAction::StreamCompleted { .. }
        | AppAction::CancelStreams => streaming::handle_streaming_action(app, action),

        AppAction::ConfigLoaded { .. }
        | AppAction::ConfigLoadFailed { .. }
        | AppAction::ServicesLoaded { .. }
        | AppAction::ServicesLoadFailed { .. }
        | AppAction::SelectService { .. }
        | AppAction::SetParameter { .. }
        | AppAction::ResetForm => catalog::handle_catalog_action(app, action),

        AppAction::SetNotice { message } => {
            app.set_notice(message);
            None
        }
    }
}
