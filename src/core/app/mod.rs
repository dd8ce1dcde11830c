use std::collections::HashMap;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::api::QueryPayload;
use crate::core::error::ClientError;
use crate::core::form::ControlSet;
use crate::core::history::{EntryId, EntryKind, HistoryLog};
use crate::core::query_stream::QueryParams;
use crate::utils::url::query_endpoint;

pub mod actions;
pub mod session;


pub use actions::{
    apply_action, apply_actions, stream_message_action, AppAction, AppActionDispatcher,
    AppCommand,
};
pub use session::{load_catalog, SessionContext};

/// Per-query state. Each submission owns its own live entry slot, so
/// overlapping queries never write into each other's response.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStream {
    pub service: String,
    pub entry: Option<EntryId>,
    /// Set once the server reported an error; later frames are ignored.
    pub terminated: bool,
}

pub struct App {
    pub session: SessionContext,
    pub form: ControlSet,
    pub history: HistoryLog,
    pub streams: HashMap<u64, LiveStream>,
    notice: Option<String>,
}

impl App {
    pub fn new(session: SessionContext, history_limit: usize) -> Self {
        Self {
            session,
            form: ControlSet::empty(),
            history: HistoryLog::with_limit(history_limit),
            streams: HashMap::new(),
            notice: None,
        }
    }

    pub fn selected_service(&self) -> Option<&str> {
        self.session.selected_service.as_deref()
    }

    pub fn has_live_streams(&self) -> bool {
        !self.streams.is_empty()
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn push_message(&mut self, kind: EntryKind, message: impl Into<String>) -> EntryId {
        let id = self.history.append_message(kind, message);
        self.log_entry(id);
        id
    }

    pub fn push_error(&mut self, error: &ClientError) -> EntryId {
        self.push_message(EntryKind::Error, error.history_message())
    }

    /// Append a finished entry to the transcript, if one is being written.
    pub fn log_entry(&self, id: EntryId) {
        let Some(entry) = self.history.get(id) else {
            return;
        };
        if let Err(err) = self.session.logging.log_entry(entry) {
            warn!(entry = %id, error = %err, "failed to write transcript");
        }
    }

    pub fn build_query_params(
        &self,
        payload: QueryPayload,
        cancel_token: CancellationToken,
        stream_id: u64,
    ) -> QueryParams {
        QueryParams {
            client: self.session.client.clone(),
            endpoint: query_endpoint(&self.session.base_url),
            payload,
            cancel_token,
            stream_id,
        }
    }
}
