use tracing::debug;

use super::{App, AppAction, AppCommand};
use crate::api::EventOutcome;
use crate::core::app::LiveStream;
use crate::core::compose::compose;
use crate::core::error::ClientError;
use crate::core::history::EntryKind;
use crate::core::render::{on_event, RenderOutcome};

pub(super) fn handle_streaming_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::Submit { query } => submit_query(app, query),
        AppAction::StreamEvent { event, stream_id } => {
            let Some(live) = app.streams.get_mut(&stream_id) else {
                return None;
            };
            if live.terminated {
                return None;
            }
            match event.outcome() {
                EventOutcome::Result(..) => {
                    match on_event(&mut app.history, &event, &mut live.entry) {
                        RenderOutcome::Skipped => debug!(stream_id, "result not rendered"),
                        // Mid-stream audio clips are final as soon as they arrive.
                        RenderOutcome::Created(id)
                            if app.history.get(id).is_some_and(|entry| entry.is_sealed()) =>
                        {
                            app.log_entry(id)
                        }
                        _ => {}
                    }
                }
                EventOutcome::Error(message) => {
                    live.terminated = true;
                    let error = ClientError::StreamTerminatedByServer(message.to_string());
                    app.push_error(&error);
                }
                EventOutcome::Empty => debug!(stream_id, "ignoring empty event"),
            }
            None
        }
        AppAction::StreamDecodeFailed { error, stream_id } => {
            if is_active(app, stream_id) {
                app.push_error(&ClientError::StreamDecode(error));
            }
            None
        }
        AppAction::RequestFailed { error, stream_id } => {
            if is_active(app, stream_id) {
                terminate(app, stream_id);
                app.push_error(&ClientError::Network(error));
            }
            None
        }
        AppAction::StreamFailed { error, stream_id } => {
            if is_active(app, stream_id) {
                terminate(app, stream_id);
                app.push_message(
                    EntryKind::Error,
                    format!("Error: Streaming failed - {error}"),
                );
            }
            None
        }
        AppAction::StreamCompleted { stream_id } => {
            finalize_stream(app, stream_id);
            None
        }
        AppAction::CancelStreams => {
            app.session.cancel_all_streams();
            let ids: Vec<u64> = app.streams.keys().copied().collect();
            for stream_id in ids {
                finalize_stream(app, stream_id);
            }
            None
        }
        _ => unreachable!("non-streaming action routed to streaming handler"),
    }
}

fn is_active(app: &App, stream_id: u64) -> bool {
    app.streams
        .get(&stream_id)
        .is_some_and(|live| !live.terminated)
}

fn terminate(app: &mut App, stream_id: u64) {
    if let Some(live) = app.streams.get_mut(&stream_id) {
        live.terminated = true;
    }
}

/// Validate and record a submission, then hand the request off to a task.
fn submit_query(app: &mut App, query: String) -> Option<AppCommand> {
    let service = app.selected_service().unwrap_or_default().to_string();
    let streamable = app.session.config.is_streamable(&service);
    let payload = match compose(&service, &query, app.form.read_values(), streamable) {
        Ok(payload) => payload,
        Err(err) => {
            app.set_notice(err.to_string());
            return None;
        }
    };

    app.push_message(
        EntryKind::Request,
        format!("Request: {} - {}", service, payload.text()),
    );

    let (cancel_token, stream_id) = app.session.start_new_stream();
    app.streams.insert(
        stream_id,
        LiveStream {
            service: service.clone(),
            entry: None,
            terminated: false,
        },
    );

    // The payload already holds the submitted values.
    if app.session.config.clear_form_after_query(&service) {
        app.form.reset();
    }

    debug!(stream_id, service = %service, streamable, "query submitted");
    Some(AppCommand::SpawnQuery(app.build_query_params(
        payload,
        cancel_token,
        stream_id,
    )))
}

fn finalize_stream(app: &mut App, stream_id: u64) {
    let Some(live) = app.streams.remove(&stream_id) else {
        return;
    };
    if let Some(entry) = live.entry {
        if app.history.seal(entry).is_some() {
            app.log_entry(entry);
        }
    }
}
