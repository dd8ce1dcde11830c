use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::services::query_service;
use crate::api::{QueryPayload, StreamEvent};
use crate::core::error::{ClientError, NetworkError, StreamDecodeError};
use crate::core::sse::decode;

#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage {
    Event(StreamEvent),
    DecodeError(StreamDecodeError),
    /// The POST itself failed or was answered with a non-2xx status.
    RequestFailed(NetworkError),
    /// The transport broke while reading the streamed body.
    StreamFailed(NetworkError),
    End,
}

pub struct QueryParams {
    pub client: reqwest::Client,
    pub endpoint: String,
    pub payload: QueryPayload,
    pub cancel_token: tokio_util::sync::CancellationToken,
    pub stream_id: u64,
}

#[derive(Clone)]
pub struct QueryStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl QueryStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_query(&self, params: QueryParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let cancel_token = params.cancel_token.clone();
            let stream_id = params.stream_id;
            tokio::select! {
                _ = run_query(params, &tx) => {}
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "query cancelled");
                }
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

/// Sends are best-effort: once the receiver is gone every message is dropped.
async fn run_query(params: QueryParams, tx: &mpsc::UnboundedSender<(StreamMessage, u64)>) {
    let QueryParams {
        client,
        endpoint,
        payload,
        stream_id,
        ..
    } = params;
    let send = |message: StreamMessage| tx.send((message, stream_id)).is_ok();

    let response = match query_service(&client, &endpoint, &payload).await {
        Ok(response) => response,
        Err(err) => {
            send(StreamMessage::RequestFailed(err));
            send(StreamMessage::End);
            return;
        }
    };

    if payload.stream {
        info!(service = %payload.service, stream_id, "initiating streaming");
        let events = decode(response.bytes_stream());
        futures_util::pin_mut!(events);
        while let Some(item) = events.next().await {
            let message = match item {
                Ok(event) => StreamMessage::Event(event),
                Err(ClientError::StreamDecode(err)) => StreamMessage::DecodeError(err),
                Err(ClientError::Network(err)) => StreamMessage::StreamFailed(err),
                Err(other) => {
                    StreamMessage::StreamFailed(NetworkError::transport(&endpoint, other.to_string()))
                }
            };
            if !send(message) {
                return;
            }
        }
        debug!(stream_id, "stream ended");
    } else {
        info!(service = %payload.service, "non-streaming query");
        let message = match response.json::<Value>().await {
            Ok(body) => StreamMessage::Event(StreamEvent::from_response_value(&body)),
            Err(err) => StreamMessage::RequestFailed(NetworkError::from(err)),
        };
        send(message);
    }

    send(StreamMessage::End);
}
