use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::api::services::ConfigClient;
use crate::core::app::AppAction;
use crate::core::config::Config;
use crate::utils::logging::LoggingState;
use crate::utils::url::normalize_base_url;

pub struct SessionContext {
    pub client: Client,
    pub base_url: String,
    /// Last successfully loaded backend configuration.
    pub config: Config,
    pub services: Vec<String>,
    pub selected_service: Option<String>,
    pub logging: LoggingState,
    /// Parent of every in-flight query token.
    pub stream_cancel_token: CancellationToken,
    pub current_stream_id: u64,
}

impl SessionContext {
    pub fn new(client: Client, base_url: &str, logging: LoggingState) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
            config: Config::default(),
            services: Vec::new(),
            selected_service: None,
            logging,
            stream_cancel_token: CancellationToken::new(),
            current_stream_id: 0,
        }
    }

    /// Allocate an id and token for a new query. Earlier queries keep running.
    pub fn start_new_stream(&mut self) -> (CancellationToken, u64) {
        self.current_stream_id += 1;
        (
            self.stream_cancel_token.child_token(),
            self.current_stream_id,
        )
    }

    pub fn cancel_all_streams(&mut self) {
        self.stream_cancel_token.cancel();
        self.stream_cancel_token = CancellationToken::new();
    }

    pub fn replace_config(&mut self, config: Config) {
        self.base_url = normalize_base_url(&config.server_url());
        self.config = config;
    }
}

/// Startup sequence: fetch the config, then ask whichever server the config
/// names for its services. The catalog is requested even when the config
/// could not be loaded.
pub async fn load_catalog(config_client: &ConfigClient) -> Vec<AppAction> {
    let mut actions = Vec::with_capacity(2);

    let relocated = match config_client.fetch_config().await {
        Ok(config) => {
            let client = config_client.with_base_url(&config.server_url());
            actions.push(AppAction::ConfigLoaded { config });
            Some(client)
        }
        Err(error) => {
            actions.push(AppAction::ConfigLoadFailed { error });
            None
        }
    };

    let services_client = relocated.as_ref().unwrap_or(config_client);
    match services_client.fetch_services().await {
        Ok(services) => actions.push(AppAction::ServicesLoaded { services }),
        Err(error) => actions.push(AppAction::ServicesLoadFailed { error }),
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RetryPolicy;
    use crate::utils::test_utils::{MockResponse, MockServer};
    use std::time::Duration;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn services_are_loaded_even_if_config_fails() {
        let server = MockServer::start(vec![
            MockResponse::status(500),
            MockResponse::status(500),
            MockResponse::status(500),
            MockResponse::json(r#"{"services":["echo","tts"]}"#),
        ])
        .await;
        let client = ConfigClient::new(Client::new(), &server.url(), fast_retry());

        let actions = load_catalog(&client).await;
        assert_eq!(actions.len(), 2);
        match &actions[0] {
            AppAction::ConfigLoadFailed { error } => assert_eq!(
                error.history_message(),
                "Error: Failed to load config - HTTP 500: Internal Server Error"
            ),
            other => panic!("expected config failure, got {other:?}"),
        }
        match &actions[1] {
            AppAction::ServicesLoaded { services } => assert_eq!(services, &["echo", "tts"]),
            other => panic!("expected services, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn services_follow_the_configured_server() {
        let server = MockServer::start(vec![MockResponse::json(
            r#"{"server":{"host":"127.0.0.1","port":9},"services":{}}"#,
        )])
        .await;
        let client = ConfigClient::new(Client::new(), &server.url(), fast_retry());

        let actions = load_catalog(&client).await;
        assert!(matches!(actions[0], AppAction::ConfigLoaded { .. }));
        match &actions[1] {
            AppAction::ServicesLoadFailed { error } => {
                assert!(error
                    .history_message()
                    .starts_with("Error: Failed to load services - "));
            }
            other => panic!("expected services failure, got {other:?}"),
        }
        // Only the config request reached the original server.
        assert_eq!(server.request_count(), 1);
    }
}
