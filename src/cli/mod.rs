//! Command-line interface parsing and handling
//!
//! Every subcommand starts the same way: settings are loaded, tracing is
//! installed, and the backend config and service catalog are fetched.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::services::ConfigClient;
use crate::core::app::{load_catalog, App, AppAction, SessionContext};
use crate::core::config::Settings;
use crate::core::form::ControlValue;
use crate::core::history::EntryKind;
use crate::ui::event_loop::EventLoop;
use crate::ui::printer::format_services;
use crate::ui::shell::run_shell;
use crate::utils::logging::{init_tracing, LoggingState};

#[derive(Parser)]
#[command(name = "paia-client")]
#[command(about = "Terminal client for PAIA AI services")]
#[command(
    long_about = "Connects to a PAIA backend, builds a parameter form for each service from the \
backend configuration, and shows streamed results as they arrive.\n\n\
Settings are read from settings.toml in the platform config directory unless \
--settings is given.\n\n\
Shell commands:\n\
  /services         List available services\n\
  /service NAME     Select a service\n\
  /form             Show the current parameters\n\
  /set NAME VALUE   Change a parameter\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume\n\
  /quit             Leave the shell"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL, overriding the settings file
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Read settings from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Enable transcript logging to specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Diagnostic log filter, e.g. "debug" or "paia_client=trace"
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the services offered by the backend
    Services,
    /// Print the backend configuration as JSON
    Config,
    /// Send one query and print the result
    Query {
        /// Service to query
        #[arg(short = 's', long)]
        service: String,
        /// Form parameter, repeatable
        #[arg(short = 'P', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
        /// Query text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// Start the interactive shell (default)
    Shell,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };
    init_tracing(args.log_level.as_deref().or(settings.log_level.as_deref()));

    tokio::runtime::Runtime::new()?.block_on(async_main(args, settings))
}

async fn async_main(args: Args, settings: Settings) -> Result<(), Box<dyn Error>> {
    let server_url = args
        .server
        .clone()
        .unwrap_or_else(|| settings.server_url.clone());
    let client = reqwest::Client::new();
    let config_client = ConfigClient::new(client.clone(), &server_url, settings.retry_policy());

    match args.command.unwrap_or(Commands::Shell) {
        Commands::Config => {
            let config = config_client
                .fetch_config()
                .await
                .map_err(|e| e.history_message())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Services => {
            let mut event_loop = start_session(args.log, &settings, client, &config_client).await?;
            let mut stdout = std::io::stdout();
            event_loop.flush_output(&mut stdout)?;
            for line in format_services(&event_loop.app.session.services, None) {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Query {
            service,
            params,
            text,
        } => {
            let mut actions = vec![AppAction::SelectService { service }];
            for param in params {
                let (name, value) = param
                    .split_once('=')
                    .ok_or_else(|| format!("invalid parameter '{param}', expected NAME=VALUE"))?;
                actions.push(AppAction::SetParameter {
                    name: name.to_string(),
                    value: ControlValue::from(value),
                });
            }
            actions.push(AppAction::Submit {
                query: text.join(" "),
            });

            let mut event_loop = start_session(args.log, &settings, client, &config_client).await?;
            event_loop.dispatcher().dispatch_many(actions);
            event_loop.run_until_idle(&mut std::io::stdout()).await?;

            let history = &event_loop.app.history;
            let sent = history.iter().any(|entry| entry.kind == EntryKind::Request);
            let failed = history.iter().any(|entry| entry.kind == EntryKind::Error);
            if !sent || failed {
                return Err("query failed".into());
            }
            Ok(())
        }
        Commands::Shell => {
            let event_loop = start_session(args.log, &settings, client, &config_client).await?;
            run_shell(event_loop).await
        }
    }
}

async fn start_session(
    log: Option<String>,
    settings: &Settings,
    client: reqwest::Client,
    config_client: &ConfigClient,
) -> Result<EventLoop, Box<dyn Error>> {
    let logging = LoggingState::new(log)?;
    let session = SessionContext::new(client, config_client.base_url(), logging);
    let mut event_loop = EventLoop::new(App::new(session, settings.history_limit));
    event_loop
        .dispatcher()
        .dispatch_many(load_catalog(config_client).await);
    event_loop.tick();
    Ok(event_loop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn query_subcommand_collects_params_and_text() {
        let args = Args::try_parse_from([
            "paia-client",
            "--server",
            "http://10.0.0.5:9000",
            "query",
            "-s",
            "text-generator",
            "-P",
            "temperature=0.2",
            "--param",
            "style=terse",
            "write",
            "a",
            "haiku",
        ])
        .unwrap();
        assert_eq!(args.server.as_deref(), Some("http://10.0.0.5:9000"));
        match args.command {
            Some(Commands::Query {
                service,
                params,
                text,
            }) => {
                assert_eq!(service, "text-generator");
                assert_eq!(params, vec!["temperature=0.2", "style=terse"]);
                assert_eq!(text.join(" "), "write a haiku");
            }
            _ => panic!("expected query subcommand"),
        }
    }

    #[test]
    fn shell_is_the_default() {
        let args = Args::try_parse_from(["paia-client", "--log", "session.log"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.log.as_deref(), Some("session.log"));
    }
}
