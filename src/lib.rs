//! paia-client is a terminal client for PAIA service backends.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the wire payloads and the HTTP calls for `/config`,
//!   `/services`, and query submission.
//! - [`core`] owns session state: the backend configuration, schema-driven
//!   form controls, payload composition, the event-stream decoder, and the
//!   bounded history the responses are rendered into.
//! - [`ui`] runs the event loop that applies actions one at a time and
//!   prints the history to the terminal.
//! - [`commands`] implements slash-command parsing for the interactive shell.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads settings, fetches the service
//! catalog, and dispatches into [`ui::shell`] or a one-shot query.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
