pub mod app;
pub mod compose;
pub mod config;
pub mod error;
pub mod form;
pub mod history;
pub mod query_stream;
pub mod render;
pub mod sse;
