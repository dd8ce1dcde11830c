pub mod event_loop;
pub mod printer;
pub mod shell;
