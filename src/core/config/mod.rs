pub mod data;
pub mod defaults;
pub mod io;
pub mod validate;


pub use data::{Config, ParamKind, ParameterSpec, SelectOption, ServiceConfig};
pub use io::{RetryPolicy, Settings, SettingsError};
