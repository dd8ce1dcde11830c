use std::error::Error as StdError;
use std::fmt;

/// Transport or status failure talking to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkError {
    /// URL of the request that failed.
    pub url: String,
    /// HTTP status code, when the server answered.
    pub status: Option<u16>,
    /// Status text or transport error message.
    pub message: String,
}

impl NetworkError {
    pub fn status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            url: url.into(),
            status: Some(status.as_u16()),
            message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "HTTP {}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl StdError for NetworkError {}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|url| url.to_string()).unwrap_or_default();
        match err.status() {
            Some(status) => NetworkError::status(url, status),
            None => NetworkError::transport(url, err.to_string()),
        }
    }
}

/// Submission rejected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingService,
    EmptyQuery,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingService => write!(f, "Please select a service"),
            ValidationError::EmptyQuery => write!(f, "Please enter a query"),
        }
    }
}

impl StdError for ValidationError {}

/// A parameter schema that cannot be turned into a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidName(String),
    DuplicateName(String),
    ReservedName(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::InvalidName(name) => {
                write!(f, "parameter name '{name}' is not a valid identifier")
            }
            SchemaError::DuplicateName(name) => {
                write!(f, "parameter name '{name}' is declared more than once")
            }
            SchemaError::ReservedName(name) => {
                write!(f, "parameter name '{name}' is reserved for the query text")
            }
        }
    }
}

impl StdError for SchemaError {}

/// One frame of the event stream could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDecodeError {
    /// Payload text following the `data: ` prefix.
    pub payload: String,
    pub message: String,
}

impl fmt::Display for StreamDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for StreamDecodeError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    ConfigLoad(NetworkError),
    ServiceList(NetworkError),
    Validation(ValidationError),
    Network(NetworkError),
    StreamDecode(StreamDecodeError),
    StreamTerminatedByServer(String),
    Schema(SchemaError),
}

impl ClientError {
    /// Text shown in the history view for this error.
    pub fn history_message(&self) -> String {
        match self {
            ClientError::ConfigLoad(err) => format!("Error: Failed to load config - {err}"),
            ClientError::ServiceList(err) => format!("Error: Failed to load services - {err}"),
            ClientError::Validation(err) => err.to_string(),
            ClientError::Network(err) => format!("Error: {err}"),
            ClientError::StreamDecode(err) => {
                format!("Error: Failed to parse stream data - {err}")
            }
            ClientError::StreamTerminatedByServer(message) => format!("Error: {message}"),
            ClientError::Schema(err) => format!("Error: Invalid service form - {err}"),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::ConfigLoad(err) => write!(f, "failed to load config: {err}"),
            ClientError::ServiceList(err) => write!(f, "failed to load services: {err}"),
            ClientError::Validation(err) => write!(f, "{err}"),
            ClientError::Network(err) => write!(f, "{err}"),
            ClientError::StreamDecode(err) => write!(f, "failed to parse stream data: {err}"),
            ClientError::StreamTerminatedByServer(message) => {
                write!(f, "stream terminated by server: {message}")
            }
            ClientError::Schema(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for ClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ClientError::ConfigLoad(err)
            | ClientError::ServiceList(err)
            | ClientError::Network(err) => Some(err),
            ClientError::Validation(err) => Some(err),
            ClientError::StreamDecode(err) => Some(err),
            ClientError::Schema(err) => Some(err),
            ClientError::StreamTerminatedByServer(_) => None,
        }
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Validation(err)
    }
}

impl From<SchemaError> for ClientError {
    fn from(err: SchemaError) -> Self {
        ClientError::Schema(err)
    }
}
