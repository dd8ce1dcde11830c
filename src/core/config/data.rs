use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Backend configuration served at `GET /config`.
///
/// Replaced wholesale when reloaded; never edited in place.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct UiConfig {
    /// Global default for clearing the form after a query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_form_after_query: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct ServiceConfig {
    #[serde(default, deserialize_with = "parameter_list")]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub streamable: bool,
    /// Overrides `ui.clear_form_after_query` for this service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_form_after_query: Option<bool>,
}

/// One form field descriptor.
///
/// Decoding never fails on the field's own attributes: a missing or unknown
/// `type`, or attributes that do not fit the type, leave it `Unknown`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "WireParameter")]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub kind: ParamKind,
}

#[derive(Deserialize)]
struct WireParameter {
    #[serde(default)]
    name: String,
    #[serde(default)]
    label: String,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl From<WireParameter> for ParameterSpec {
    fn from(wire: WireParameter) -> Self {
        let kind = ParamKind::deserialize(Value::Object(wire.attributes)).unwrap_or_else(|err| {
            warn!(parameter = %wire.name, error = %err, "unsupported parameter definition");
            ParamKind::Unknown
        });
        Self {
            name: wire.name,
            label: wire.label,
            kind,
        }
    }
}

/// Entries that are not objects are dropped instead of failing the config.
fn parameter_list<'de, D>(deserializer: D) -> Result<Vec<ParameterSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match ParameterSpec::deserialize(entry) {
            Ok(spec) => Some(spec),
            Err(err) => {
                warn!(error = %err, "skipping malformed parameter");
                None
            }
        })
        .collect())
}

/// Field kind, carried in the `type` key on the wire.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Textbox {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Slider {
        #[serde(default, deserialize_with = "number")]
        min: f64,
        #[serde(default = "default_slider_max", deserialize_with = "number")]
        max: f64,
        #[serde(default = "default_slider_step", deserialize_with = "number")]
        step: f64,
        #[serde(
            default,
            deserialize_with = "optional_number",
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<f64>,
    },
    /// Any `type` this client does not know how to render.
    #[serde(other)]
    Unknown,
}

fn default_slider_max() -> f64 {
    100.0
}

fn default_slider_step() -> f64 {
    1.0
}

/// Slider attributes arrive as JSON numbers or as numeric strings.
fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    optional_number(deserializer)?.ok_or_else(|| D::Error::custom("expected a number"))
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("number {n} is out of range"))),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("'{text}' is not a number"))),
        other => Err(D::Error::custom(format!("expected a number, found {other}"))),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl ParamKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Select { .. } => "select",
            ParamKind::Text { .. } => "text",
            ParamKind::Textbox { .. } => "textbox",
            ParamKind::Slider { .. } => "slider",
            ParamKind::Unknown => "unknown",
        }
    }
}

impl Config {
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.get(name)
    }

    /// Parameters for `service`, empty when the service is not configured.
    pub fn parameters(&self, service: &str) -> &[ParameterSpec] {
        self.service(service)
            .map(|svc| svc.parameters.as_slice())
            .unwrap_or_default()
    }

    pub fn is_streamable(&self, service: &str) -> bool {
        self.service(service).is_some_and(|svc| svc.streamable)
    }

    /// Base URL the backend advertises for itself.
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}
