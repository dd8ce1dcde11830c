use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::core::config::data::SelectOption;

/// Default number of rows for a multi-line text control.
pub const DEFAULT_TEXTBOX_ROWS: u32 = 4;

/// Current value of a control as it goes into the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlValue {
    Text(String),
    Number(f64),
}

impl ControlValue {
    pub fn to_json(&self) -> Value {
        match self {
            ControlValue::Text(text) => Value::String(text.clone()),
            ControlValue::Number(number) => Value::from(*number),
        }
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Text(text) => write!(f, "{text}"),
            ControlValue::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for ControlValue {
    fn from(value: &str) -> Self {
        ControlValue::Text(value.to_string())
    }
}

impl From<f64> for ControlValue {
    fn from(value: f64) -> Self {
        ControlValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    UnknownControl(String),
    UnknownOption { control: String, value: String },
    InvalidNumber { control: String, value: String },
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::UnknownControl(name) => write!(f, "no form field named '{name}'"),
            ControlError::UnknownOption { control, value } => {
                write!(f, "'{value}' is not an option of '{control}'")
            }
            ControlError::InvalidNumber { control, value } => {
                write!(f, "'{control}' expects a number, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ControlError {}

pub type ChangeListener = Box<dyn FnMut(&ControlValue) + Send>;

/// A live input control, independent of any UI toolkit.
pub trait Control: Send {
    fn name(&self) -> &str;
    fn label(&self) -> &str;
    fn value(&self) -> ControlValue;
    fn set_value(&mut self, value: ControlValue) -> Result<(), ControlError>;
    /// Register a listener fired after every value change.
    fn on_change(&mut self, listener: ChangeListener);
    /// Restore the configured initial value.
    fn reset(&mut self);
    /// One-line summary for text front-ends.
    fn describe(&self) -> String;
}

#[derive(Default)]
struct Listeners(Vec<ChangeListener>);

impl Listeners {
    fn push(&mut self, listener: ChangeListener) {
        self.0.push(listener);
    }

    fn notify(&mut self, value: &ControlValue) {
        for listener in self.0.iter_mut() {
            listener(value);
        }
    }
}

pub struct SelectControl {
    name: String,
    label: String,
    options: Vec<SelectOption>,
    selected: usize,
    listeners: Listeners,
}

impl SelectControl {
    pub fn new(name: String, label: String, options: Vec<SelectOption>) -> Self {
        Self {
            name,
            label,
            options,
            selected: 0,
            listeners: Listeners::default(),
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }
}

impl Control for SelectControl {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> ControlValue {
        let value = self
            .options
            .get(self.selected)
            .map(|opt| opt.value.clone())
            .unwrap_or_default();
        ControlValue::Text(value)
    }

    fn set_value(&mut self, value: ControlValue) -> Result<(), ControlError> {
        let wanted = value.to_string();
        let index = self
            .options
            .iter()
            .position(|opt| opt.value == wanted)
            .ok_or_else(|| ControlError::UnknownOption {
                control: self.name.clone(),
                value: wanted,
            })?;
        self.selected = index;
        let current = self.value();
        self.listeners.notify(&current);
        Ok(())
    }

    fn on_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn reset(&mut self) {
        if self.selected != 0 {
            self.selected = 0;
            let current = self.value();
            self.listeners.notify(&current);
        }
    }

    fn describe(&self) -> String {
        let choices: Vec<&str> = self.options.iter().map(|opt| opt.value.as_str()).collect();
        format!(
            "{} ({}) = {} [{}]",
            self.label,
            self.name,
            self.value(),
            choices.join("|")
        )
    }
}

/// Single-line or multi-line free text. The value is kept verbatim.
pub struct TextControl {
    name: String,
    label: String,
    placeholder: String,
    rows: Option<u32>,
    initial: String,
    value: String,
    listeners: Listeners,
}

impl TextControl {
    pub fn single_line(
        name: String,
        label: String,
        placeholder: Option<String>,
        initial: Option<String>,
    ) -> Self {
        let initial = initial.unwrap_or_default();
        Self {
            name,
            label,
            placeholder: placeholder.unwrap_or_default(),
            rows: None,
            value: initial.clone(),
            initial,
            listeners: Listeners::default(),
        }
    }

    pub fn multi_line(
        name: String,
        label: String,
        placeholder: Option<String>,
        rows: Option<u32>,
        initial: Option<String>,
    ) -> Self {
        let mut control = Self::single_line(name, label, placeholder, initial);
        control.rows = Some(rows.unwrap_or(DEFAULT_TEXTBOX_ROWS));
        control
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// `None` for single-line controls.
    pub fn rows(&self) -> Option<u32> {
        self.rows
    }
}

impl Control for TextControl {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> ControlValue {
        ControlValue::Text(self.value.clone())
    }

    fn set_value(&mut self, value: ControlValue) -> Result<(), ControlError> {
        self.value = value.to_string();
        let current = self.value();
        self.listeners.notify(&current);
        Ok(())
    }

    fn on_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn reset(&mut self) {
        if self.value != self.initial {
            self.value = self.initial.clone();
            let current = self.value();
            self.listeners.notify(&current);
        }
    }

    fn describe(&self) -> String {
        let shown = if self.value.is_empty() && !self.placeholder.is_empty() {
            format!("<{}>", self.placeholder)
        } else {
            format!("{:?}", self.value)
        };
        match self.rows {
            Some(rows) => format!("{} ({}) = {} [{} rows]", self.label, self.name, shown, rows),
            None => format!("{} ({}) = {}", self.label, self.name, shown),
        }
    }
}

/// Numeric range with a companion label mirroring the current value.
pub struct SliderControl {
    name: String,
    label: String,
    min: f64,
    max: f64,
    step: f64,
    initial: f64,
    value: f64,
    value_label: String,
    listeners: Listeners,
}

impl SliderControl {
    /// Without an explicit `value` the slider starts at the midpoint.
    pub fn new(
        name: String,
        label: String,
        min: f64,
        max: f64,
        step: f64,
        value: Option<f64>,
    ) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let initial = value.unwrap_or(min + (max - min) / 2.0).clamp(min, max);
        Self {
            name,
            label,
            min,
            max,
            step,
            initial,
            value: initial,
            value_label: initial.to_string(),
            listeners: Listeners::default(),
        }
    }

    /// Text of the live label next to the slider.
    pub fn value_label(&self) -> &str {
        &self.value_label
    }

    pub fn bounds(&self) -> (f64, f64, f64) {
        (self.min, self.max, self.step)
    }

    fn apply(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
        self.value_label = self.value.to_string();
        let current = self.value();
        self.listeners.notify(&current);
    }
}

impl Control for SliderControl {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> ControlValue {
        ControlValue::Number(self.value)
    }

    fn set_value(&mut self, value: ControlValue) -> Result<(), ControlError> {
        let number = match value {
            ControlValue::Number(number) => number,
            ControlValue::Text(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| ControlError::InvalidNumber {
                        control: self.name.clone(),
                        value: text.clone(),
                    })?
            }
        };
        if !number.is_finite() {
            return Err(ControlError::InvalidNumber {
                control: self.name.clone(),
                value: number.to_string(),
            });
        }
        self.apply(number);
        Ok(())
    }

    fn on_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn reset(&mut self) {
        if self.value != self.initial {
            self.apply(self.initial);
        }
    }

    fn describe(&self) -> String {
        format!(
            "{} ({}) = {} [{}..{} step {}]",
            self.label, self.name, self.value_label, self.min, self.max, self.step
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn options() -> Vec<SelectOption> {
        vec![
            SelectOption {
                value: "fr".into(),
                label: "French".into(),
            },
            SelectOption {
                value: "de".into(),
                label: "German".into(),
            },
        ]
    }

    #[test]
    fn select_defaults_to_first_option_and_rejects_unknown_values() {
        let mut select = SelectControl::new("lang".into(), "Language".into(), options());
        assert_eq!(select.value(), ControlValue::from("fr"));

        select.set_value("de".into()).unwrap();
        assert_eq!(select.value(), ControlValue::from("de"));

        let err = select.set_value("es".into()).unwrap_err();
        assert_eq!(
            err,
            ControlError::UnknownOption {
                control: "lang".into(),
                value: "es".into()
            }
        );
        assert_eq!(select.value(), ControlValue::from("de"));

        select.reset();
        assert_eq!(select.value(), ControlValue::from("fr"));
    }

    #[test]
    fn empty_select_yields_empty_string() {
        let select = SelectControl::new("lang".into(), "Language".into(), Vec::new());
        assert_eq!(select.value(), ControlValue::from(""));
    }

    #[test]
    fn text_keeps_whitespace_verbatim() {
        let mut text = TextControl::single_line("note".into(), "Note".into(), None, None);
        text.set_value("  padded  ".into()).unwrap();
        assert_eq!(text.value(), ControlValue::from("  padded  "));
        assert_eq!(text.rows(), None);
    }

    #[test]
    fn textbox_defaults_to_four_rows() {
        let textbox = TextControl::multi_line("ctx".into(), "Context".into(), None, None, None);
        assert_eq!(textbox.rows(), Some(DEFAULT_TEXTBOX_ROWS));
        let textbox = TextControl::multi_line("ctx".into(), "Context".into(), None, Some(8), None);
        assert_eq!(textbox.rows(), Some(8));
    }

    #[test]
    fn slider_label_tracks_every_change() {
        let mut slider =
            SliderControl::new("t".into(), "Temperature".into(), 0.0, 2.0, 0.1, Some(0.7));
        assert_eq!(slider.value_label(), "0.7");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        slider.on_change(Box::new(move |value| {
            sink.lock().unwrap().push(value.clone());
        }));

        slider.set_value("1.5".into()).unwrap();
        assert_eq!(slider.value_label(), "1.5");
        slider.set_value(ControlValue::Number(9.0)).unwrap();
        assert_eq!(slider.value(), ControlValue::Number(2.0));
        assert_eq!(slider.value_label(), "2");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ControlValue::Number(1.5), ControlValue::Number(2.0)]
        );
    }

    #[test]
    fn slider_rejects_non_numbers_and_defaults_to_midpoint() {
        let mut slider = SliderControl::new("n".into(), "N".into(), 0.0, 10.0, 1.0, None);
        assert_eq!(slider.value(), ControlValue::Number(5.0));
        assert!(slider.set_value("abc".into()).is_err());
        assert!(slider.set_value(ControlValue::Number(f64::NAN)).is_err());
        assert_eq!(slider.value(), ControlValue::Number(5.0));
    }

    #[test]
    fn control_values_serialize_as_json_scalars() {
        assert_eq!(ControlValue::Number(0.5).to_json(), serde_json::json!(0.5));
        assert_eq!(ControlValue::from("x").to_json(), serde_json::json!("x"));
    }
}
