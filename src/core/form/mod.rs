//! Schema-driven form controls.
//!
//! [`FormBuilder::render`] turns a service's [`ParameterSpec`] list into a
//! [`ControlSet`]. The set owns its controls and their change listeners, so
//! replacing it for another service drops everything from the previous one.

pub mod controls;

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::config::data::{ParamKind, ParameterSpec};
use crate::core::config::validate::validate_parameters;
use crate::core::error::SchemaError;

pub use controls::{
    ChangeListener, Control, ControlError, ControlValue, SelectControl, SliderControl,
    TextControl,
};

pub struct FormBuilder;

impl FormBuilder {
    /// Build a fresh control set. Parameters of unknown kind are skipped.
    pub fn render(parameters: &[ParameterSpec]) -> Result<ControlSet, SchemaError> {
        validate_parameters(parameters)?;

        let mut controls: Vec<Box<dyn Control>> = Vec::with_capacity(parameters.len());
        for param in parameters {
            if let Some(control) = build_control(param) {
                controls.push(control);
            } else {
                debug!(name = %param.name, "skipping parameter of unknown type");
            }
        }
        Ok(ControlSet { controls })
    }
}

fn build_control(param: &ParameterSpec) -> Option<Box<dyn Control>> {
    let name = param.name.clone();
    let label = param.label.clone();
    let control: Box<dyn Control> = match &param.kind {
        ParamKind::Select { options } => {
            Box::new(SelectControl::new(name, label, options.clone()))
        }
        ParamKind::Text { placeholder, value } => Box::new(TextControl::single_line(
            name,
            label,
            placeholder.clone(),
            value.clone(),
        )),
        ParamKind::Textbox {
            placeholder,
            rows,
            value,
        } => Box::new(TextControl::multi_line(
            name,
            label,
            placeholder.clone(),
            *rows,
            value.clone(),
        )),
        ParamKind::Slider {
            min,
            max,
            step,
            value,
        } => Box::new(SliderControl::new(name, label, *min, *max, *step, *value)),
        ParamKind::Unknown => return None,
    };
    Some(control)
}

/// The live controls of the currently selected service.
#[derive(Default)]
pub struct ControlSet {
    controls: Vec<Box<dyn Control>>,
}

impl ControlSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Control> {
        self.controls.iter().map(|control| control.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Control> {
        self.iter().find(|control| control.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Control + 'static)> {
        self.controls
            .iter_mut()
            .find(|control| control.name() == name)
            .map(|control| control.as_mut())
    }

    pub fn set(&mut self, name: &str, value: ControlValue) -> Result<(), ControlError> {
        self.get_mut(name)
            .ok_or_else(|| ControlError::UnknownControl(name.to_string()))?
            .set_value(value)
    }

    /// Current value of every control, keyed by parameter name.
    pub fn read_values(&self) -> Map<String, Value> {
        self.iter()
            .map(|control| (control.name().to_string(), control.value().to_json()))
            .collect()
    }

    pub fn reset(&mut self) {
        for control in self.controls.iter_mut() {
            control.reset();
        }
    }
}
