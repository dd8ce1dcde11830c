use tracing::{debug, info, warn};

use super::{App, AppAction, AppCommand};
use crate::core::config::defaults::service_display_name;
use crate::core::error::ClientError;
use crate::core::form::{ControlSet, FormBuilder};
use crate::core::history::EntryKind;

pub(super) fn handle_catalog_action(app: &mut App, action: AppAction) -> Option<AppCommand> {
    match action {
        AppAction::ConfigLoaded { config } => {
            app.session.replace_config(config);
            info!(base_url = %app.session.base_url, "backend config loaded");
            if let Some(service) = app.session.selected_service.clone() {
                render_form(app, &service);
            }
        }
        AppAction::ConfigLoadFailed { error } | AppAction::ServicesLoadFailed { error } => {
            warn!(error = %error, "startup request failed");
            app.push_error(&error);
        }
        AppAction::ServicesLoaded { services } => load_services(app, services),
        AppAction::SelectService { service } => select_service(app, service),
        AppAction::SetParameter { name, value } => {
            if let Err(err) = app.form.set(&name, value) {
                app.set_notice(err.to_string());
            }
        }
        AppAction::ResetForm => app.form.reset(),
        _ => unreachable!("non-catalog action routed to catalog handler"),
    }
    None
}

fn load_services(app: &mut App, services: Vec<String>) {
    let mut catalog: Vec<String> = Vec::with_capacity(services.len());
    for service in services {
        if !catalog.contains(&service) {
            catalog.push(service);
        }
    }

    if catalog.is_empty() {
        app.push_message(EntryKind::Error, "Error: No services available");
    }

    let still_listed = app
        .selected_service()
        .is_some_and(|selected| catalog.iter().any(|name| name == selected));
    if !still_listed && app.session.selected_service.take().is_some() {
        app.form = ControlSet::empty();
    }
    app.session.services = catalog;
}

/// Switching services discards every control of the previous service.
fn select_service(app: &mut App, service: String) {
    if !app.session.services.iter().any(|name| *name == service) {
        app.set_notice(format!("Unknown service: {service}"));
        return;
    }
    render_form(app, &service);
    app.set_notice(format!("Selected {}", service_display_name(&service)));
    app.session.selected_service = Some(service);
}

fn render_form(app: &mut App, service: &str) {
    match FormBuilder::render(app.session.config.parameters(service)) {
        Ok(form) => {
            debug!(service, controls = form.len(), "form rendered");
            app.form = form;
        }
        Err(err) => {
            app.form = ControlSet::empty();
            app.push_error(&ClientError::Schema(err));
        }
    }
}
