use crate::core::config::data::Config;

/// Used when neither the service nor the `ui` section decides.
pub const DEFAULT_CLEAR_FORM_AFTER_QUERY: bool = true;

impl Config {
    /// Whether the form should be cleared after querying `service`.
    ///
    /// Lookup order: the service's own `clear_form_after_query`, then
    /// `ui.clear_form_after_query`, then [`DEFAULT_CLEAR_FORM_AFTER_QUERY`].
    pub fn clear_form_after_query(&self, service: &str) -> bool {
        self.service(service)
            .and_then(|svc| svc.clear_form_after_query)
            .or(self.ui.clear_form_after_query)
            .unwrap_or(DEFAULT_CLEAR_FORM_AFTER_QUERY)
    }
}

/// Human-facing label for a service identifier (`text-generator` → `TEXT GENERATOR`).
pub fn service_display_name(service: &str) -> String {
    service.replace('-', " ").to_uppercase()
}
