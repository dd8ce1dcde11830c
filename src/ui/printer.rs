//! Plain-terminal rendering of the history view.
//!
//! Entries are printed oldest first. A response that is still streaming is
//! reprinted under a `…` marker each time its content changes; every entry
//! is printed once more in its final form when it is sealed.

use std::collections::{HashMap, HashSet};

use crate::core::config::defaults::service_display_name;
use crate::core::form::ControlSet;
use crate::core::history::{EntryBody, EntryId, EntryKind, HistoryEntry, HistoryLog};
use crate::core::render::RenderedEntry;
use crate::utils::logging::transcript_text;

#[derive(Default)]
pub struct TranscriptPrinter {
    printed: HashSet<EntryId>,
    /// Last partial text shown for each live entry.
    partial: HashMap<EntryId, String>,
}

impl TranscriptPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for every sealed entry not printed before, and for every live
    /// entry whose content changed since the last call.
    pub fn pending_lines(&mut self, history: &HistoryLog) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in history.iter().rev() {
            if entry.is_sealed() {
                if self.printed.insert(entry.id) {
                    self.partial.remove(&entry.id);
                    lines.push(format_entry(entry));
                }
                continue;
            }
            let text = transcript_text(entry).trim_end().to_string();
            if self.partial.get(&entry.id) != Some(&text) {
                lines.push(format!("… {text}"));
                self.partial.insert(entry.id, text);
            }
        }
        // Forget entries the log has evicted.
        self.printed.retain(|id| history.get(*id).is_some());
        self.partial.retain(|id, _| history.get(*id).is_some());
        lines
    }
}

pub fn format_entry(entry: &HistoryEntry) -> String {
    let body = transcript_text(entry);
    match (&entry.kind, &entry.body) {
        (EntryKind::Request, _) => format!("» {body}"),
        (EntryKind::Error, _) => format!("! {body}"),
        (_, EntryBody::Rendered(RenderedEntry::Text(text))) => {
            format!("{}\n  [▶ play ({})]", text.source.trim_end(), text.speech.lang)
        }
        (
            _,
            EntryBody::Rendered(RenderedEntry::Audio {
                src, autoplay: true, ..
            }),
        ) => format!("[audio, autoplay] {src}"),
        _ => body,
    }
}

pub fn format_form(service: Option<&str>, form: &ControlSet) -> Vec<String> {
    let Some(service) = service else {
        return vec!["No service selected. Use /service NAME.".to_string()];
    };
    let mut lines = vec![format!("{} parameters:", service_display_name(service))];
    if form.is_empty() {
        lines.push("  (none)".to_string());
    }
    lines.extend(form.iter().map(|control| format!("  {}", control.describe())));
    lines
}

pub fn format_services(services: &[String], selected: Option<&str>) -> Vec<String> {
    if services.is_empty() {
        return vec!["No services available".to_string()];
    }
    services
        .iter()
        .map(|name| {
            let marker = if Some(name.as_str()) == selected { '*' } else { ' ' };
            format!("{marker} {name:<20} {}", service_display_name(name))
        })
        .collect()
}
