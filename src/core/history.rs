use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;

use crate::core::config::io::DEFAULT_HISTORY_LIMIT;
use crate::core::render::RenderedEntry;

/// Stable handle to one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Request,
    Response,
    Error,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Request => "request",
            EntryKind::Response => "response",
            EntryKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryBody {
    Message(String),
    Rendered(RenderedEntry),
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub kind: EntryKind,
    pub body: EntryBody,
    pub created_at: DateTime<Utc>,
    sealed: bool,
}

impl HistoryEntry {
    /// Sealed entries never change again.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn message(&self) -> Option<&str> {
        match &self.body {
            EntryBody::Message(message) => Some(message),
            EntryBody::Rendered(_) => None,
        }
    }

    pub fn rendered(&self) -> Option<&RenderedEntry> {
        match &self.body {
            EntryBody::Rendered(rendered) => Some(rendered),
            EntryBody::Message(_) => None,
        }
    }
}

/// Bounded, most-recent-first list of entries. The oldest entry is evicted
/// once the bound is exceeded.
#[derive(Debug)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
    next_id: u64,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
            next_id: 1,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a finished request or error line.
    pub fn append_message(&mut self, kind: EntryKind, message: impl Into<String>) -> EntryId {
        self.insert(kind, EntryBody::Message(message.into()), true)
    }

    /// Append a response that may still be updated until [`HistoryLog::seal`].
    pub fn append_live(&mut self, rendered: RenderedEntry) -> EntryId {
        self.insert(EntryKind::Response, EntryBody::Rendered(rendered), false)
    }

    fn insert(&mut self, kind: EntryKind, body: EntryBody, sealed: bool) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push_front(HistoryEntry {
            id,
            kind,
            body,
            created_at: Utc::now(),
            sealed,
        });
        while self.entries.len() > self.limit {
            self.entries.pop_back();
        }
        id
    }

    /// Replace the content of an unsealed response in place.
    ///
    /// Returns `false` when the entry was evicted or is already sealed.
    pub fn update_live(&mut self, id: EntryId, rendered: RenderedEntry) -> bool {
        match self.get_mut(id) {
            Some(entry) if !entry.sealed => {
                entry.body = EntryBody::Rendered(rendered);
                true
            }
            _ => false,
        }
    }

    /// Freeze an entry. Returns it if it was live until now.
    pub fn seal(&mut self, id: EntryId) -> Option<&HistoryEntry> {
        let entry = self.get_mut(id)?;
        if entry.sealed {
            return None;
        }
        entry.sealed = true;
        Some(entry)
    }

    pub fn get(&self, id: EntryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn get_mut(&mut self, id: EntryId) -> Option<&mut HistoryEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    /// Most recent first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }
}
