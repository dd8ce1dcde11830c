use pulldown_cmark::{html, Options, Parser};

use crate::api::{EventOutcome, ResultKind, StreamEvent};
use crate::core::history::{EntryId, HistoryLog};

/// Language used for the play-as-speech affordance.
pub const SPEECH_LANG: &str = "en-US";

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedEntry {
    Text(TextEntry),
    Image { src: String },
    Audio { src: String, autoplay: bool, controls: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    /// Markdown as received.
    pub source: String,
    pub html: String,
    pub speech: SpeechAffordance,
}

/// "Play this text" button payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAffordance {
    pub text: String,
    pub lang: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Created(EntryId),
    Updated(EntryId),
    Skipped,
}

pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

pub fn render_result(result: &str, kind: ResultKind) -> RenderedEntry {
    match kind {
        ResultKind::Image => RenderedEntry::Image {
            src: result.to_string(),
        },
        ResultKind::Audio => RenderedEntry::Audio {
            src: result.to_string(),
            autoplay: true,
            controls: true,
        },
        ResultKind::Text => RenderedEntry::Text(TextEntry {
            source: result.to_string(),
            html: markdown_to_html(result),
            speech: SpeechAffordance {
                text: result.to_string(),
                lang: SPEECH_LANG.to_string(),
            },
        }),
    }
}

/// Render a result event against the caller's live entry slot.
///
/// The first result creates an entry and stores its id in `live`; later
/// non-audio results replace that entry's content. A later audio result is
/// a separate clip: it gets its own sealed entry and `live` keeps pointing
/// at the entry being updated. Error and empty events are left to the
/// caller.
pub fn on_event(
    history: &mut HistoryLog,
    event: &StreamEvent,
    live: &mut Option<EntryId>,
) -> RenderOutcome {
    let EventOutcome::Result(result, kind) = event.outcome() else {
        return RenderOutcome::Skipped;
    };

    match *live {
        None => {
            let id = history.append_live(render_result(result, kind));
            *live = Some(id);
            RenderOutcome::Created(id)
        }
        Some(_) if kind == ResultKind::Audio => {
            let id = history.append_live(render_result(result, kind));
            history.seal(id);
            RenderOutcome::Created(id)
        }
        Some(id) => {
            if history.update_live(id, render_result(result, kind)) {
                RenderOutcome::Updated(id)
            } else {
                RenderOutcome::Skipped
            }
        }
    }
}
