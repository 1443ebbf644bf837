use tracing::warn;

use crate::palette::{DisplayOptions, Palette};
use crate::pipeline::parse::parse_palette;

/// Shown when a backend call fails for any reason (network, auth, bad
/// status). Every failure is recoverable; the session stays ready to retry.
pub const MSG_SERVICE_UNAVAILABLE: &str = "The palette service is unavailable, try again.";

/// Shown when a response came back but contained no usable colors. Not an
/// error: the previous palette is kept.
pub const MSG_NO_USABLE_PALETTE: &str =
    "That prompt did not yield a usable palette. Try rephrasing it.";

/// Prompts shorter than this are not worth a backend round trip.
pub const MIN_PROMPT_CHARS: usize = 3;

/// Transient state of one interactive palette session.
///
/// Holds the current palette, the display flags, the last raw backend
/// response and the current user-facing message. Nothing here is
/// persisted; the host document (or the output file) is the only durable
/// artifact.
#[derive(Debug, Default)]
pub struct Session {
    palette: Option<Palette>,
    pub options: DisplayOptions,
    pub last_response: Option<String>,
    pub message: Option<String>,
    /// True while a generation or edit request is in flight. At most one
    /// request may be outstanding; submission is refused until it
    /// completes.
    pub busy: bool,
}

impl Session {
    pub fn new(options: DisplayOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Start from an existing palette (e.g. `--from` on the command line,
    /// or a selected element in the host document).
    pub fn with_palette(palette: Palette, options: DisplayOptions) -> Self {
        Self {
            palette: Some(palette),
            options,
            ..Self::default()
        }
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn palette_mut(&mut self) -> Option<&mut Palette> {
        self.palette.as_mut()
    }

    /// Whether `input` is submittable right now: no request in flight and
    /// at least [`MIN_PROMPT_CHARS`] non-whitespace-trimmed characters.
    pub fn can_submit(&self, input: &str) -> bool {
        !self.busy && input.trim().chars().count() >= MIN_PROMPT_CHARS
    }

    /// Mark a request as started. Returns false (and does nothing) if one
    /// is already in flight.
    pub fn begin_request(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        self.message = None;
        true
    }

    /// Feed a backend response through the parser.
    ///
    /// Zero parsed colors is a recoverable condition: the previous palette
    /// is kept and a user-facing message is set. Returns true when the
    /// palette was replaced.
    pub fn apply_response(&mut self, text: &str) -> bool {
        self.busy = false;
        self.last_response = Some(text.to_string());
        let entries = parse_palette(text);
        if entries.is_empty() {
            self.message = Some(MSG_NO_USABLE_PALETTE.to_string());
            return false;
        }
        self.palette = Some(Palette::new(entries));
        self.message = None;
        true
    }

    /// Record a failed backend call: clear the in-flight flag, keep the
    /// palette, surface the retry message.
    pub fn apply_error(&mut self, err: &anyhow::Error) {
        warn!("palette request failed: {err:#}");
        self.busy = false;
        self.last_response = None;
        self.message = Some(MSG_SERVICE_UNAVAILABLE.to_string());
    }

    /// Build the AI-edit instruction embedding the current palette, or
    /// None when there is no palette to edit.
    pub fn edit_instruction(&self, user_text: &str) -> Option<String> {
        let palette = self.palette.as_ref()?;
        Some(format!(
            "The current palette colors are {}. Change them to: {}",
            palette.describe(),
            user_text
        ))
    }
}
