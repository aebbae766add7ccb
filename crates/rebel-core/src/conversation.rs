//! The stylist conversation: an append-only transcript plus strict
//! turn-taking.
//!
//! A conversation is either [`TurnState::Idle`] and accepting input, or
//! [`TurnState::Awaiting`] one gateway reply. Accepting a submission hands
//! back a [`PendingTurn`]; the caller runs the gateway call and reports the
//! outcome with the same turn id. Outcomes for any other turn are dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::error::GatewayError;
use crate::state::ChatMessage;

pub const GREETING: &str = "SYSTEM ONLINE. I see you looking at the Anarchy Boots. Need a fit check?";
pub const EMPTY_REPLY_FALLBACK: &str = "Static in the line. Try again.";
pub const GATEWAY_ERROR_PLACEHOLDER: &str = "ERROR: NEURAL LINK SEVERED.";

// Turn ids are unique for the whole process so a reply can never be mistaken
// for a turn of a later conversation.
static NEXT_TURN: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(u64);

impl TurnId {
    fn next() -> Self {
        TurnId(NEXT_TURN.fetch_add(1, Ordering::Relaxed))
    }
}

/// A submission the conversation accepted and is now waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub id: TurnId,
    pub utterance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Awaiting,
}

/// Why a submission was ignored. None of these are shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("input is empty")]
    EmptyInput,
    #[error("no credential configured for the stylist")]
    NotAuthorized,
    #[error("a reply is still pending")]
    Busy,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug)]
pub struct Conversation {
    transcript: Vec<ChatMessage>,
    pending: Option<TurnId>,
    authorized: bool,
    draft: String,
    cursor: usize, // in chars
    scroll_requested: bool,
}

impl Conversation {
    /// Fresh conversation seeded with the stylist's greeting. `authorized`
    /// says whether a credential for the remote service exists at all.
    pub fn new(authorized: bool) -> Self {
        Self {
            transcript: vec![ChatMessage::assistant(GREETING)],
            pending: None,
            authorized,
            draft: String::new(),
            cursor: 0,
            scroll_requested: true,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.transcript.last()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn state(&self) -> TurnState {
        if self.is_busy() {
            TurnState::Awaiting
        } else {
            TurnState::Idle
        }
    }

    pub fn pending_turn(&self) -> Option<TurnId> {
        self.pending
    }

    pub fn submit(&mut self, text: &str) -> Result<PendingTurn, Rejection> {
        if text.trim().is_empty() {
            return Err(Rejection::EmptyInput);
        }
        if !self.authorized {
            return Err(Rejection::NotAuthorized);
        }
        if self.is_busy() {
            return Err(Rejection::Busy);
        }

        let id = TurnId::next();
        self.push(ChatMessage::user(text));
        self.draft.clear();
        self.cursor = 0;
        self.pending = Some(id);

        Ok(PendingTurn {
            id,
            utterance: text.to_string(),
        })
    }

    pub fn submit_draft(&mut self) -> Result<PendingTurn, Rejection> {
        let text = self.draft.clone();
        self.submit(&text)
    }

    /// Records the stylist's reply. Returns `false` if `turn` is not the one
    /// being waited on.
    pub fn on_gateway_success(&mut self, turn: TurnId, reply: Option<String>) -> bool {
        if !self.settle(turn) {
            return false;
        }

        let text = reply
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());
        self.push(ChatMessage::assistant(text));
        true
    }

    /// Records a failed call as the fixed placeholder. No retry.
    pub fn on_gateway_failure(&mut self, turn: TurnId) -> bool {
        if !self.settle(turn) {
            return false;
        }

        self.push(ChatMessage::assistant(GATEWAY_ERROR_PLACEHOLDER));
        true
    }

    /// Feeds a raw gateway outcome into the matching handler
    pub fn resolve(&mut self, turn: TurnId, outcome: Result<Option<String>, GatewayError>) -> bool {
        match outcome {
            Ok(reply) => self.on_gateway_success(turn, reply),
            Err(e) => {
                tracing::warn!(error = %e, "stylist turn failed");
                self.on_gateway_failure(turn)
            }
        }
    }

    /// True once after every transcript change; the view scrolls to the
    /// newest message when it sees it.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    fn settle(&mut self, turn: TurnId) -> bool {
        if self.pending != Some(turn) {
            tracing::debug!(?turn, pending = ?self.pending, "dropping stale stylist reply");
            return false;
        }
        self.pending = None;
        true
    }

    fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
        self.scroll_requested = true;
    }

    // Draft editing

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft.chars().count() {
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft.chars().count();
    }
}
