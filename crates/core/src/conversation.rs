//! Conversation-related types.

use std::fmt::{self, Display};

use geochat_model::{GroundingChunk, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::Reply;

/// Identifier of the seeded greeting message.
pub const GREETING_ID: &str = "welcome";

/// Text of the seeded greeting message.
pub const GREETING_TEXT: &str = "Hi! I'm GeoChat. I can help you find places, \
    get directions, and explore the world using real-time Google Maps data. \
    Where are we heading today?";

/// Text of the model message appended when a turn fails.
pub const ERROR_REPLY_TEXT: &str = "I'm sorry, I encountered an error while \
    checking the map. Please try again.";

/// A message in the conversation.
///
/// Messages are immutable once created. The only way to obtain a message
/// with citations is [`Message::with_grounding_chunks`], which never keeps
/// an empty citation list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: String,
    role: Role,
    text: String,
    timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

impl Message {
    /// Creates a message with a fresh identifier and the current time.
    pub fn new<S: Into<String>>(role: Role, text: S) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), role, text, now_millis())
    }

    /// Creates a message with every field given explicitly.
    pub fn with_id<ID: Into<String>, S: Into<String>>(
        id: ID,
        role: Role,
        text: S,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            timestamp,
            grounding_chunks: None,
        }
    }

    /// Attaches citations. An empty list leaves the message without
    /// citations.
    pub fn with_grounding_chunks(
        mut self,
        chunks: Vec<GroundingChunk>,
    ) -> Self {
        self.grounding_chunks =
            if chunks.is_empty() { None } else { Some(chunks) };
        self
    }

    /// Returns the identifier of this message.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns who wrote this message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the message text, possibly markdown-formatted.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the creation time in epoch milliseconds.
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the citations of this message, never an empty slice.
    #[inline]
    pub fn grounding_chunks(&self) -> Option<&[GroundingChunk]> {
        self.grounding_chunks.as_deref()
    }
}

/// The submission gate of a conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Ready to accept a submission.
    #[default]
    Idle,
    /// A request is in flight, submissions are rejected.
    AwaitingResponse,
}

/// Why a submission was rejected. Rejected submissions leave the
/// conversation untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmitError {
    /// The input is empty or whitespace only.
    EmptyInput,
    /// Another submission is still awaiting its response.
    Busy,
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::EmptyInput => write!(f, "input is empty"),
            SubmitError::Busy => write!(f, "a response is still pending"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Returned by [`ConversationStore::append`] for a message whose
/// identifier is already taken.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DuplicateIdError(pub String);

impl Display for DuplicateIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message id `{}` already exists", self.0)
    }
}

impl std::error::Error for DuplicateIdError {}

/// A submission that has been accepted and is awaiting its response.
///
/// Obtained from [`ConversationStore::begin_turn`] and consumed by
/// [`ConversationStore::complete_turn`]. The store stays in
/// [`Stage::AwaitingResponse`] until then.
#[must_use = "the conversation stays busy until the turn is completed"]
#[derive(Debug)]
pub struct PendingTurn {
    history: Vec<Message>,
    text: String,
}

impl PendingTurn {
    /// Messages that preceded this submission.
    #[inline]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The trimmed user input.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Owns the ordered message sequence and the submission gate.
///
/// The store is single-writer: every mutation goes through `&mut self`,
/// and the gate turns a second submission into a synchronous
/// [`SubmitError::Busy`] instead of a racing request.
#[derive(Clone, Debug)]
pub struct ConversationStore {
    messages: Vec<Message>,
    stage: Stage,
}

impl ConversationStore {
    /// Creates a store seeded with the greeting message.
    pub fn new() -> Self {
        let greeting = Message::with_id(
            GREETING_ID,
            Role::Model,
            GREETING_TEXT,
            now_millis(),
        );
        Self {
            messages: vec![greeting],
            stage: Stage::Idle,
        }
    }

    /// Returns all messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the current stage of the gate.
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns whether a response is being awaited.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.stage == Stage::AwaitingResponse
    }

    /// Toggles the gate directly.
    #[inline]
    pub fn set_loading(&mut self, loading: bool) {
        self.stage = if loading {
            Stage::AwaitingResponse
        } else {
            Stage::Idle
        };
    }

    /// Appends a message to the end of the conversation and returns the
    /// updated sequence.
    pub fn append(
        &mut self,
        message: Message,
    ) -> Result<&[Message], DuplicateIdError> {
        if self.messages.iter().any(|m| m.id == message.id) {
            return Err(DuplicateIdError(message.id));
        }
        self.push(message);
        Ok(&self.messages)
    }

    /// Accepts a submission: appends the user message and closes the gate.
    ///
    /// Empty input is checked first, then the gate. Either rejection
    /// leaves the store unchanged.
    pub fn begin_turn(
        &mut self,
        input: &str,
    ) -> Result<PendingTurn, SubmitError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if self.stage != Stage::Idle {
            return Err(SubmitError::Busy);
        }

        let history = self.messages.clone();
        self.push(Message::new(Role::User, text));
        self.stage = Stage::AwaitingResponse;

        Ok(PendingTurn {
            history,
            text: text.to_owned(),
        })
    }

    /// Finishes a turn: appends the model message for `result` and opens
    /// the gate again.
    ///
    /// A failed turn still produces exactly one model message, carrying
    /// [`ERROR_REPLY_TEXT`].
    pub fn complete_turn<E>(
        &mut self,
        turn: PendingTurn,
        result: Result<Reply, E>,
    ) -> &Message {
        drop(turn);
        let message = match result {
            Ok(reply) => Message::new(Role::Model, reply.text)
                .with_grounding_chunks(reply.grounding_chunks),
            Err(_) => Message::new(Role::Model, ERROR_REPLY_TEXT),
        };
        self.finish_turn(message)
    }

    /// Fails the in-flight turn without its token, for a submission that
    /// was dropped before its response arrived. Does nothing when idle.
    pub(crate) fn abandon_turn(&mut self) {
        if self.stage == Stage::AwaitingResponse {
            self.finish_turn(Message::new(Role::Model, ERROR_REPLY_TEXT));
        }
    }

    fn finish_turn(&mut self, message: Message) -> &Message {
        self.push(message);
        self.stage = Stage::Idle;
        &self.messages[self.messages.len() - 1]
    }

    fn push(&mut self, mut message: Message) {
        // Keep timestamps non-decreasing even if the clock steps back.
        if let Some(last) = self.messages.last() {
            message.timestamp = message.timestamp.max(last.timestamp);
        }
        self.messages.push(message);
    }
}

impl Default for ConversationStore {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use geochat_model::{GroundingChunk, MapPlace};
    use serde_json::json;

    use super::*;

    fn reply(text: &str, chunks: Vec<GroundingChunk>) -> Result<Reply, ()> {
        Ok(Reply {
            text: text.to_owned(),
            grounding_chunks: chunks,
        })
    }

    #[test]
    fn test_seeded_greeting() {
        let store = ConversationStore::new();
        assert_eq!(store.messages().len(), 1);
        let greeting = &store.messages()[0];
        assert_eq!(greeting.id(), GREETING_ID);
        assert_eq!(greeting.role(), Role::Model);
        assert!(greeting.timestamp() > 0);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_turn_appends_two_messages() {
        let mut store = ConversationStore::new();
        let turn = store.begin_turn("  Find coffee shops nearby \n").unwrap();
        assert_eq!(turn.text(), "Find coffee shops nearby");
        assert_eq!(turn.history().len(), 1);
        assert_eq!(store.messages().len(), 2);
        assert_eq!(store.messages()[1].role(), Role::User);
        assert_eq!(store.messages()[1].text(), "Find coffee shops nearby");
        assert!(store.is_loading());

        let msg = store.complete_turn(turn, reply("Here you go.", vec![]));
        assert_eq!(msg.role(), Role::Model);
        assert_eq!(msg.text(), "Here you go.");
        assert_eq!(msg.grounding_chunks(), None);
        assert_eq!(store.messages().len(), 3);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_empty_input_is_noop() {
        let mut store = ConversationStore::new();
        for input in ["", "   ", "\n\t "] {
            assert_eq!(
                store.begin_turn(input).unwrap_err(),
                SubmitError::EmptyInput
            );
        }
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.stage(), Stage::Idle);
    }

    #[test]
    fn test_busy_rejects_submission() {
        let mut store = ConversationStore::new();
        let turn = store.begin_turn("Hi").unwrap();
        assert_eq!(store.begin_turn("Hello?").unwrap_err(), SubmitError::Busy);
        assert_eq!(store.messages().len(), 2);
        assert!(store.is_loading());

        store.complete_turn(turn, reply("Hello!", vec![]));
        assert!(store.begin_turn("Again").is_ok());
    }

    #[test]
    fn test_failed_turn() {
        let mut store = ConversationStore::new();
        let turn = store.begin_turn("Hi").unwrap();
        let msg =
            store.complete_turn(turn, Err::<Reply, _>("connection reset"));
        assert_eq!(msg.text(), ERROR_REPLY_TEXT);
        assert_eq!(msg.role(), Role::Model);
        assert_eq!(store.messages().len(), 3);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_abandoned_turn() {
        let mut store = ConversationStore::new();
        store.abandon_turn();
        assert_eq!(store.messages().len(), 1);

        let turn = store.begin_turn("Hi").unwrap();
        store.abandon_turn();
        drop(turn);
        assert_eq!(store.messages().len(), 3);
        assert_eq!(store.messages()[2].text(), ERROR_REPLY_TEXT);
        assert!(!store.is_loading());
        assert!(store.begin_turn("Again").is_ok());
    }

    #[test]
    fn test_citations() {
        let mut store = ConversationStore::new();
        let turn = store.begin_turn("Coffee?").unwrap();
        let chunk = GroundingChunk::Map(MapPlace {
            uri: "https://maps.google.com/?cid=1".to_owned(),
            title: "Sightglass".to_owned(),
            review_snippets: vec![],
        });
        let msg =
            store.complete_turn(turn, reply("Try this.", vec![chunk.clone()]));
        assert_eq!(msg.grounding_chunks(), Some(&[chunk][..]));
    }

    #[test]
    fn test_append() {
        let mut store = ConversationStore::new();
        let last_ts = store.messages()[0].timestamp();
        let messages = store
            .append(Message::with_id("m1", Role::User, "Hi", last_ts - 1000))
            .unwrap();
        assert_eq!(messages.len(), 2);
        // The clock went backwards, the timestamp is clamped.
        assert_eq!(messages[1].timestamp(), last_ts);

        let err = store
            .append(Message::with_id("m1", Role::Model, "Dup", last_ts))
            .unwrap_err();
        assert_eq!(err, DuplicateIdError("m1".to_owned()));
        assert_eq!(store.messages().len(), 2);
    }

    #[test]
    fn test_unique_ids() {
        let mut store = ConversationStore::new();
        for i in 0..5 {
            let turn = store.begin_turn(&format!("Question {i}")).unwrap();
            store.complete_turn(turn, reply("Answer", vec![]));
        }
        let mut ids: Vec<_> =
            store.messages().iter().map(Message::id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn test_set_loading() {
        let mut store = ConversationStore::new();
        store.set_loading(true);
        assert_eq!(store.begin_turn("Hi").unwrap_err(), SubmitError::Busy);
        store.set_loading(false);
        assert!(store.begin_turn("Hi").is_ok());
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::with_id("m1", Role::User, "Hi", 1_700_000_000_000);
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "id": "m1",
                "role": "user",
                "text": "Hi",
                "timestamp": 1_700_000_000_000_i64
            })
        );
    }
}
