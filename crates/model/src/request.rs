use serde::{Deserialize, Serialize};

use crate::Coordinates;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
    /// The conversation turns, oldest first. The last one is the new
    /// user input.
    pub contents: Vec<ModelContent>,
    /// Retrieval tools that are enabled for the model.
    pub tools: Vec<RetrievalTool>,
    /// Position to bias place lookups towards, if known.
    pub location_bias: Option<Coordinates>,
    /// The system instructions.
    pub system_instruction: String,
}

/// The author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation.
    User,
    /// The model side of the conversation.
    Model,
}

impl Role {
    /// Returns the wire name of the role.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A single text turn in the request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelContent {
    /// Who produced the turn.
    pub role: Role,
    /// The turn text.
    pub text: String,
}

impl ModelContent {
    /// Creates a user turn.
    #[inline]
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Creates a model turn.
    #[inline]
    pub fn model<S: Into<String>>(text: S) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Server-side retrieval tools the model may consult.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RetrievalTool {
    /// General web search.
    WebSearch,
    /// Place and map search.
    MapSearch,
}
