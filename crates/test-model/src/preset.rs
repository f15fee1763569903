use geochat_model::{ErrorKind, GroundingChunk};
use serde::{Deserialize, Serialize};

/// The preset outcome of one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// The answer text. `None` simulates a response without usable text.
    pub text: Option<String>,
    /// Citations attached to the answer.
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
    /// If set, the request fails with this kind instead of answering.
    #[serde(default)]
    pub failure: Option<ErrorKind>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` answering with the specified text.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            grounding_chunks: vec![],
            failure: None,
        }
    }

    /// Creates a `PresetResponse` that carries no text at all.
    #[inline]
    pub fn without_text() -> Self {
        Self {
            text: None,
            grounding_chunks: vec![],
            failure: None,
        }
    }

    /// Creates a `PresetResponse` that fails with the given kind.
    #[inline]
    pub fn failure(kind: ErrorKind) -> Self {
        Self {
            text: None,
            grounding_chunks: vec![],
            failure: Some(kind),
        }
    }

    /// Attaches citations to the answer.
    #[inline]
    pub fn with_grounding_chunks(
        mut self,
        chunks: impl Into<Vec<GroundingChunk>>,
    ) -> Self {
        self.grounding_chunks = chunks.into();
        self
    }
}
