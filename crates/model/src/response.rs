use crate::GroundingChunk;

/// A complete response from the model provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelResponse {
    /// The answer text, `None` if the provider produced no usable text.
    pub text: Option<String>,
    /// Citations attached to the first candidate, empty when the
    /// provider sent no grounding metadata.
    pub grounding_chunks: Vec<GroundingChunk>,
}
