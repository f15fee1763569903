//! The round-trip to the remote model.

use std::fmt::{self, Display};
use std::pin::Pin;
use std::sync::Arc;

use geochat_model::{
    Coordinates, ErrorKind, GroundingChunk, ModelContent, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, RetrievalTool,
};
use tracing::Instrument;

use crate::conversation::Message;

/// System instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are GeoChat, a helpful and \
friendly AI assistant.
You specialize in helping users find places, understand local geography, \
and get real-time information.
ALWAYS use the available tools (Google Maps and Google Search) to provide \
accurate, up-to-date answers.
If a user asks about \"nearby\" places, rely on the provided location data.
Format your response clearly.";

/// Text used when the model answers without any usable text.
pub const FALLBACK_TEXT: &str =
    "I found some information but couldn't generate a text summary.";

type SendRequestResult = Result<ModelResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// The normalized answer of one round-trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// The display text, never empty.
    pub text: String,
    /// Citations from the first candidate, possibly empty.
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// A failed round-trip. No partial result survives a failure.
#[derive(Debug)]
pub enum GatewayError {
    /// The new input is empty after trimming, nothing was sent.
    EmptyInput,
    /// The provider failed.
    Provider(Box<dyn ModelProviderError>),
}

impl GatewayError {
    /// Returns the provider error kind, if the provider failed.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            GatewayError::EmptyInput => None,
            GatewayError::Provider(err) => Some(err.kind()),
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::EmptyInput => write!(f, "input is empty"),
            GatewayError::Provider(err) => {
                write!(f, "model request failed: {err}")
            }
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::EmptyInput => None,
            GatewayError::Provider(err) => Some(err.as_ref()),
        }
    }
}

/// Builds and sends requests to a model provider, and normalizes the
/// answers.
///
/// The gateway keeps nothing between calls: each call carries the whole
/// history it needs and issues exactly one upstream request.
#[derive(Clone)]
pub struct ModelGateway {
    handler_fn: HandlerFn,
}

impl ModelGateway {
    /// Creates a gateway sending requests through `provider`.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelGateway` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    fut.await.map_err(|err| {
                        error!("got an error: {err:?}");
                        Box::new(err) as Box<dyn ModelProviderError>
                    })
                }
                .instrument(trace_span!("model gateway req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends `new_text` after `history` and returns the normalized reply.
    ///
    /// `location`, when present, biases place lookups towards it. When
    /// absent the request carries no location at all.
    pub async fn converse(
        &self,
        history: &[Message],
        new_text: &str,
        location: Option<Coordinates>,
    ) -> Result<Reply, GatewayError> {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(GatewayError::EmptyInput);
        }

        let req = build_request(history, new_text, location);
        let resp = (self.handler_fn)(req)
            .await
            .map_err(GatewayError::Provider)?;

        trace!("finished a request");
        Ok(normalize_response(resp))
    }
}

impl fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelGateway").finish_non_exhaustive()
    }
}

/// Builds the request for one round-trip.
///
/// Every history message becomes one content entry in the same order,
/// followed by `new_text` as a user entry. Both retrieval tools are always
/// enabled.
pub fn build_request(
    history: &[Message],
    new_text: &str,
    location: Option<Coordinates>,
) -> ModelRequest {
    let contents = history
        .iter()
        .map(|msg| ModelContent {
            role: msg.role(),
            text: msg.text().to_owned(),
        })
        .chain([ModelContent::user(new_text)])
        .collect();

    ModelRequest {
        contents,
        tools: vec![RetrievalTool::WebSearch, RetrievalTool::MapSearch],
        location_bias: location,
        system_instruction: SYSTEM_INSTRUCTION.to_owned(),
    }
}

fn normalize_response(resp: ModelResponse) -> Reply {
    let text = resp
        .text
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_TEXT.to_owned());
    Reply {
        text,
        grounding_chunks: resp.grounding_chunks,
    }
}
