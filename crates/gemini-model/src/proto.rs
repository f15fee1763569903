use geochat_model::{
    GroundingChunk, MapPlace, ModelContent, ModelRequest, ModelResponse,
    RetrievalTool, ReviewSnippet, WebSource,
};
use serde::{Deserialize, Serialize};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
    #[serde(default)]
    pub thought: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<Chunk>,
}

/// A grounding chunk as the server sends it. Exactly one of the fields is
/// expected to be set.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Chunk {
    pub maps: Option<MapsChunk>,
    pub web: Option<WebChunk>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsChunk {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
    pub place_answer_sources: Option<PlaceAnswerSources>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSources {
    #[serde(default)]
    pub review_snippets: Vec<ReviewSnippetChunk>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReviewSnippetChunk {
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Part {
    text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct EmptyObject {}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
enum Tool {
    GoogleSearch(EmptyObject),
    GoogleMaps(EmptyObject),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: LatLng,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    retrieval_config: RetrievalConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
    system_instruction: SystemInstruction,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(req: &ModelRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: req.contents.iter().map(create_content).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
        tool_config: req.location_bias.map(|coords| ToolConfig {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLng {
                    latitude: coords.latitude,
                    longitude: coords.longitude,
                },
            },
        }),
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: req.system_instruction.clone(),
            }],
        },
    }
}

#[inline]
fn create_content(content: &ModelContent) -> Content {
    Content {
        role: content.role.as_str(),
        parts: vec![Part {
            text: content.text.clone(),
        }],
    }
}

#[inline]
fn create_tool(tool: &RetrievalTool) -> Tool {
    match tool {
        RetrievalTool::WebSearch => Tool::GoogleSearch(EmptyObject {}),
        RetrievalTool::MapSearch => Tool::GoogleMaps(EmptyObject {}),
    }
}

/// Converts the server response into the provider-neutral shape.
///
/// Only the first candidate is considered, for both the text and the
/// citations.
pub fn into_model_response(resp: GenerateContentResponse) -> ModelResponse {
    if let Some(reason) = resp
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        warn!("prompt was blocked: {reason}");
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return ModelResponse::default();
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    let grounding_chunks = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(create_grounding_chunk)
        .collect();

    ModelResponse {
        text: if text.is_empty() { None } else { Some(text) },
        grounding_chunks,
    }
}

fn create_grounding_chunk(chunk: Chunk) -> Option<GroundingChunk> {
    if let Some(maps) = chunk.maps {
        let review_snippets = maps
            .place_answer_sources
            .map(|s| s.review_snippets)
            .unwrap_or_default()
            .into_iter()
            .map(|r| ReviewSnippet {
                snippet: r.snippet,
                author: r.author,
            })
            .collect();
        return Some(GroundingChunk::Map(MapPlace {
            uri: maps.uri,
            title: maps.title,
            review_snippets,
        }));
    }
    if let Some(web) = chunk.web {
        return Some(GroundingChunk::Web(WebSource {
            uri: web.uri,
            title: web.title,
        }));
    }
    debug!("dropping grounding chunk of unknown shape");
    None
}
