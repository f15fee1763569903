use serde::{Deserialize, Serialize};

/// A citation the model grounded its answer on.
///
/// The variant is decided once, when the provider decodes its response,
/// so consumers never need to inspect fields to tell the variants apart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroundingChunk {
    /// A place returned by map search.
    Map(MapPlace),
    /// A page returned by web search.
    Web(WebSource),
}

impl GroundingChunk {
    /// Returns the link target of this citation.
    #[inline]
    pub fn uri(&self) -> &str {
        match self {
            GroundingChunk::Map(place) => &place.uri,
            GroundingChunk::Web(source) => &source.uri,
        }
    }

    /// Returns the display title of this citation.
    #[inline]
    pub fn title(&self) -> &str {
        match self {
            GroundingChunk::Map(place) => &place.title,
            GroundingChunk::Web(source) => &source.title,
        }
    }
}

/// A place result from map search.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapPlace {
    /// Link to the place on the map service.
    pub uri: String,
    /// Name of the place.
    pub title: String,
    /// Review excerpts about the place, may be empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_snippets: Vec<ReviewSnippet>,
}

/// An excerpt of a user review.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewSnippet {
    /// The quoted review text.
    pub snippet: String,
    /// Who wrote the review.
    pub author: String,
}

/// A page result from web search.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebSource {
    /// Link to the page.
    pub uri: String,
    /// Title of the page.
    pub title: String,
}
