use std::time::Duration;

use geochat_model::{
    Coordinates, ErrorKind, GroundingChunk, MapPlace, ReviewSnippet, Role,
};
use geochat_test_model::{PresetResponse, TestModelProvider};
use tokio::time::timeout;

use crate::conversation::{ERROR_REPLY_TEXT, SubmitError};
use crate::location::{
    FixedLocation, LocationError, LocationProvider, LocationSource,
    LocationStatus,
};
use crate::ChatBuilder;

struct DeniedLocation;

impl LocationSource for DeniedLocation {
    fn locate(
        self,
    ) -> impl Future<Output = Result<Coordinates, LocationError>> + Send + 'static
    {
        std::future::ready(Err(LocationError::PermissionDenied))
    }
}

fn cafe() -> GroundingChunk {
    GroundingChunk::Map(MapPlace {
        uri: "https://maps.google.com/?cid=3".to_owned(),
        title: "Four Barrel Coffee".to_owned(),
        review_snippets: vec![ReviewSnippet {
            snippet: "Strong espresso.".to_owned(),
            author: "Kim".to_owned(),
        }],
    })
}

#[tokio::test]
async fn test_coffee_nearby() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(
        PresetResponse::with_text("Here are three cafes...")
            .with_grounding_chunks([cafe()]),
    );
    let observer = model_provider.clone();

    let coords = Coordinates::new(37.77, -122.41);
    let location = LocationProvider::spawn(FixedLocation(coords));
    location.wait_settled().await;

    let mut chat = ChatBuilder::with_model_provider(model_provider)
        .with_location(location)
        .build();
    let msg = chat.submit("Find coffee shops nearby").await.unwrap();
    assert_eq!(msg.role(), Role::Model);
    assert_eq!(msg.text(), "Here are three cafes...");
    let chunks = msg.grounding_chunks().unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(matches!(chunks[0], GroundingChunk::Map(_)));

    let requests = observer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].location_bias, Some(coords));
    // The greeting precedes the new user turn.
    assert_eq!(requests[0].contents.len(), 2);
    assert_eq!(requests[0].contents[1].text, "Find coffee shops nearby");
    assert_eq!(requests[0].contents[1].role, Role::User);
}

#[tokio::test]
async fn test_each_submission_adds_two_messages() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_text("Hello!"));
    model_provider.add_response(PresetResponse::failure(ErrorKind::Transport));
    model_provider.add_response(PresetResponse::without_text());
    let observer = model_provider.clone();

    let mut chat = ChatBuilder::with_model_provider(model_provider).build();
    assert_eq!(chat.messages().len(), 1);

    for (i, input) in ["Hi", "pizza near me", "and tacos?"].iter().enumerate() {
        chat.submit(input).await.unwrap();
        assert_eq!(chat.messages().len(), 1 + 2 * (i + 1));
        assert!(!chat.is_loading());
    }

    // Every request carries the whole history so far.
    let requests = observer.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].contents.len(), 2);
    assert_eq!(requests[1].contents.len(), 4);
    assert_eq!(requests[2].contents.len(), 6);
    assert!(requests.iter().all(|r| r.location_bias.is_none()));
}

#[tokio::test]
async fn test_transport_error() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::failure(ErrorKind::Transport));

    let mut chat = ChatBuilder::with_model_provider(model_provider).build();
    let msg = chat.submit("Where is the Ferry Building?").await.unwrap();
    assert_eq!(msg.role(), Role::Model);
    assert_eq!(msg.text(), ERROR_REPLY_TEXT);
    assert_eq!(msg.grounding_chunks(), None);
    assert_eq!(chat.messages().len(), 3);
    assert!(!chat.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_submission() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_text("Too late."));
    model_provider.add_response(PresetResponse::with_text("Right here."));
    model_provider.set_delay(Duration::from_secs(10));
    let observer = model_provider.clone();

    let mut chat = ChatBuilder::with_model_provider(model_provider).build();
    let result = timeout(Duration::from_secs(1), chat.submit("Hi")).await;
    assert!(result.is_err());

    let messages = chat.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role(), Role::User);
    assert_eq!(messages[2].role(), Role::Model);
    assert_eq!(messages[2].text(), ERROR_REPLY_TEXT);
    assert!(!chat.is_loading());

    let msg = chat.submit("Still there?").await.unwrap();
    assert_eq!(msg.text(), "Right here.");
    assert_eq!(chat.messages().len(), 5);
    assert_eq!(observer.request_count(), 2);
}

#[tokio::test]
async fn test_no_grounding_metadata() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_text("It's sunny."));

    let mut chat = ChatBuilder::with_model_provider(model_provider).build();
    let msg = chat.submit("Weather?").await.unwrap();
    assert_eq!(msg.grounding_chunks(), None);
}

#[tokio::test]
async fn test_empty_input_is_noop() {
    let model_provider = TestModelProvider::default();
    let observer = model_provider.clone();

    let mut chat = ChatBuilder::with_model_provider(model_provider).build();
    let err = chat.submit("   ").await.unwrap_err();
    assert_eq!(err, SubmitError::EmptyInput);
    assert_eq!(chat.messages().len(), 1);
    assert!(!chat.is_loading());
    assert_eq!(observer.request_count(), 0);
}

#[tokio::test]
async fn test_permission_denied() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_text("Hello!"));
    model_provider.add_response(PresetResponse::with_text("Try Tony's."));
    let observer = model_provider.clone();

    let location = LocationProvider::spawn(DeniedLocation);
    location.wait_settled().await;

    let mut chat = ChatBuilder::with_model_provider(model_provider)
        .with_location(location)
        .build();
    assert_eq!(
        chat.location_status(),
        LocationStatus::Unavailable(LocationError::PermissionDenied)
    );

    chat.submit("Hi").await.unwrap();
    chat.submit("pizza near me").await.unwrap();

    let requests = observer.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.location_bias.is_none()));
    assert_eq!(
        chat.location_status(),
        LocationStatus::Unavailable(LocationError::PermissionDenied)
    );
}

#[tokio::test]
async fn test_without_location_provider() {
    let model_provider = TestModelProvider::default();
    let chat = ChatBuilder::with_model_provider(model_provider).build();
    assert_eq!(chat.location_status().indicator(), "No GPS");
}
