mod builder;
#[cfg(test)]
mod tests;

use geochat_model::Coordinates;

pub use builder::ChatBuilder;

use crate::conversation::{ConversationStore, Message, SubmitError};
use crate::gateway::ModelGateway;
use crate::location::{LocationProvider, LocationStatus};

/// A chat session: the conversation, the model gateway and the location
/// acquisition wired together.
///
/// Submissions are serialized by the conversation gate. The location is
/// read when a request is built, so an acquisition finishing later does
/// not affect a request already in flight.
#[derive(Debug)]
pub struct Chat {
    store: ConversationStore,
    gateway: ModelGateway,
    location: Option<LocationProvider>,
}

impl Chat {
    /// Submits a user input and waits for the model message.
    ///
    /// Empty input and submissions while a response is pending are
    /// rejected before anything changes. Otherwise the user message is
    /// appended, the model is asked, and exactly one model message is
    /// appended whether the request succeeds or not.
    pub async fn submit(
        &mut self,
        input: &str,
    ) -> Result<&Message, SubmitError> {
        let turn = self.store.begin_turn(input)?;
        let location = self.coordinates();

        let guard = TurnGuard {
            store: &mut self.store,
            armed: true,
        };
        let result = self
            .gateway
            .converse(turn.history(), turn.text(), location)
            .await;
        guard.disarm();

        if let Err(err) = &result {
            error!("turn failed: {err}");
        }

        Ok(self.store.complete_turn(turn, result))
    }

    /// Returns all messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// Returns whether a response is being awaited.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Returns the status of the location acquisition.
    pub fn location_status(&self) -> LocationStatus {
        match &self.location {
            Some(location) => location.status(),
            None => LocationStatus::Unavailable(
                crate::location::LocationError::Unsupported,
            ),
        }
    }

    #[inline]
    fn coordinates(&self) -> Option<Coordinates> {
        self.location.as_ref().and_then(LocationProvider::coordinates)
    }
}

/// Fails the pending turn if `submit` is dropped while awaiting, so the
/// gate does not stay closed.
struct TurnGuard<'a> {
    store: &'a mut ConversationStore,
    armed: bool,
}

impl TurnGuard<'_> {
    #[inline]
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("turn cancelled before the response arrived");
            self.store.abandon_turn();
        }
    }
}
