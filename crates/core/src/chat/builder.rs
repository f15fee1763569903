use geochat_model::ModelProvider;

use super::Chat;
use crate::conversation::ConversationStore;
use crate::gateway::ModelGateway;
use crate::location::LocationProvider;

/// [`Chat`] builder.
pub struct ChatBuilder {
    pub(crate) gateway: ModelGateway,
    pub(crate) location: Option<LocationProvider>,
}

impl ChatBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            gateway: ModelGateway::new(provider),
            location: None,
        }
    }

    /// Attaches a location acquisition. Without one, requests never carry
    /// a location bias.
    #[inline]
    pub fn with_location(mut self, location: LocationProvider) -> Self {
        self.location = Some(location);
        self
    }

    /// Builds the chat.
    #[inline]
    pub fn build(self) -> Chat {
        let Self { gateway, location } = self;
        Chat {
            store: ConversationStore::new(),
            gateway,
            location,
        }
    }
}
