//! Core logic of the chat: the conversation store, location acquisition,
//! and the round-trip to the grounded model.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod chat;
pub mod conversation;
pub mod gateway;
pub mod location;

pub use chat::{Chat, ChatBuilder};
pub use conversation::{ConversationStore, Message, SubmitError};
pub use gateway::{ModelGateway, Reply};
pub use location::{LocationProvider, LocationStatus};
