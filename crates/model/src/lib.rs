//! An abstraction layer between the chat core and grounded LLM APIs.
//!
//! This crate establishes the protocol the chat core uses to talk to a
//! hosted model that can ground its answers in web and map search
//! results. The core builds a [`ModelRequest`], a [`ModelProvider`] sends
//! it to the remote service, and the answer comes back as a
//! [`ModelResponse`] carrying the text plus any [`GroundingChunk`]s.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. Wire formats of
//! concrete services belong to their own provider crates.

#![deny(missing_docs)]

mod coordinates;
mod error;
mod grounding;
mod provider;
mod request;
mod response;

pub use coordinates::*;
pub use error::*;
pub use grounding::*;
pub use provider::*;
pub use request::*;
pub use response::*;
