//! A terminal front-end for GeoChat, a chat assistant grounded in web and
//! map search.
//!
//! The crate includes a CLI tool for using in the terminal. The pieces it
//! is made of (configuration and transcript rendering) are exported so
//! other hosts can reuse them.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod config;
pub mod render;

pub use config::{ConfigError, Settings};

/// Re-exports of [`geochat_core`] crate.
pub mod core {
    pub use geochat_core::*;
}
