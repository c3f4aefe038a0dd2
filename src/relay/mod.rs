//! Relay core: the connection registry and the broadcast engine.
//!
//! The transport hands each accepted connection to [`Broadcaster::connect`],
//! feeds decoded frames to [`Broadcaster::relay`], and calls
//! [`Broadcaster::disconnect`] once when the session ends.

pub mod engine;
pub mod message;
pub mod registry;

pub use engine::*;
pub use message::*;
pub use registry::*;
