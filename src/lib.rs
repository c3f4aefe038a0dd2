//! chatrelay - anonymous real-time chat relay
//!
//! Every text message a client sends over `/ws` is relayed to all connected
//! clients, together with system notices when someone joins or leaves.

pub mod config;
pub mod error;
pub mod relay;
pub mod server;
