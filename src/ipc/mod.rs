//! IPC module for UI client communication
//!
//! Carries typed utterances and the listening toggle into the engineer,
//! and pushes its side-effect events out to subscribed clients.

mod protocol;
mod server;

pub use protocol::{EngineerStatus, Notification, Phase, Request, Response};
pub use server::Server;
