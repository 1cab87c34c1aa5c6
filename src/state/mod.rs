//! Speech lifecycle state machine
//!
//! Provides the engineer's explicit three-phase lifecycle:
//! - Idle: waiting for a toggle or a typed utterance
//! - Listening: a capture session is running
//! - Speaking: a reply is being rendered

mod machine;

pub use machine::{Engineer, Phase, REPLY_HIDE_DELAY};
