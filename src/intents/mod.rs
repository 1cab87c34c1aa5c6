//! Intent table and reply production for the Pit Wall engineer
//!
//! An utterance is normalized, then run down a fixed, ordered rule table
//! with first-match-wins substring matching. Rule order is a behavioral
//! contract (literal radio phrases outrank broader categories), so the
//! table is data, not scattered conditionals.

mod reply;
mod table;

pub use reply::{
    capture_unavailable_reply, fallback_reply, respond, Highlight, Reply, DIDNT_CATCH_REPLY,
    PERMISSION_DENIED_REPLY,
};
pub use table::{match_intent, Intent};

use rand::Rng;

/// Lower-case and trim raw input into an utterance ready for matching
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Injectable uniform random source for templated replies
///
/// Kept behind a trait so tests can pin exact boundary values instead of
/// sampling.
pub trait RandomSource: Send {
    /// Uniform value in [0, 1)
    fn unit(&mut self) -> f64;
}

/// Production random source backed by the thread-local generator
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}
