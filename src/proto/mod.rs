//! Minimal IRC protocol helpers.
//!
//! The uplink speaks a small TS6 subset, so this module only carries what
//! the engine and the link need: RFC 1459 casemapping, nickname syntax and
//! raw line splitting.

pub mod casemap;
pub mod line;
pub mod nick;

pub use casemap::{irc_eq, irc_to_lower};
pub use line::Line;
pub use nick::NickExt;
