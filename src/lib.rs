//! slirc-nickguard - nickname protection services for TS6 IRC networks.
//!
//! - [`services`]: the protection engine and NickServ commands
//! - [`link`]: the uplink connection and TS6 codec
//! - [`db`]: SQLite persistence for accounts, reservations and abuse counters
//! - [`state`]: session directory, clocks and UID generation
//! - [`config`]: TOML configuration
//! - [`proto`]: casemapping, nickname syntax and line splitting

pub mod config;
pub mod db;
pub mod error;
pub mod link;
pub mod proto;
pub mod services;
pub mod state;
