//! Integration test common infrastructure.
//!
//! Provides an in-process engine harness driven by link events and a
//! manual clock, a store that can hold the engine mid-lookup, and a fake
//! TS6 hub for exercising the real uplink.

pub mod gate;
pub mod harness;
pub mod hub;

#[allow(unused_imports)]
pub use harness::{Harness, kills, notices_to};
#[allow(unused_imports)]
pub use hub::FakeHub;
