//! Nickname protection services.
//!
//! [`NickGuard`] is the engine: it classifies inbound [`LinkEvent`]s,
//! tracks sessions on the enforcement clock, escalates repeated abuse to
//! placeholder occupation and answers NickServ commands. Everything it
//! wants done on the network comes back as [`ServiceEffect`]s.

pub mod base;
pub mod deferred;
pub mod dummy;
pub mod effect;
pub mod enforce;
pub mod escalate;
pub mod events;
pub mod guard;
pub mod nickserv;
pub mod protection;
pub mod reservations;
pub mod tracker;

pub use base::{ServiceBase, ServiceResult};
pub use deferred::{Deferred, DeferredQueue, DeferredTask};
pub use dummy::{DummyOccupant, DummyRegistry};
pub use effect::ServiceEffect;
pub use enforce::spawn_enforcement_task;
pub use events::{AccountBinding, LinkEvent, NewSession};
pub use guard::{NickGuard, Phase};
pub use protection::Protection;
pub use reservations::{MAX_RESERVATIONS, ReservationManager, ReserveError};
pub use tracker::{EnforcementEntry, EnforcementTracker};
