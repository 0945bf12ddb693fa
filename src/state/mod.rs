//! In-memory network state tracked by the services node.

pub mod clock;
pub mod session;
pub mod uid;

pub use clock::{Clock, ManualClock, SystemClock};
pub use session::{Session, SessionDirectory};
pub use uid::{Uid, UidGenerator};
