mod checkin_models;
mod clock;
mod metrics;
mod repository;
mod session_store;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose persistence abstractions
pub use checkin_models::{Credential, Event};
pub use repository::{Repository, RepositoryPtr};

// Session lookup and time sources
pub use clock::{Clock, ClockPtr, ManualClock, SystemClock};
pub use session_store::{SessionInfo, SessionStore, SessionStorePtr};
