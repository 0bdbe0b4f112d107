// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod auth;
mod checkin;
mod credentials;
mod events;
mod health;
mod metrics;
mod root;
mod shared_types;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::root_handler;

// Event management
pub use events::create_event;

// Rotating credential handlers
pub use credentials::{get_credential, revoke_credential};

// Check-in verification
pub use checkin::verify_checkin;
