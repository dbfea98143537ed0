// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod admin_login;
mod admin_session;
mod health;
mod metrics;
mod reviews;
mod root;
mod shared_types;

// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_http_requests};
pub use root::root_handler;

// Admin session handlers
pub use admin_login::admin_login;
pub use admin_session::{admin_logout, admin_me};

// Telegram-authenticated handlers
pub use reviews::submit_review;

pub use shared_types::{ApiError, ErrorBody};
