//! Postgres-backed stores
//!
//! All shared state lives in the external database; handlers are stateless.
//! Counter mutations are single conditional UPDATE statements so two
//! concurrent requests can never both read a pre-increment value.

mod migrations;
mod profiles;
mod rate_limits;

pub use migrations::run_migrations;
pub use profiles::ProfileStore;
pub use rate_limits::{RateLimitStore, ANALYZE_ENDPOINT, IP_REQUESTS_PER_DAY};
