//! Owner authentication: JWT tokens, dashboard middleware and rate limiting

pub mod rate_limit;
pub mod token;

pub use rate_limit::RateLimiter;
pub use token::{OwnerIdentity, owner_auth_middleware};
