// Middleware module - tracing setup, CORS and rate limiting

pub mod cors;
pub mod observability;
pub mod rate_limit;

pub use cors::create_cors_layer;
pub use observability::init_tracing;
pub use rate_limit::{RateLimiterState, create_rate_limiter, rate_limit_middleware};
