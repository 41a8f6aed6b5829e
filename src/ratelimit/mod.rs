//! Rate limiting logic and state management.

mod limiter;

pub use limiter::{SlidingWindowLimiter, DEFAULT_QUOTA, DEFAULT_WINDOW};
