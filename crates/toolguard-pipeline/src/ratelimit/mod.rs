//! Rate limiting (per-identifier windows over a TTL counter store) and
//! transient-failure retry policy.

pub mod limiter;
pub mod retry;
pub mod store;

pub use limiter::{counter_key, Admission, RateLimiter, Window};
pub use retry::{backoff_secs, should_retry, RetryPolicy};
pub use store::{
    Clock, CounterStore, InMemoryCounterStore, ManualClock, SystemClock, DEFAULT_PURGE_EVERY,
};
