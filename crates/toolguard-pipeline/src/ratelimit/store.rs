//! Counter store capability for the rate limiter.
//!
//! Production deployments back this with a shared TTL cache; the in-memory
//! store here serves single-process use and tests. Time is injected through
//! `Clock` so window expiry can be driven deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use toolguard_core::error::Result;

/// TTL counter store keyed by string.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current count; missing or expired keys read as 0.
    async fn get(&self, key: &str) -> Result<u64>;

    /// Increment and return the new count. The TTL is set only when the
    /// counter is created (expire-on-first-write); later increments in the
    /// same window do not extend it.
    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_ms: AtomicU64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u64,
    expires_at: Instant,
}

/// Writes between inline sweeps of expired counters.
pub const DEFAULT_PURGE_EVERY: u64 = 1024;

/// Process-local TTL counters.
///
/// Expired counters are swept inline from `increment` once every
/// `purge_every` writes, so a long-running process holds at most the live
/// windows plus one interval of dead entries. The sweep runs `retain` and can
/// briefly lock shards.
pub struct InMemoryCounterStore {
    clock: Arc<dyn Clock>,
    counters: DashMap<String, Counter>,
    writes: AtomicU64,
    purge_every: u64,
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            counters: DashMap::new(),
            writes: AtomicU64::new(0),
            purge_every: DEFAULT_PURGE_EVERY,
        }
    }

    /// Sweep interval in writes (min 1).
    pub fn purge_every(mut self, writes: u64) -> Self {
        self.purge_every = writes.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Drop expired counters. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.counters.len();
        self.counters.retain(|_, c| c.expires_at > now);
        let removed = before.saturating_sub(self.counters.len());
        if removed > 0 {
            tracing::debug!(removed, "expired rate-limit counters purged");
        }
        removed
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &str) -> Result<u64> {
        let now = self.clock.now();
        Ok(self
            .counters
            .get(key)
            .filter(|c| c.expires_at > now)
            .map(|c| c.count)
            .unwrap_or(0))
    }

    async fn increment(&self, key: &str, ttl: Duration) -> Result<u64> {
        let now = self.clock.now();
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            count: 0,
            expires_at: now + ttl,
        });
        if entry.expires_at <= now {
            *entry = Counter {
                count: 0,
                expires_at: now + ttl,
            };
        }
        entry.count += 1;
        let count = entry.count;
        // Release the shard lock before `retain` touches it.
        drop(entry);

        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % self.purge_every == 0 {
            self.purge_expired();
        }
        Ok(count)
    }
}
