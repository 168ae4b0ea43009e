//! Per-client admission control (token bucket).
//!
//! Every client identity owns a bucket holding up to `burst` tokens that
//! refills continuously at `sustained_rate` tokens per second. Refill is
//! computed lazily on each check, so there is no per-client timer. A single
//! reaper task evicts buckets that have been idle past a threshold.
//!
//! Buckets live in a sharded [`DashMap`]: lookup-or-create, refill-and-deduct
//! and eviction of one identity all happen under that identity's shard lock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::AdmissionConfig;
use crate::observability::metrics;

/// Token bucket state for one client identity.
#[derive(Debug, Clone)]
pub struct ClientBucket {
    tokens: f64,
    last_refill_at: Instant,
    last_seen_at: Instant,
}

impl ClientBucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill_at: now,
            last_seen_at: now,
        }
    }

    fn try_acquire(&mut self, now: Instant, capacity: f64, refill_rate: f64) -> bool {
        // A caller may have sampled `now` before another caller for the same
        // identity took the lock; never move the refill clock backwards.
        let elapsed = now.saturating_duration_since(self.last_refill_at).as_secs_f64();

        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_refill_at = self.last_refill_at.max(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            self.last_seen_at = self.last_seen_at.max(now);
            true
        } else {
            false
        }
    }
}

/// Registry of per-identity token buckets.
///
/// Constructed by whoever wires the gateway together and shared via `Arc`.
#[derive(Debug)]
pub struct AdmissionController {
    buckets: DashMap<String, ClientBucket>,
    capacity: f64,
    refill_rate: f64,
    reap_interval: Duration,
    idle_timeout: Duration,
}

impl AdmissionController {
    pub fn new(burst: u32, sustained_rate: f64, reap_interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity: f64::from(burst),
            refill_rate: sustained_rate,
            reap_interval,
            idle_timeout,
        }
    }

    pub fn from_config(config: &AdmissionConfig) -> Self {
        Self::new(
            config.burst,
            config.sustained_rate,
            Duration::from_secs(config.reap_interval_secs),
            Duration::from_secs(config.idle_timeout_secs),
        )
    }

    /// Check and record one request from `identity`.
    pub fn allow(&self, identity: &str) -> bool {
        self.allow_at(identity, Instant::now())
    }

    /// [`allow`](Self::allow) evaluated at an explicit instant.
    pub fn allow_at(&self, identity: &str, now: Instant) -> bool {
        if let Some(mut bucket) = self.buckets.get_mut(identity) {
            return bucket.try_acquire(now, self.capacity, self.refill_rate);
        }

        let mut bucket = self
            .buckets
            .entry(identity.to_owned())
            .or_insert_with(|| ClientBucket::full(self.capacity, now));
        bucket.try_acquire(now, self.capacity, self.refill_rate)
    }

    /// Evict buckets idle for longer than the idle timeout. Returns how many were removed.
    pub fn reap(&self) -> usize {
        self.reap_at(Instant::now())
    }

    /// [`reap`](Self::reap) evaluated at an explicit instant.
    pub fn reap_at(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_seen_at) <= self.idle_timeout);
        let removed = before.saturating_sub(self.buckets.len());

        metrics::record_tracked_clients(self.buckets.len());
        if removed > 0 {
            metrics::record_reaped_clients(removed);
            tracing::debug!(removed, remaining = self.buckets.len(), "Reaped idle client buckets");
        }
        removed
    }

    /// Spawn the background reaper loop. It exits when `shutdown` fires.
    pub fn spawn_reaper(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                interval_secs = self.reap_interval.as_secs(),
                idle_timeout_secs = self.idle_timeout.as_secs(),
                "Admission reaper starting"
            );

            let mut ticker = time::interval(self.reap_interval);
            // The first tick completes immediately; nothing can be idle yet.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.reap();
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Admission reaper received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        })
    }

    /// Number of identities currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}
