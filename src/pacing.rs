//! Request pacing policies.
//!
//! Sources with a rate limit pause before each request of a sequential loop.
//! The policy is injected so tests can run without delays.

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Pause applied before each paced request.
#[async_trait]
pub trait PacingPolicy: Send + Sync + Debug {
    async fn pause(&self);
}

/// Sleep for a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    /// Delay between per-console calls to the central tracker.
    pub const CENTRAL_TRACKER: FixedDelay = FixedDelay(Duration::from_secs(3));

    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }
}

#[async_trait]
impl PacingPolicy for FixedDelay {
    async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}

/// No pacing at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl PacingPolicy for NoDelay {
    async fn pause(&self) {}
}
