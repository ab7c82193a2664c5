//! Deferred work replay on background sync.

use birdie_core::Error;

/// Replays mutations queued while offline.
///
/// An implementation drains a durable FIFO of pending requests, replaying
/// each in order. On the first failure it stops and keeps that item and
/// everything after it for the next sync. Replaying an item twice must be
/// harmless.
#[async_trait::async_trait]
pub trait ReplayHook: Send + Sync {
    async fn replay(&self) -> Result<(), Error>;
}

/// Hook for deployments that queue nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReplay;

#[async_trait::async_trait]
impl ReplayHook for NoopReplay {
    async fn replay(&self) -> Result<(), Error> {
        tracing::debug!("background sync: nothing queued");
        Ok(())
    }
}

/// Result of a sync event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Replayed,
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_replay() {
        assert!(NoopReplay.replay().await.is_ok());
    }
}
