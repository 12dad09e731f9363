use crate::core::{Pipeline, Result, SyncReport};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Drives a pipeline either once or on a fixed interval. Cycle errors in the
/// interval loop are logged and the loop keeps going; the next tick gets a
/// fresh chance.
pub struct SyncEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SyncEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run_once(&self) -> Result<SyncReport> {
        tracing::debug!("Starting sync cycle");
        let report = self.pipeline.run_once().await?;

        if report == SyncReport::default() {
            tracing::debug!("Sync cycle complete, no changes");
        } else {
            tracing::info!(
                "Sync cycle complete: {} posted, {} edited, {} deleted",
                report.posted,
                report.edited,
                report.deleted
            );
        }

        Ok(report)
    }

    pub async fn run(&self, interval: Duration) -> Result<()> {
        tracing::info!("Syncing every {} seconds", interval.as_secs());

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                tracing::warn!("Sync cycle failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::BotError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Pipeline for CountingPipeline {
        async fn run_once(&self) -> Result<SyncReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BotError::StreamsApiError { status: 500 });
            }
            Ok(SyncReport {
                posted: 1,
                edited: 0,
                deleted: 0,
            })
        }
    }

    #[tokio::test]
    async fn test_run_once_reports_pipeline_result() {
        let engine = SyncEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail: false,
        });

        let report = engine.run_once().await.unwrap();
        assert_eq!(report.posted, 1);
    }

    #[tokio::test]
    async fn test_run_once_propagates_errors() {
        let engine = SyncEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail: true,
        });

        assert!(engine.run_once().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_cycle_failures() {
        let engine = SyncEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail: true,
        });

        let run = engine.run(Duration::from_secs(60));
        tokio::pin!(run);

        // Three ticks: the immediate one plus two intervals. The loop must
        // still be alive after repeated failures.
        let _ = tokio::time::timeout(Duration::from_secs(125), &mut run).await;
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }
}
