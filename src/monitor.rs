//! Background water-quality monitor.
//!
//! Polls the newest reading on a fixed period, evaluates it, and publishes a
//! [`QualitySnapshot`] on a `watch` channel that handlers read from. The task
//! starts with the service and is cancelled on shutdown.
//!
//! A fetch is awaited inside the loop and missed ticks are skipped, so there
//! is never more than one fetch in flight.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::evaluator::{self, EvaluationResult};
use crate::{db, WaterReading};

// ---

/// Where the monitor gets its readings from.
pub trait ReadingSource: Send + Sync + 'static {
    /// The newest reading, or `None` when nothing has been recorded yet.
    fn latest(&self) -> impl Future<Output = anyhow::Result<Option<WaterReading>>> + Send;
}

impl ReadingSource for PgPool {
    async fn latest(&self) -> anyhow::Result<Option<WaterReading>> {
        Ok(db::latest_reading(self).await?)
    }
}

/// Result of one monitor tick.
#[derive(Debug, Clone, Serialize)]
pub struct QualitySnapshot {
    // ---
    pub reading: Option<WaterReading>,
    pub evaluation: EvaluationResult,
    /// Measured values differ from the previous snapshot's reading.
    pub changed: bool,
    pub checked_at: DateTime<Utc>,
}

impl QualitySnapshot {
    fn from_reading(reading: Option<WaterReading>, previous: Option<&QualitySnapshot>) -> Self {
        // ---
        let evaluation = match &reading {
            Some(r) => evaluator::evaluate(r),
            None => EvaluationResult::no_data(),
        };

        let changed = match (previous.and_then(|p| p.reading.as_ref()), &reading) {
            (Some(old), Some(new)) => !old.same_measurements(new),
            (None, None) => false,
            _ => previous.is_some(),
        };

        Self {
            reading,
            evaluation,
            changed,
            checked_at: Utc::now(),
        }
    }
}

/// Handle to the running monitor task.
pub struct QualityMonitor {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    snapshots: watch::Receiver<Option<QualitySnapshot>>,
}

impl QualityMonitor {
    /// Start polling `source` every `period`.
    pub fn spawn<S: ReadingSource>(source: S, period: Duration) -> Self {
        // ---
        let (tx, rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(source, period, tx, cancel.clone()));

        info!("Quality monitor started, polling every {:?}", period);
        Self {
            cancel,
            task,
            snapshots: rx,
        }
    }

    /// Receiver for the latest snapshot. `None` until the first tick completes.
    pub fn subscribe(&self) -> watch::Receiver<Option<QualitySnapshot>> {
        self.snapshots.clone()
    }

    /// Cancel the task, abandoning any in-flight fetch, and wait for it to exit.
    pub async fn shutdown(self) {
        // ---
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("Quality monitor task ended abnormally: {}", e);
        }
        info!("Quality monitor stopped");
    }
}

async fn run<S: ReadingSource>(
    source: S,
    period: Duration,
    tx: watch::Sender<Option<QualitySnapshot>>,
    cancel: CancellationToken,
) {
    // ---
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            _ = cancel.cancelled() => break,
            result = source.latest() => result,
        };

        let reading = match fetched {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Quality monitor fetch failed, keeping last snapshot: {:#}", e);
                continue;
            }
        };

        let previous = tx.borrow().clone();
        let snapshot = QualitySnapshot::from_reading(reading, previous.as_ref());
        log_transition(previous.as_ref(), &snapshot);

        // Only fails when every receiver is gone, including our own handle's.
        if tx.send(Some(snapshot)).is_err() {
            break;
        }
    }
}

fn log_transition(previous: Option<&QualitySnapshot>, current: &QualitySnapshot) {
    // ---
    if current.reading.is_none() {
        debug!("Quality monitor: no readings recorded yet");
        return;
    }

    let was_suitable = previous
        .filter(|p| p.reading.is_some())
        .map(|p| p.evaluation.is_suitable);

    match (was_suitable, current.evaluation.is_suitable) {
        (Some(false), false) => {
            if current.changed {
                debug!(issues = ?current.evaluation.issues, "Water quality still out of limits");
            }
        }
        (_, false) => warn!(
            issues = ?current.evaluation.issues,
            "Water quality is outside acceptable limits"
        ),
        (Some(false), true) => info!("Water quality is back within normal range"),
        (_, true) => {
            if current.changed {
                debug!("Quality monitor: new reading, within limits");
            }
        }
    }
}
