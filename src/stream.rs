use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::engine::RiskEngine;
use crate::models::{DashboardOverview, Event};

const CHANNEL_CAPACITY: usize = 64;

/// Emits events one per tick, like a live device feed.
fn spawn_connector(events: Vec<Event>, interval: Duration) -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        for event in events {
            ticker.tick().await;
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    rx
}

/// Feeds `events` into the engine at a fixed pace and returns the final dashboard.
/// Every `every` events the current leader is logged.
pub async fn replay(
    engine: Arc<RiskEngine>,
    events: Vec<Event>,
    interval: Duration,
    every: usize,
) -> DashboardOverview {
    let every = every.max(1);
    let mut rx = spawn_connector(events, interval);
    let mut received = 0usize;

    while let Some(event) = rx.recv().await {
        tracing::debug!(patient_id = event.patient_id(), "stream event");
        engine.ingest(event);
        received += 1;

        if received % every == 0 {
            let overview = engine.dashboard();
            match overview.patients.first() {
                Some(top) => tracing::info!(
                    received,
                    patient_id = %top.patient_id,
                    score = top.risk_score,
                    band = %top.risk_band,
                    "highest risk patient"
                ),
                None => tracing::info!(received, "no patients yet"),
            }
        }
    }

    tracing::info!(received, "stream finished");
    engine.dashboard()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ingest::sample_events;
    use crate::models::RiskBand;

    #[tokio::test]
    async fn replay_ingests_everything_in_order() {
        let engine = Arc::new(RiskEngine::new(EngineConfig::default()));
        let events = sample_events().unwrap();
        let total = events.len();

        let overview = replay(Arc::clone(&engine), events, Duration::from_millis(1), 2).await;

        let ingested: usize = engine
            .patient_ids()
            .iter()
            .filter_map(|id| engine.with_patient(id, |s| s.symptoms.len() + s.vitals.len()))
            .sum();
        assert_eq!(ingested, total);
        assert_eq!(overview.patients.len(), 3);
        assert_eq!(overview.patients[0].patient_id, "p2");
        assert_eq!(overview.patients[0].risk_band, RiskBand::High);
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_dashboard() {
        let engine = Arc::new(RiskEngine::new(EngineConfig::default()));
        let overview = replay(engine, Vec::new(), Duration::from_millis(1), 0).await;
        assert!(overview.patients.is_empty());
    }
}
