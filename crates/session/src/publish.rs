//! Forecast record publishing

use crate::SessionError;
use async_trait::async_trait;
use signal_pipeline::ForecastRecord;
use tokio::sync::mpsc;
use tracing::debug;

/// Sink for finished Forecast Records
#[async_trait]
pub trait ForecastPublisher: Send + Sync {
    async fn publish(&self, topic: &str, record: &ForecastRecord) -> Result<(), SessionError>;
}

/// A record with its topic
#[derive(Debug, Clone)]
pub struct PublishedRecord {
    pub topic: String,
    pub record: ForecastRecord,
}

/// Publisher backed by a bounded channel; a full channel is a publish error
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::Sender<PublishedRecord>,
}

impl ChannelPublisher {
    pub fn new(tx: mpsc::Sender<PublishedRecord>) -> Self {
        Self { tx }
    }

    /// Publisher plus the receiving end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PublishedRecord>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl ForecastPublisher for ChannelPublisher {
    async fn publish(&self, topic: &str, record: &ForecastRecord) -> Result<(), SessionError> {
        debug!(topic, timestamp = record.timestamp_ms, "Publishing forecast record");
        self.tx
            .try_send(PublishedRecord {
                topic: topic.to_string(),
                record: record.clone(),
            })
            .map_err(|e| SessionError::Publish(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ForecastRecord {
        ForecastRecord {
            user_id: "u".into(),
            company_id: "c".into(),
            timestamp_ms: 42,
            waveform: vec![0.1, -0.1],
            processed_fps: 30,
            liveness_score: 0.5,
            present_fraction: 1.0,
            head_shake_count: 0,
            attention_score: 1.0,
        }
    }

    #[tokio::test]
    async fn test_publish_delivers() {
        let (publisher, mut rx) = ChannelPublisher::channel(4);
        publisher.publish("vppg/forecast/c", &record()).await.unwrap();
        let published = rx.recv().await.unwrap();
        assert_eq!(published.topic, "vppg/forecast/c");
        assert_eq!(published.record.timestamp_ms, 42);
    }

    #[tokio::test]
    async fn test_full_channel_is_error() {
        let (publisher, _rx) = ChannelPublisher::channel(1);
        publisher.publish("t", &record()).await.unwrap();
        let err = publisher.publish("t", &record()).await.unwrap_err();
        assert!(matches!(err, SessionError::Publish(_)));
    }
}
