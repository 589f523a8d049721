use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Completed,
    Failed,
    Rejected,
    Unavailable,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Failed => "failed",
            Outcome::Rejected => "rejected",
            Outcome::Unavailable => "unavailable",
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct MetricsData {
    pub outcomes: HashMap<String, u64>,
    pub generation_ms_total: u64,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn record(&self, outcome: Outcome) {
        let mut data = self.inner.write().await;
        *data.outcomes.entry(outcome.as_str().to_string()).or_insert(0) += 1;
    }

    pub async fn record_generation(&self, elapsed: Duration) {
        let mut data = self.inner.write().await;
        data.generation_ms_total += elapsed.as_millis() as u64;
    }

    pub async fn snapshot(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
