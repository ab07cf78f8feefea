pub mod memory;
pub mod plugin;

use chrono::{DateTime, Utc};
use clustercode_common::{ChartDefinition, ChartHandle, MetricSample};

use crate::error::SinkError;

pub use memory::{MemorySink, SinkEvent};
pub use plugin::PluginSink;

/// Samples for one chart: rendered as begin / set... / end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartUpdate {
    pub chart: ChartHandle,
    pub samples: Vec<MetricSample>,
}

/// Everything one poll cycle commits. A sink applies the whole batch or
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBatch {
    pub collected_at: DateTime<Utc>,
    pub updates: Vec<ChartUpdate>,
}

impl SampleBatch {
    pub fn new(updates: Vec<ChartUpdate>) -> Self {
        Self {
            collected_at: Utc::now(),
            updates,
        }
    }

    pub fn value_of(&self, chart_id: &str, dimension: &str) -> Option<u64> {
        self.updates
            .iter()
            .find(|u| u.chart.id == chart_id)?
            .samples
            .iter()
            .find(|s| s.dimension == dimension)
            .map(|s| s.value)
    }
}

/// The host's charting surface.
pub trait ChartSink: Send + Sync {
    /// Materialize a chart. Called at most once per chart id by the registry.
    fn create_chart(&self, definition: &ChartDefinition) -> Result<ChartHandle, SinkError>;

    /// Commit one batch of samples.
    fn commit(&self, batch: &SampleBatch) -> Result<(), SinkError>;
}
