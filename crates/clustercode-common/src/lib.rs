pub mod chart;
pub mod fleet;
pub mod progress;

pub use chart::{ChartAlgorithm, ChartDefinition, ChartHandle, ChartType, DimensionDefinition};
pub use fleet::{FleetConfig, NodeConfig, NodeConfigError, NodeEntry, DEFAULT_UPDATE_EVERY};
pub use progress::{MetricFamily, MetricSample, StatusDocument};

pub mod telemetry;
