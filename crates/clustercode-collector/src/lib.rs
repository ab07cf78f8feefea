pub mod config;
pub mod decode;
pub mod error;
pub mod executor;
pub mod extract;
pub mod fleet;
pub mod metrics;
pub mod registry;
pub mod scheduler;
pub mod sink;
pub mod transport;

pub use decode::{decode, validate, PollBody};
pub use error::{CollectorError, DecodeError, SinkError, TransportError};
pub use executor::{CycleOutcome, NodePollExecutor};
pub use extract::extract;
pub use fleet::FleetConfigurator;
pub use metrics::CollectorMetrics;
pub use registry::{ChartDescriptor, ChartRegistry};
pub use scheduler::{RecordingScheduler, Scheduler, TokioScheduler};
pub use sink::{ChartSink, ChartUpdate, MemorySink, PluginSink, SampleBatch};
pub use transport::{HttpTransport, Transport};
