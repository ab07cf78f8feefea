use std::sync::atomic::Ordering;
use std::sync::Arc;

use clustercode_common::{MetricFamily, NodeConfig};

use crate::decode::{decode, PollBody};
use crate::error::{CollectorError, DecodeError};
use crate::extract::extract;
use crate::metrics::CollectorMetrics;
use crate::registry::ChartRegistry;
use crate::sink::{ChartUpdate, SampleBatch};
use crate::transport::Transport;

/// Result of one poll cycle that did not fail at the sink.
#[derive(Debug)]
pub enum CycleOutcome {
    /// One batch was committed.
    Committed(SampleBatch),
    /// The body was not a usable progress document; nothing was touched.
    Rejected(DecodeError),
}

impl CycleOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CycleOutcome::Committed(_))
    }
}

/// Polls one node. The scheduler guarantees a node's cycles never overlap.
pub struct NodePollExecutor {
    node: NodeConfig,
    url: String,
    registry: Arc<ChartRegistry>,
    transport: Arc<dyn Transport>,
    metrics: Arc<CollectorMetrics>,
}

impl std::fmt::Debug for NodePollExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodePollExecutor")
            .field("node", &self.node.name)
            .field("url", &self.url)
            .finish()
    }
}

impl NodePollExecutor {
    pub fn new(
        node: NodeConfig,
        registry: Arc<ChartRegistry>,
        transport: Arc<dyn Transport>,
        metrics: Arc<CollectorMetrics>,
    ) -> Self {
        let url = node.progress_url();
        Self {
            node,
            url,
            registry,
            transport,
            metrics,
        }
    }

    pub fn node(&self) -> &NodeConfig {
        &self.node
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the progress document and run one cycle on it. Transport
    /// failures are logged and swallowed: the node stays scheduled.
    #[tracing::instrument(skip(self), fields(node = %self.node.name))]
    pub async fn poll(&self) -> Result<Option<CycleOutcome>, CollectorError> {
        let body = match self.transport.fetch(&self.url).await {
            Ok(body) => body,
            Err(e) => {
                self.metrics
                    .transport_errors_total
                    .fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error=%e, url=%self.url, "failed to fetch progress");
                return Ok(None);
            }
        };
        self.run_cycle(PollBody::Raw(body)).map(Some)
    }

    /// Decode, extract, resolve charts, then commit all three families in
    /// one batch. Nothing reaches the sink unless every family resolved.
    pub fn run_cycle(&self, body: PollBody) -> Result<CycleOutcome, CollectorError> {
        self.metrics.cycles_total.fetch_add(1, Ordering::Relaxed);

        let doc = match decode(body) {
            Ok(doc) => doc,
            Err(e) => {
                self.metrics
                    .cycles_rejected_total
                    .fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    node=%self.node.name,
                    error=%e,
                    "got a response, but it is not a valid progress document; ignoring"
                );
                return Ok(CycleOutcome::Rejected(e));
            }
        };

        let mut updates = Vec::with_capacity(MetricFamily::ALL.len());
        for family in MetricFamily::ALL {
            let chart = self
                .registry
                .get_or_create(&self.node.name, family, self.node.update_every)
                .inspect_err(|_| {
                    self.metrics.sink_errors_total.fetch_add(1, Ordering::Relaxed);
                })?;
            updates.push(ChartUpdate {
                chart: chart.handle.clone(),
                samples: vec![extract(&doc, family)],
            });
        }

        let batch = SampleBatch::new(updates);
        if let Err(e) = self.registry.sink().commit(&batch) {
            self.metrics.sink_errors_total.fetch_add(1, Ordering::Relaxed);
            return Err(e.into());
        }
        self.metrics.commits_total.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            node=%self.node.name,
            bitrate=doc.bitrate,
            fps=doc.fps,
            percentage=doc.percentage,
            "committed progress samples"
        );

        Ok(CycleOutcome::Committed(batch))
    }
}
