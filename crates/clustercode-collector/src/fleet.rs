use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use clustercode_common::FleetConfig;

use crate::executor::NodePollExecutor;
use crate::metrics::CollectorMetrics;
use crate::registry::{id_safe_name, ChartRegistry};
use crate::scheduler::Scheduler;
use crate::transport::Transport;

/// Turns the configured node list into scheduled executors. Runs once at
/// startup.
pub struct FleetConfigurator {
    registry: Arc<ChartRegistry>,
    transport: Arc<dyn Transport>,
    scheduler: Arc<dyn Scheduler>,
    metrics: Arc<CollectorMetrics>,
}

impl FleetConfigurator {
    pub fn new(
        registry: Arc<ChartRegistry>,
        transport: Arc<dyn Transport>,
        scheduler: Arc<dyn Scheduler>,
        metrics: Arc<CollectorMetrics>,
    ) -> Self {
        Self {
            registry,
            transport,
            scheduler,
            metrics,
        }
    }

    /// Registers one executor per usable node and returns how many were
    /// registered. Incomplete entries and repeated names are skipped.
    pub fn configure(&self, config: &FleetConfig) -> usize {
        let Some(nodes) = config.nodes.as_ref() else {
            tracing::warn!("fleet configuration has no nodes");
            return 0;
        };

        let default_update_every = config.default_update_every();
        let mut seen = HashSet::new();
        let mut added = 0;

        for (index, entry) in nodes.iter().enumerate() {
            let node = match entry.resolve(default_update_every) {
                Ok(node) => node,
                Err(e) => {
                    tracing::debug!(index, error=%e, "skipping node entry");
                    continue;
                }
            };

            // names that only differ in separators would share chart ids
            if !seen.insert(id_safe_name(&node.name)) {
                tracing::warn!(node=%node.name, "duplicate node name, skipping entry");
                continue;
            }

            let interval = Duration::from_secs(node.update_every);
            tracing::debug!(
                node=%node.name,
                url=%node.progress_url(),
                update_every=node.update_every,
                "configuring node"
            );
            let executor = Arc::new(NodePollExecutor::new(
                node,
                self.registry.clone(),
                self.transport.clone(),
                self.metrics.clone(),
            ));
            self.scheduler.register(executor, interval);
            added += 1;
        }

        self.metrics
            .nodes_configured
            .store(added as u64, Ordering::Relaxed);
        added
    }
}
