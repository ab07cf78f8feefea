use std::sync::atomic::Ordering;
use std::sync::Arc;

use clustercode_common::{
    ChartAlgorithm, ChartDefinition, ChartHandle, DimensionDefinition, MetricFamily,
};
use dashmap::DashMap;

use crate::error::CollectorError;
use crate::metrics::CollectorMetrics;
use crate::sink::ChartSink;

/// Prefix of every chart id and context this collector emits.
pub const CHART_PREFIX: &str = "clustercode";

/// Families are placed at `BASE_PRIORITY + MetricFamily::priority_offset()`.
pub const BASE_PRIORITY: u32 = 60100;

const CHART_FAMILY: &str = "progress";

/// A chart the host has materialized for one node and one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDescriptor {
    pub id: String,
    pub family: MetricFamily,
    pub node_name: String,
    pub dimension: String,
    pub handle: ChartHandle,
}

/// Node name as it may appear inside a chart id. The plugin protocol splits
/// lines on whitespace and uses quotes as field delimiters, so those become
/// `_`, the same substitution the host applies to ids it receives.
pub fn id_safe_name(node_name: &str) -> String {
    node_name
        .chars()
        .map(|c| match c {
            c if c.is_whitespace() || c.is_control() => '_',
            '\'' | '"' | '\\' => '_',
            c => c,
        })
        .collect()
}

/// `clustercode_<node>.<suffix>`
pub fn chart_id(node_name: &str, family: MetricFamily) -> String {
    format!("{CHART_PREFIX}_{}.{}", id_safe_name(node_name), family.suffix())
}

pub fn chart_definition(node_name: &str, family: MetricFamily, update_every: u64) -> ChartDefinition {
    let suffix = family.suffix();
    ChartDefinition {
        id: chart_id(node_name, family),
        name: String::new(),
        title: format!("{node_name} {}", family.title()),
        units: family.units().to_string(),
        family: CHART_FAMILY.to_string(),
        context: format!("{CHART_PREFIX}.{CHART_FAMILY}.{suffix}"),
        chart_type: family.chart_type(),
        priority: BASE_PRIORITY + family.priority_offset(),
        update_every,
        dimensions: vec![DimensionDefinition {
            id: suffix.to_string(),
            name: suffix.to_string(),
            algorithm: ChartAlgorithm::Absolute,
            multiplier: 1,
            divisor: 100,
            hidden: false,
        }],
    }
}

/// Chart id → descriptor. Entries are inserted on a node's first successful
/// poll and never removed.
///
/// Concurrent `get_or_create` calls for distinct ids are safe. The per-node
/// scheduler never issues overlapping calls for the same id; if a caller
/// does, the map's entry lock keeps creation to one sink call anyway.
pub struct ChartRegistry {
    sink: Arc<dyn ChartSink>,
    charts: DashMap<String, Arc<ChartDescriptor>>,
    metrics: Arc<CollectorMetrics>,
}

impl std::fmt::Debug for ChartRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartRegistry")
            .field("charts", &self.charts.len())
            .finish()
    }
}

impl ChartRegistry {
    pub fn new(sink: Arc<dyn ChartSink>, metrics: Arc<CollectorMetrics>) -> Self {
        Self {
            sink,
            charts: DashMap::new(),
            metrics,
        }
    }

    pub fn sink(&self) -> &Arc<dyn ChartSink> {
        &self.sink
    }

    pub fn get_or_create(
        &self,
        node_name: &str,
        family: MetricFamily,
        update_every: u64,
    ) -> Result<Arc<ChartDescriptor>, CollectorError> {
        let id = chart_id(node_name, family);
        if let Some(existing) = self.charts.get(&id) {
            return Ok(existing.value().clone());
        }

        let entry = self.charts.entry(id).or_try_insert_with(|| {
            let definition = chart_definition(node_name, family, update_every);
            let handle = self.sink.create_chart(&definition)?;
            self.metrics.charts_created_total.fetch_add(1, Ordering::Relaxed);
            tracing::info!(chart=%definition.id, node=%node_name, %family, "registered chart");
            Ok::<_, CollectorError>(Arc::new(ChartDescriptor {
                id: definition.id,
                family,
                node_name: node_name.to_string(),
                dimension: family.suffix().to_string(),
                handle,
            }))
        })?;
        Ok(entry.value().clone())
    }

    pub fn get(&self, id: &str) -> Option<Arc<ChartDescriptor>> {
        self.charts.get(id).map(|e| e.value().clone())
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.charts.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use clustercode_common::ChartType;

    fn registry() -> (Arc<MemorySink>, ChartRegistry) {
        let sink = Arc::new(MemorySink::new());
        let registry = ChartRegistry::new(sink.clone(), Arc::new(CollectorMetrics::default()));
        (sink, registry)
    }

    #[test]
    fn test_chart_id() {
        assert_eq!(chart_id("a", MetricFamily::Bitrate), "clustercode_a.bitrate");
        assert_eq!(chart_id("node-2", MetricFamily::Fps), "clustercode_node-2.fps");
        assert_eq!(chart_id("a", MetricFamily::Percentage), "clustercode_a.percentage");
    }

    #[test]
    fn test_chart_id_replaces_protocol_separators() {
        assert_eq!(chart_id("encoder 1", MetricFamily::Bitrate), "clustercode_encoder_1.bitrate");
        assert_eq!(chart_id("a\tb\nc", MetricFamily::Fps), "clustercode_a_b_c.fps");
        assert_eq!(chart_id("bob's \"box\"", MetricFamily::Fps), "clustercode_bob_s__box_.fps");
        assert_eq!(id_safe_name("node-2.lan"), "node-2.lan");

        // the title keeps the configured name
        let def = chart_definition("encoder 1", MetricFamily::Bitrate, 3);
        assert_eq!(def.id, "clustercode_encoder_1.bitrate");
        assert_eq!(def.title, "encoder 1 Current bitrate");
    }

    #[test]
    fn test_chart_definition_metadata() {
        let def = chart_definition("a", MetricFamily::Percentage, 5);
        assert_eq!(def.title, "a Current Progress");
        assert_eq!(def.units, "%");
        assert_eq!(def.family, "progress");
        assert_eq!(def.context, "clustercode.progress.percentage");
        assert_eq!(def.chart_type, ChartType::Area);
        assert_eq!(def.update_every, 5);
        assert_eq!(def.dimensions.len(), 1);
        assert_eq!(def.dimensions[0].id, "percentage");
        assert_eq!(def.dimensions[0].divisor, 100);

        let bitrate = chart_definition("a", MetricFamily::Bitrate, 5);
        assert_eq!(bitrate.chart_type, ChartType::Line);
        assert_eq!(bitrate.units, "kbit/s");
    }

    #[test]
    fn test_priority_order() {
        let p = |f| chart_definition("a", f, 3).priority;
        assert_eq!(p(MetricFamily::Percentage), 60101);
        assert_eq!(p(MetricFamily::Fps), 60102);
        assert_eq!(p(MetricFamily::Bitrate), 60103);
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let (sink, registry) = registry();
        let first = registry.get_or_create("a", MetricFamily::Fps, 3).unwrap();
        let second = registry.get_or_create("a", MetricFamily::Fps, 3).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(sink.create_count(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.metrics.charts_created_total.load(Ordering::Relaxed), 1);
        assert_eq!(first.id, "clustercode_a.fps");
        assert_eq!(first.dimension, "fps");
        assert_eq!(first.handle.id, first.id);
    }

    #[test]
    fn test_distinct_keys_get_distinct_charts() {
        let (sink, registry) = registry();
        for family in MetricFamily::ALL {
            registry.get_or_create("a", family, 3).unwrap();
            registry.get_or_create("b", family, 3).unwrap();
        }
        assert_eq!(registry.len(), 6);
        assert_eq!(sink.create_count(), 6);
        assert_eq!(
            registry.ids(),
            vec![
                "clustercode_a.bitrate",
                "clustercode_a.fps",
                "clustercode_a.percentage",
                "clustercode_b.bitrate",
                "clustercode_b.fps",
                "clustercode_b.percentage",
            ]
        );
    }

    #[test]
    fn test_create_failure_is_not_cached() {
        let (sink, registry) = registry();
        sink.fail_create(true);
        assert!(matches!(
            registry.get_or_create("a", MetricFamily::Bitrate, 3),
            Err(CollectorError::Sink(_))
        ));
        assert!(registry.is_empty());

        sink.fail_create(false);
        registry.get_or_create("a", MetricFamily::Bitrate, 3).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("clustercode_a.bitrate").is_some());
    }

    #[test]
    fn test_concurrent_distinct_nodes() {
        let (sink, registry) = registry();
        let registry = Arc::new(registry);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let node = format!("n{i}");
                    for _ in 0..10 {
                        for family in MetricFamily::ALL {
                            registry.get_or_create(&node, family, 3).unwrap();
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(registry.len(), 24);
        assert_eq!(sink.create_count(), 24);
    }
}
