use std::io::{self, Write};
use std::sync::Mutex;

use clustercode_common::{ChartDefinition, ChartHandle};

use super::{ChartSink, SampleBatch};
use crate::error::SinkError;

/// Speaks the Netdata external plugin text protocol:
///
/// ```text
/// CHART clustercode_a.fps '' 'a Current frames per second' 'fps' 'progress' 'clustercode.progress.fps' area 60102 3
/// DIMENSION fps 'fps' absolute 1 100
/// BEGIN clustercode_a.fps
/// SET fps = 2997
/// END
/// ```
pub struct PluginSink<W> {
    out: Mutex<W>,
}

impl PluginSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> PluginSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Tell the host there is nothing to collect so it does not restart us.
    pub fn disable(&self) -> Result<(), SinkError> {
        let mut out = self.lock();
        out.write_all(b"DISABLE\n")?;
        out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Single quotes delimit protocol fields.
fn quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "\""))
}

fn render_chart(def: &ChartDefinition) -> String {
    let mut text = format!(
        "CHART {} {} {} {} {} {} {} {} {}\n",
        def.id,
        quoted(&def.name),
        quoted(&def.title),
        quoted(&def.units),
        quoted(&def.family),
        quoted(&def.context),
        def.chart_type.as_str(),
        def.priority,
        def.update_every,
    );
    for dim in &def.dimensions {
        text.push_str(&format!(
            "DIMENSION {} {} {} {} {}{}\n",
            dim.id,
            quoted(&dim.name),
            dim.algorithm.as_str(),
            dim.multiplier,
            dim.divisor,
            if dim.hidden { " hidden" } else { "" },
        ));
    }
    text
}

fn render_batch(batch: &SampleBatch) -> String {
    let mut text = String::new();
    for update in &batch.updates {
        text.push_str(&format!("BEGIN {}\n", update.chart.id));
        for sample in &update.samples {
            text.push_str(&format!("SET {} = {}\n", sample.dimension, sample.value));
        }
        text.push_str("END\n");
    }
    text
}

impl<W: Write + Send> ChartSink for PluginSink<W> {
    fn create_chart(&self, definition: &ChartDefinition) -> Result<ChartHandle, SinkError> {
        let text = render_chart(definition);
        let mut out = self.lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        tracing::debug!(chart=%definition.id, "chart created");
        Ok(ChartHandle {
            id: definition.id.clone(),
            update_every: definition.update_every,
        })
    }

    fn commit(&self, batch: &SampleBatch) -> Result<(), SinkError> {
        // Render first so a batch is written with a single locked write.
        let text = render_batch(batch);
        let mut out = self.lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChartUpdate;
    use clustercode_common::{ChartAlgorithm, ChartType, DimensionDefinition, MetricSample};

    fn definition() -> ChartDefinition {
        ChartDefinition {
            id: "clustercode_a.bitrate".to_string(),
            name: String::new(),
            title: "a Current bitrate".to_string(),
            units: "kbit/s".to_string(),
            family: "progress".to_string(),
            context: "clustercode.progress.bitrate".to_string(),
            chart_type: ChartType::Line,
            priority: 60103,
            update_every: 3,
            dimensions: vec![DimensionDefinition {
                id: "bitrate".to_string(),
                name: "bitrate".to_string(),
                algorithm: ChartAlgorithm::Absolute,
                multiplier: 1,
                divisor: 100,
                hidden: false,
            }],
        }
    }

    #[test]
    fn test_render_chart() {
        let sink = PluginSink::new(Vec::new());
        let handle = sink.create_chart(&definition()).unwrap();
        assert_eq!(handle.id, "clustercode_a.bitrate");
        assert_eq!(handle.update_every, 3);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "CHART clustercode_a.bitrate '' 'a Current bitrate' 'kbit/s' 'progress' 'clustercode.progress.bitrate' line 60103 3\n\
             DIMENSION bitrate 'bitrate' absolute 1 100\n"
        );
    }

    #[test]
    fn test_render_hidden_dimension_and_quotes() {
        let mut def = definition();
        def.title = "bob's node".to_string();
        def.dimensions[0].hidden = true;
        let text = render_chart(&def);
        assert!(text.contains("'bob\"s node'"));
        assert!(text.ends_with("absolute 1 100 hidden\n"));
    }

    #[test]
    fn test_node_name_with_spaces_keeps_single_token_ids() {
        use crate::metrics::CollectorMetrics;
        use crate::registry::ChartRegistry;
        use clustercode_common::MetricFamily;
        use std::sync::Arc;

        let sink = Arc::new(PluginSink::new(Vec::new()));
        let registry = ChartRegistry::new(sink.clone(), Arc::new(CollectorMetrics::default()));
        let chart = registry
            .get_or_create("encoder 1", MetricFamily::Bitrate, 3)
            .unwrap();
        let batch = SampleBatch::new(vec![ChartUpdate {
            chart: chart.handle.clone(),
            samples: vec![MetricSample {
                dimension: chart.dimension.clone(),
                value: 250,
            }],
        }]);
        sink.commit(&batch).unwrap();
        drop(registry);

        let out = Arc::try_unwrap(sink).ok().unwrap().into_inner();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("CHART clustercode_encoder_1.bitrate '' 'encoder 1 Current bitrate' "));
        assert_eq!(lines[2], "BEGIN clustercode_encoder_1.bitrate");
        assert_eq!(lines[2].split_whitespace().count(), 2);
        assert_eq!(lines[3], "SET bitrate = 250");
    }

    #[test]
    fn test_disable() {
        let sink = PluginSink::new(Vec::new());
        sink.disable().unwrap();
        assert_eq!(sink.into_inner(), b"DISABLE\n");
    }

    #[test]
    fn test_render_batch() {
        let sink = PluginSink::new(Vec::new());
        let batch = SampleBatch::new(vec![
            ChartUpdate {
                chart: ChartHandle {
                    id: "clustercode_a.bitrate".to_string(),
                    update_every: 3,
                },
                samples: vec![MetricSample {
                    dimension: "bitrate".to_string(),
                    value: 250,
                }],
            },
            ChartUpdate {
                chart: ChartHandle {
                    id: "clustercode_a.fps".to_string(),
                    update_every: 3,
                },
                samples: vec![MetricSample {
                    dimension: "fps".to_string(),
                    value: 2997,
                }],
            },
        ]);
        sink.commit(&batch).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "BEGIN clustercode_a.bitrate\nSET bitrate = 250\nEND\n\
             BEGIN clustercode_a.fps\nSET fps = 2997\nEND\n"
        );
    }
}
