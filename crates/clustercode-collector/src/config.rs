use std::path::Path;

use anyhow::Context;
use clustercode_common::{FleetConfig, NodeEntry};
use serde::Deserialize;
use serde_json::Value;

/// The file as written, before each part is typed on its own so one bad
/// entry does not cost the rest of the fleet.
#[derive(Debug, Deserialize)]
struct RawFleetConfig {
    #[serde(default)]
    update_every: Option<Value>,
    #[serde(default)]
    nodes: Option<Vec<Value>>,
}

/// Read the fleet configuration file (JSON).
pub fn load_fleet_config(path: &Path) -> anyhow::Result<FleetConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_fleet_config(&text).with_context(|| format!("invalid fleet configuration in {}", path.display()))
}

/// Parse the fleet file. Only a document that is not a JSON object fails;
/// a badly typed `update_every` counts as unset and a badly typed node entry
/// is dropped with a warning.
pub fn parse_fleet_config(text: &str) -> anyhow::Result<FleetConfig> {
    let raw: RawFleetConfig = serde_json::from_str(text)?;

    let update_every = raw.update_every.and_then(|v| match serde_json::from_value::<u64>(v) {
        Ok(every) => Some(every),
        Err(e) => {
            tracing::warn!(error=%e, "ignoring fleet update_every");
            None
        }
    });

    let nodes = raw.nodes.map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, v)| match serde_json::from_value::<NodeEntry>(v) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(index, error=%e, "skipping malformed node entry");
                    None
                }
            })
            .collect()
    });

    Ok(FleetConfig { update_every, nodes })
}
