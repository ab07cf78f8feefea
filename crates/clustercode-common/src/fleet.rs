use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fleet-wide poll interval (seconds) used when neither the node nor the
/// fleet configuration sets `update_every`.
pub const DEFAULT_UPDATE_EVERY: u64 = 3;

/// Fleet configuration as loaded from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FleetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_every: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeEntry>>,
}

impl FleetConfig {
    /// Effective fleet default; zero counts as unset.
    pub fn default_update_every(&self) -> u64 {
        self.update_every
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_UPDATE_EVERY)
    }
}

/// One node entry exactly as written in the configuration file.
/// Every field is optional on the wire; see [`NodeEntry::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_api: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_every: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeConfigError {
    #[error("node entry is missing `{0}`")]
    MissingField(&'static str),
}

impl NodeEntry {
    /// Turn a raw entry into an accepted [`NodeConfig`], filling
    /// `update_every` from `default_update_every` when absent or zero.
    pub fn resolve(&self, default_update_every: u64) -> Result<NodeConfig, NodeConfigError> {
        let name = self.name.clone().ok_or(NodeConfigError::MissingField("name"))?;
        let hostname = self
            .hostname
            .clone()
            .ok_or(NodeConfigError::MissingField("hostname"))?;
        let progress_api = self
            .progress_api
            .clone()
            .ok_or(NodeConfigError::MissingField("progress_api"))?;
        let update_every = self
            .update_every
            .filter(|v| *v > 0)
            .unwrap_or(default_update_every);

        Ok(NodeConfig {
            name,
            hostname,
            progress_api,
            update_every,
        })
    }
}

/// An accepted node. Immutable after [`NodeEntry::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeConfig {
    pub name: String,
    pub hostname: String,
    pub progress_api: String,
    pub update_every: u64,
}

impl NodeConfig {
    /// Poll URI: `http://` + hostname + progress_api, concatenated verbatim.
    pub fn progress_url(&self) -> String {
        format!("http://{}{}", self.hostname, self.progress_api)
    }
}
