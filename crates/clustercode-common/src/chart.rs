use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Line,
    Area,
}

impl ChartType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Area => "area",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ChartAlgorithm {
    Absolute,
}

impl ChartAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartAlgorithm::Absolute => "absolute",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DimensionDefinition {
    pub id: String,
    pub name: String,
    pub algorithm: ChartAlgorithm,
    pub multiplier: i64,
    pub divisor: i64,
    pub hidden: bool,
}

/// Everything the host needs to materialize a chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartDefinition {
    /// `<type>.<id>`, unique per host process.
    pub id: String,
    /// Empty lets the host derive the name from `id`.
    pub name: String,
    pub title: String,
    pub units: String,
    pub family: String,
    pub context: String,
    pub chart_type: ChartType,
    pub priority: u32,
    pub update_every: u64,
    pub dimensions: Vec<DimensionDefinition>,
}

/// Reference to a chart the host has materialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChartHandle {
    pub id: String,
    pub update_every: u64,
}
