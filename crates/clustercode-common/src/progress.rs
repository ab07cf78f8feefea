use serde::{Deserialize, Serialize};

use crate::chart::ChartType;

/// Progress report returned by a clustercode node's progress API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StatusDocument {
    pub bitrate: f64,
    pub fps: f64,
    pub percentage: f64,
}

impl StatusDocument {
    pub fn value(&self, family: MetricFamily) -> f64 {
        match family {
            MetricFamily::Bitrate => self.bitrate,
            MetricFamily::Fps => self.fps,
            MetricFamily::Percentage => self.percentage,
        }
    }
}

/// One chart per family, one dimension per chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    Bitrate,
    Fps,
    Percentage,
}

impl MetricFamily {
    /// Processing order within a poll cycle.
    pub const ALL: [MetricFamily; 3] = [
        MetricFamily::Bitrate,
        MetricFamily::Fps,
        MetricFamily::Percentage,
    ];

    /// Chart id suffix, dimension id and status document field name.
    pub fn suffix(self) -> &'static str {
        match self {
            MetricFamily::Bitrate => "bitrate",
            MetricFamily::Fps => "fps",
            MetricFamily::Percentage => "percentage",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MetricFamily::Bitrate => "Current bitrate",
            MetricFamily::Fps => "Current frames per second",
            MetricFamily::Percentage => "Current Progress",
        }
    }

    pub fn units(self) -> &'static str {
        match self {
            MetricFamily::Bitrate => "kbit/s",
            MetricFamily::Fps => "fps",
            MetricFamily::Percentage => "%",
        }
    }

    pub fn chart_type(self) -> ChartType {
        match self {
            MetricFamily::Bitrate => ChartType::Line,
            MetricFamily::Fps | MetricFamily::Percentage => ChartType::Area,
        }
    }

    /// Offset from the collector's base priority. Percentage renders first,
    /// then fps, then bitrate.
    pub fn priority_offset(self) -> u32 {
        match self {
            MetricFamily::Bitrate => 3,
            MetricFamily::Fps => 2,
            MetricFamily::Percentage => 1,
        }
    }
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A fixed-point (x100) sample for one dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricSample {
    pub dimension: String,
    pub value: u64,
}
