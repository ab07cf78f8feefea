use clustercode_common::{MetricFamily, MetricSample, StatusDocument};

/// Samples are sent as integers carrying two decimal places.
pub const SAMPLE_SCALE: f64 = 100.0;

/// The host parses `SET` values as signed 64-bit integers.
pub const MAX_SAMPLE: u64 = i64::MAX as u64;

/// `round(max(raw, 0) * 100)`. Negative readings become zero; `.5` rounds up.
pub fn extract(doc: &StatusDocument, family: MetricFamily) -> MetricSample {
    MetricSample {
        dimension: family.suffix().to_string(),
        value: scale(doc.value(family)),
    }
}

fn scale(raw: f64) -> u64 {
    // `f64::max` ignores NaN, and `as` saturates at u64::MAX.
    ((raw.max(0.0) * SAMPLE_SCALE).round() as u64).min(MAX_SAMPLE)
}
