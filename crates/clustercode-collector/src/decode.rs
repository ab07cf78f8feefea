use bytes::Bytes;
use clustercode_common::{MetricFamily, StatusDocument};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// What the transport handed us for one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollBody {
    /// Response bytes; always parsed as JSON.
    Raw(Bytes),
    /// Already-built document, skips parsing.
    Document(StatusDocument),
}

impl From<Bytes> for PollBody {
    fn from(bytes: Bytes) -> Self {
        PollBody::Raw(bytes)
    }
}

impl From<StatusDocument> for PollBody {
    fn from(doc: StatusDocument) -> Self {
        PollBody::Document(doc)
    }
}

/// Fields a progress document must carry, in the order the progress API
/// documents them.
const REQUIRED_FIELDS: [&str; 3] = ["bitrate", "percentage", "fps"];

/// Presence check only: values are not inspected here.
pub fn validate(doc: &Map<String, Value>) -> bool {
    REQUIRED_FIELDS.iter().all(|field| doc.contains_key(*field))
}

pub fn decode(body: PollBody) -> Result<StatusDocument, DecodeError> {
    let bytes = match body {
        PollBody::Document(doc) => return Ok(doc),
        PollBody::Raw(bytes) => bytes,
    };

    let value: Value = serde_json::from_slice(&bytes)?;
    let Value::Object(map) = value else {
        return Err(DecodeError::NotAnObject);
    };

    if !validate(&map) {
        let missing = REQUIRED_FIELDS
            .into_iter()
            .filter(|field| !map.contains_key(*field))
            .collect();
        return Err(DecodeError::MissingFields(missing));
    }

    let number = |family: MetricFamily| -> Result<f64, DecodeError> {
        let field = family.suffix();
        map.get(field)
            .and_then(Value::as_f64)
            .ok_or(DecodeError::NonNumeric(field))
    };

    Ok(StatusDocument {
        bitrate: number(MetricFamily::Bitrate)?,
        fps: number(MetricFamily::Fps)?,
        percentage: number(MetricFamily::Percentage)?,
    })
}
