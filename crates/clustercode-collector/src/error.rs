use thiserror::Error;

/// Why a poll body was not accepted. Every variant aborts the cycle for
/// that node only.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("response is missing {0:?}")]
    MissingFields(Vec<&'static str>),

    #[error("response field `{0}` is not a number")]
    NonNumeric(&'static str),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("chart `{id}` rejected by sink: {reason}")]
    Rejected { id: String, reason: String },

    #[error("sink i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
