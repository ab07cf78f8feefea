use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "clustercode-collector", about = "Polls clustercode nodes and emits progress charts")]
pub struct Args {
    /// Fleet configuration file (JSON).
    #[arg(long, env = "CLUSTERCODE_CONFIG", default_value = "/etc/netdata/clustercode.conf")]
    pub config: PathBuf,

    /// Overrides the file's fleet-wide `update_every` (seconds).
    #[arg(long)]
    pub update_every: Option<u64>,

    /// Timeout for one progress request.
    #[arg(long, default_value_t = 5)]
    pub http_timeout_secs: u64,

    /// Serve collector self-metrics on this address (e.g. "127.0.0.1:9184").
    #[arg(long, env = "CLUSTERCODE_METRICS_ADDR")]
    pub metrics_addr: Option<String>,

    /// OTLP/HTTP traces endpoint. Tracing export is disabled when unset.
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}
