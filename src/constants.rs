/// Current firmware version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Capacity of the formatted push-metrics URL
pub const METRICS_URL_CAPACITY: usize = 128;

/// Port left out of the metrics URL
pub const HTTPS_PORT: u16 = 443;

pub const SECONDS_PER_MINUTE: u64 = 60;
