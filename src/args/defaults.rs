pub(crate) const DEFAULT_USER_AGENT: &str = concat!("chainload/", env!("CARGO_PKG_VERSION"));

/// Endpoint hit by `stress` when no URL is given.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:4221";
/// Endpoint hit by `stress --echo`.
pub const ECHO_TARGET_URL: &str = "http://localhost:4221/echo";
/// Body posted by `stress --echo`.
pub const ECHO_BODY: &str = "Young john";
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";
pub const DEFAULT_REQUEST_COUNT: usize = 100;
pub const DEFAULT_HANDLER_COUNT: usize = 10;
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:4221";
