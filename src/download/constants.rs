//! Constants for the download module (timeouts, buffering).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes; archives run to tens of megabytes).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Capacity of the write buffer between the response stream and the file.
pub const WRITE_BUFFER_BYTES: usize = 64 * 1024;
