//! Progress display constants

/// Bytes per kilobyte for transfer speed display
pub const BYTES_PER_KB: f64 = 1024.0;

/// Minimum interval between two headless progress lines
pub const UPDATE_THROTTLE_MS: u128 = 1000;
