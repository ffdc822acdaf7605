//! Console connection configuration.

use std::time::Duration;

/// Console connection configuration.
///
/// Every wait the driver performs is bounded by one of these timeouts.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Telnet port (default: 23).
    pub port: u16,

    /// Bound on establishing the TCP connection.
    pub connect_timeout: Duration,

    /// Bound on each pattern wait on an established session.
    pub read_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            port: 23,
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
        }
    }
}
