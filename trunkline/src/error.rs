//! Error types for trunkline.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for trunkline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed connection parameters, caught before any session is attempted
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Failures opening the channel or completing the login handshake
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Console protocol errors on an established session
    #[error("Console protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Channel-level failures mid-session
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Validation errors for switch connection parameters.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A credentials field was empty
    #[error("Credentials field '{field}' must be a non-empty string")]
    EmptyField { field: &'static str },
}

/// Connection and login handshake errors.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// TCP connect did not complete in time
    #[error("Timed out connecting to {host}:{port} after {timeout:?}")]
    ConnectTimeout {
        host: String,
        port: u16,
        timeout: Duration,
    },

    /// A login challenge or the initial shell prompt never arrived
    #[error("Switch {switch} did not present '{challenge}' within {timeout:?}")]
    ChallengeTimeout {
        switch: String,
        challenge: &'static str,
        timeout: Duration,
    },

    /// Peer closed the connection before login completed
    #[error("Switch {switch} closed the connection during login")]
    ClosedDuringLogin { switch: String },
}

/// Console protocol errors (pattern waits, output shape).
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// No expected pattern arrived within the bound
    #[error(
        "No recognizable output from {switch} within {timeout:?} (last command: {last_command:?})"
    )]
    ExpectTimeout {
        switch: String,
        timeout: Duration,
        last_command: Option<String>,
    },

    /// A previous failure left the session out of step with the switch
    #[error("Session with {switch} is desynchronized and must be reconnected")]
    Desynchronized { switch: String },

    /// Interface status output lacked a field the extractor requires
    #[error("Field '{field}' missing from interface status of {interface} on {switch}")]
    MissingField {
        switch: String,
        interface: String,
        field: &'static str,
    },

    /// Invalid expect pattern
    #[error("Invalid expect pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Channel errors on an established session.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Channel reached end of stream mid-operation
    #[error("Channel to {switch} closed unexpectedly (last command: {last_command:?})")]
    Closed {
        switch: String,
        last_command: Option<String>,
    },

    /// I/O failure on the channel
    #[error("Channel I/O with {switch} failed: {source}")]
    Io {
        switch: String,
        #[source]
        source: io::Error,
    },
}

/// Result type alias using trunkline's Error.
pub type Result<T> = std::result::Result<T, Error>;
