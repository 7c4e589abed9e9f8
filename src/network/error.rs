//! Common error types for network operations

/// A common error type for network and MQTT session operations.
///
/// This enum defines the errors that can occur while talking to a broker. It is
/// designed to be simple and portable for `no_std` environments: every variant
/// is a plain tag, so the error is `Copy` and can be stored or logged freely.
///
/// Transport failures (`WriteError`, `ReadError`, `ConnectionRefused`,
/// `Timeout`, ...) are fatal to an MQTT session: by the time one is reported the
/// session has already been torn down and a fresh `connect()` may be attempted.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    NotOpen,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// A connection attempt was refused, by the transport or by the broker.
    ConnectionRefused,
    /// A timeout occurred.
    Timeout,
    /// The connection was closed.
    ConnectionClosed,
    /// An invalid address was provided.
    InvalidAddress,
    /// A protocol-specific error occurred.
    ProtocolError,
    /// A topic, payload or queue did not fit its fixed-size storage.
    CapacityExceeded,
    /// Another session currently holds the active-session register.
    SessionActive,
    /// A publish packet used up all of its delivery attempts.
    RetryExhausted,
    /// Connection options could not be parsed.
    InvalidConfig,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::NotOpen => write!(f, "connection not open"),
            Error::WriteError => write!(f, "write error"),
            Error::ReadError => write!(f, "read error"),
            Error::ConnectionRefused => write!(f, "connection refused"),
            Error::Timeout => write!(f, "timeout"),
            Error::ConnectionClosed => write!(f, "connection closed"),
            Error::InvalidAddress => write!(f, "invalid address"),
            Error::ProtocolError => write!(f, "protocol error"),
            Error::CapacityExceeded => write!(f, "capacity exceeded"),
            Error::SessionActive => write!(f, "another session is active"),
            Error::RetryExhausted => write!(f, "retries exhausted"),
            Error::InvalidConfig => write!(f, "invalid configuration"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::CapacityExceeded => defmt::write!(f, "CapacityExceeded"),
            Error::SessionActive => defmt::write!(f, "SessionActive"),
            Error::RetryExhausted => defmt::write!(f, "RetryExhausted"),
            Error::InvalidConfig => defmt::write!(f, "InvalidConfig"),
        }
    }
}
