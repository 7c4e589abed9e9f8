//! MQTT 3.1.1 control packet definitions.
//!
//! This module holds the wire-level vocabulary shared by the codec and the
//! client: packet type numbers, fixed-header flag bits, buffer bounds, the
//! decoded [`Frame`] variants and the remaining-length encoder.

use crate::network::error::Error;
use heapless::{String, Vec};

// MQTT control packet types (upper nibble of the fixed header)
/// CONNECT, client to broker.
pub const CONNECT: u8 = 1;
/// CONNACK, broker to client.
pub const CONNACK: u8 = 2;
/// PUBLISH, both directions.
pub const PUBLISH: u8 = 3;
/// PUBACK, both directions.
pub const PUBACK: u8 = 4;
/// SUBACK, broker to client.
pub const SUBACK: u8 = 9;
/// PINGREQ, client to broker.
pub const PINGREQ: u8 = 12;
/// PINGRESP, broker to client.
pub const PINGRESP: u8 = 13;
/// DISCONNECT, client to broker.
pub const DISCONNECT: u8 = 14;

// PUBLISH fixed-header flags (lower nibble)
/// RETAIN flag.
pub const FLAG_RETAIN: u8 = 0x01;
/// QoS 1 ("at least once") in the QoS bits.
pub const FLAG_QOS1: u8 = 0x02;
/// Both QoS bits; any set bit means a packet identifier follows the topic.
pub const FLAG_QOS_MASK: u8 = 0x06;
/// DUP flag, set on retransmissions.
pub const FLAG_DUP: u8 = 0x08;

// CONNECT flags
/// Clean session; always requested by this client.
pub const CONNECT_CLEAN_SESSION: u8 = 0x02;
/// A password field follows the client identifier.
pub const CONNECT_PASSWORD: u8 = 0x40;
/// A user name field follows the client identifier.
pub const CONNECT_USERNAME: u8 = 0x80;

/// MQTT protocol name as defined in the specification.
pub const PROTOCOL_NAME: &[u8] = b"MQTT";
/// MQTT protocol level for version 3.1.1.
pub const PROTOCOL_LEVEL: u8 = 4;

/// Longest topic name held in a pending or received publish.
pub const MAX_TOPIC_LEN: usize = 256;
/// Largest payload held in a pending or received publish.
pub const MAX_PAYLOAD_LEN: usize = 1024;
/// Largest remaining length the 4-byte varint can express (2^28 - 1).
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;
/// Largest length-prefixed field.
pub const MAX_STRING_LEN: usize = 65_535;

/// Verdict carried by a CONNACK.
///
/// # Examples
///
/// ```rust
/// use libmqtt::network::application::mqtt::ConnectReturnCode;
///
/// assert!(ConnectReturnCode::from(0).is_accepted());
/// assert_eq!(ConnectReturnCode::from(5), ConnectReturnCode::NotAuthorized);
/// assert_eq!(ConnectReturnCode::from(42), ConnectReturnCode::Other(42));
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConnectReturnCode {
    /// 0: connection accepted.
    Accepted,
    /// 1: the broker does not support protocol level 4.
    UnacceptableProtocolVersion,
    /// 2: the client identifier is not allowed.
    IdentifierRejected,
    /// 3: the MQTT service is unavailable.
    ServerUnavailable,
    /// 4: malformed user name or password.
    BadUserNameOrPassword,
    /// 5: the client is not authorized to connect.
    NotAuthorized,
    /// Any other code; treated as a rejection.
    Other(u8),
}

impl ConnectReturnCode {
    /// Whether the broker accepted the connection.
    pub fn is_accepted(&self) -> bool {
        *self == ConnectReturnCode::Accepted
    }
}

impl From<u8> for ConnectReturnCode {
    fn from(code: u8) -> Self {
        match code {
            0 => ConnectReturnCode::Accepted,
            1 => ConnectReturnCode::UnacceptableProtocolVersion,
            2 => ConnectReturnCode::IdentifierRejected,
            3 => ConnectReturnCode::ServerUnavailable,
            4 => ConnectReturnCode::BadUserNameOrPassword,
            5 => ConnectReturnCode::NotAuthorized,
            other => ConnectReturnCode::Other(other),
        }
    }
}

impl core::fmt::Display for ConnectReturnCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConnectReturnCode::Accepted => write!(f, "connection accepted"),
            ConnectReturnCode::UnacceptableProtocolVersion => {
                write!(f, "unacceptable protocol version")
            }
            ConnectReturnCode::IdentifierRejected => write!(f, "identifier rejected"),
            ConnectReturnCode::ServerUnavailable => write!(f, "server unavailable"),
            ConnectReturnCode::BadUserNameOrPassword => write!(f, "bad user name or password"),
            ConnectReturnCode::NotAuthorized => write!(f, "not authorized"),
            ConnectReturnCode::Other(code) => write!(f, "return code {}", code),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConnectReturnCode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConnectReturnCode::Accepted => defmt::write!(f, "Accepted"),
            ConnectReturnCode::UnacceptableProtocolVersion => {
                defmt::write!(f, "UnacceptableProtocolVersion")
            }
            ConnectReturnCode::IdentifierRejected => defmt::write!(f, "IdentifierRejected"),
            ConnectReturnCode::ServerUnavailable => defmt::write!(f, "ServerUnavailable"),
            ConnectReturnCode::BadUserNameOrPassword => defmt::write!(f, "BadUserNameOrPassword"),
            ConnectReturnCode::NotAuthorized => defmt::write!(f, "NotAuthorized"),
            ConnectReturnCode::Other(code) => defmt::write!(f, "Other({})", code),
        }
    }
}

/// An incoming MQTT publish message.
///
/// # Examples
///
/// ```rust
/// use libmqtt::network::application::mqtt::PublishNotification;
/// use heapless::{String, Vec};
///
/// let packet = PublishNotification {
///     topic: String::try_from("sensors/temperature").unwrap(),
///     packet_id: Some(7),
///     payload: Vec::from_slice(b"23.5").unwrap(),
///     duplicate: false,
/// };
///
/// assert_eq!(packet.topic.as_str(), "sensors/temperature");
/// assert_eq!(&packet.payload[..], b"23.5");
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublishNotification {
    /// The topic on which the message was published.
    pub topic: String<MAX_TOPIC_LEN>,
    /// Packet identifier; only present for QoS 1 and 2.
    pub packet_id: Option<u16>,
    /// The message payload data.
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
    /// Whether the sender marked this as a redelivery.
    pub duplicate: bool,
}

/// A control packet decoded from the broker.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Frame {
    /// CONNACK.
    ConnectAck {
        /// The broker resumed a stored session.
        session_present: bool,
        /// Accept or reject verdict.
        return_code: ConnectReturnCode,
    },
    /// PUBLISH.
    Publish(PublishNotification),
    /// PUBACK.
    PublishAck {
        /// Identifier of the acknowledged publish.
        packet_id: u16,
    },
    /// SUBACK.
    SubscribeAck {
        /// Identifier of the acknowledged subscribe.
        packet_id: u16,
        /// Granted QoS, or 0x80 on failure.
        return_code: u8,
    },
    /// PINGRESP.
    PingResponse,
}

/// Encode the remaining length field for an MQTT packet.
///
/// The remaining length is a base-128 varint: each byte carries seven value
/// bits and the high bit is set when another byte follows. Up to four bytes
/// are allowed, giving a maximum of [`MAX_REMAINING_LENGTH`].
///
/// # Errors
///
/// [`Error::CapacityExceeded`] if `len` needs more than four bytes.
///
/// # Examples
///
/// ```rust
/// use libmqtt::network::application::mqtt::packet::encode_remaining_length;
///
/// let mut buf = heapless::Vec::new();
/// encode_remaining_length(&mut buf, 16_384).unwrap();
/// assert_eq!(&buf[..], &[0x80, 0x80, 0x01]);
/// ```
pub fn encode_remaining_length(buf: &mut Vec<u8, 4>, mut len: usize) -> Result<(), Error> {
    if len > MAX_REMAINING_LENGTH {
        return Err(Error::CapacityExceeded);
    }
    buf.clear();
    loop {
        let mut digit = (len & 0x7F) as u8;
        len >>= 7;
        if len > 0 {
            digit |= 0x80;
        }
        buf.push(digit).map_err(|_| Error::CapacityExceeded)?;
        if len == 0 {
            break;
        }
    }
    Ok(())
}
