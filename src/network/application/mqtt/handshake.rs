//! CONNECT / CONNACK handshake.
//!
//! ```text
//! Disconnected --begin()--> AwaitingConnect --open()--> AwaitingConnAck --complete()--> Connected
//!                                  |                          |
//!                                  +--------- fail() ---------+--> Failed --reset()--> Disconnected
//! ```
//!
//! The handshake never waits. [`Handshake::open`] sends CONNECT and returns;
//! the caller arms a CONNACK task and a timeout task and feeds whichever frame
//! arrives to [`Handshake::complete`].

use super::codec::Codec;
use super::options::Options;
use super::packet::{
    CONNECT, CONNECT_CLEAN_SESSION, CONNECT_PASSWORD, CONNECT_USERNAME, Frame, PROTOCOL_LEVEL,
    PROTOCOL_NAME,
};
use crate::network::Transport;
use crate::network::error::Error;
use log::{info, warn};

/// Where a session is in its connection lifecycle.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConnectionState {
    /// No transport, nothing in flight.
    Disconnected,
    /// Opening the transport and sending CONNECT.
    AwaitingConnect,
    /// CONNECT sent, waiting for CONNACK or the timeout.
    AwaitingConnAck,
    /// CONNACK accepted; publishes may flow.
    Connected,
    /// A step failed; the session is being torn down.
    Failed,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConnectionState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConnectionState::Disconnected => defmt::write!(f, "Disconnected"),
            ConnectionState::AwaitingConnect => defmt::write!(f, "AwaitingConnect"),
            ConnectionState::AwaitingConnAck => defmt::write!(f, "AwaitingConnAck"),
            ConnectionState::Connected => defmt::write!(f, "Connected"),
            ConnectionState::Failed => defmt::write!(f, "Failed"),
        }
    }
}

/// The handshake state machine.
#[derive(Debug)]
pub struct Handshake {
    state: ConnectionState,
    session_present: bool,
}

impl Handshake {
    /// A handshake in the `Disconnected` state.
    pub const fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            session_present: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the last accepted CONNACK reported a resumed session.
    pub fn session_present(&self) -> bool {
        self.session_present
    }

    /// Start a new handshake.
    ///
    /// # Errors
    ///
    /// [`Error::SessionActive`] unless currently `Disconnected`.
    pub fn begin(&mut self) -> Result<(), Error> {
        if self.state != ConnectionState::Disconnected {
            return Err(Error::SessionActive);
        }
        self.state = ConnectionState::AwaitingConnect;
        self.session_present = false;
        Ok(())
    }

    /// Open the transport and send CONNECT.
    ///
    /// # Errors
    ///
    /// * [`Error::ConnectionRefused`] - the transport could not connect
    /// * [`Error::WriteError`] - CONNECT could not be sent
    ///
    /// The state is left unchanged on error; the caller decides how to fail.
    pub fn open<T: Transport>(
        &mut self,
        codec: &mut Codec<T>,
        options: &Options<'_>,
    ) -> Result<(), Error> {
        if !codec.connect(options.host, options.port) {
            warn!("cannot connect to {}:{}", options.host, options.port);
            return Err(Error::ConnectionRefused);
        }
        send_connect(codec, options)?;
        self.state = ConnectionState::AwaitingConnAck;
        Ok(())
    }

    /// Judge the frame read in answer to CONNECT.
    ///
    /// # Errors
    ///
    /// * [`Error::ConnectionRefused`] - the broker rejected the connection
    /// * [`Error::ProtocolError`] - anything other than a CONNACK arrived
    pub fn complete(&mut self, frame: Option<Frame>) -> Result<(), Error> {
        match frame {
            Some(Frame::ConnectAck {
                session_present,
                return_code,
            }) if return_code.is_accepted() => {
                info!("connection accepted");
                self.state = ConnectionState::Connected;
                self.session_present = session_present;
                Ok(())
            }
            Some(Frame::ConnectAck { return_code, .. }) => {
                warn!("connection rejected: {}", return_code);
                Err(Error::ConnectionRefused)
            }
            _ => {
                warn!("not a connect acknowledgement");
                Err(Error::ProtocolError)
            }
        }
    }

    /// Mark the handshake as failed.
    pub fn fail(&mut self) {
        self.state = ConnectionState::Failed;
    }

    /// Return to `Disconnected`.
    pub fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode and send a CONNECT packet.
fn send_connect<T: Transport>(codec: &mut Codec<T>, options: &Options<'_>) -> Result<(), Error> {
    // --- Variable Header: name, level, flags, keep-alive ---
    let mut packet_len = 2 + PROTOCOL_NAME.len() + 1 + 1 + 2;
    // --- Payload ---
    packet_len += 2 + options.client_id.len();

    let mut connect_flags = CONNECT_CLEAN_SESSION;
    if let Some(username) = options.username {
        connect_flags |= CONNECT_USERNAME;
        packet_len += 2 + username.len();
    }
    if let Some(password) = options.password {
        connect_flags |= CONNECT_PASSWORD;
        packet_len += 2 + password.len();
    }

    codec.write_type_flags(CONNECT, 0);
    codec.write_remaining_length(packet_len);
    codec.write_length_prefixed(PROTOCOL_NAME);
    codec.write_byte(PROTOCOL_LEVEL);
    codec.write_byte(connect_flags);
    codec.write_short(options.keep_alive_seconds);
    codec.write_length_prefixed(options.client_id.as_bytes());
    if let Some(username) = options.username {
        codec.write_length_prefixed(username.as_bytes());
    }
    if let Some(password) = options.password {
        codec.write_length_prefixed(password.as_bytes());
    }
    codec.flush()
}
