//! Frame encoding and decoding over a [`Transport`].
//!
//! Outgoing frames are assembled byte by byte in a fixed buffer and handed to
//! the transport in one go by [`Codec::flush`]. Both directions latch their
//! failures: once a write error is seen every further write is a no-op, once a
//! read error is seen every further byte reads as zero, until [`Codec::close`]
//! resets the stream. Callers therefore build a whole frame without checking
//! each step and look at the outcome once.
//!
//! Inbound frames may arrive in pieces. [`Codec::frame_available`] keeps the
//! fixed header of a partly received frame and only reports it once the whole
//! frame can be read.

use super::packet::{
    encode_remaining_length, Frame, PublishNotification, CONNACK, DISCONNECT, FLAG_DUP,
    FLAG_QOS1, FLAG_QOS_MASK, FLAG_RETAIN, MAX_PAYLOAD_LEN, MAX_STRING_LEN, MAX_TOPIC_LEN,
    PINGREQ, PINGRESP, PUBACK, PUBLISH, SUBACK,
};
use crate::network::Transport;
use crate::network::error::Error;
use heapless::{String, Vec};

/// Largest frame the codec can assemble: a PUBLISH with a full topic and payload.
pub const MAX_PACKET_LEN: usize = 1 + 4 + 2 + MAX_TOPIC_LEN + 2 + MAX_PAYLOAD_LEN;

// Control byte plus up to four remaining-length digits.
const MAX_HEADER_LEN: usize = 5;

/// MQTT frame codec wrapping a transport.
#[derive(Debug)]
pub struct Codec<T: Transport> {
    transport: T,
    buffer: Vec<u8, MAX_PACKET_LEN>,
    header: Vec<u8, MAX_HEADER_LEN>,
    discard: usize,
    read_error: bool,
    write_error: bool,
}

impl<T: Transport> Codec<T> {
    /// Wrap a transport. The transport does not need to be connected yet.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: Vec::new(),
            header: Vec::new(),
            discard: 0,
            read_error: false,
            write_error: false,
        }
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the underlying transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Open the transport to `host:port`.
    pub fn connect(&mut self, host: &str, port: u16) -> bool {
        self.transport.connect(host, port)
    }

    /// Whether the transport is still open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Bytes readable without blocking.
    pub fn available(&self) -> usize {
        self.transport.available()
    }

    /// Whether a whole frame is waiting to be decoded by [`receive`](Self::receive).
    ///
    /// Fixed-header bytes are taken off the transport as they arrive and kept
    /// until the rest of the frame is readable. Frames too large to ever decode
    /// are drained as their bytes arrive and never reported. A malformed
    /// remaining length latches a read error.
    pub fn frame_available(&mut self) -> bool {
        loop {
            if self.read_error {
                return false;
            }
            if self.discard > 0 {
                let n = self.discard.min(self.available());
                if n == 0 {
                    return false;
                }
                self.skip(n);
                self.discard -= n;
                continue;
            }
            match self.staged_length() {
                Some(len) if len > MAX_PACKET_LEN => {
                    self.header.clear();
                    self.discard = len;
                }
                Some(len) => return self.available() >= len,
                None => {
                    if self.available() == 0 {
                        return false;
                    }
                    self.stage_header_byte();
                }
            }
        }
    }

    fn staged_length(&self) -> Option<usize> {
        let mut len = 0usize;
        for (i, digit) in self.header.get(1..)?.iter().enumerate() {
            len |= usize::from(digit & 0x7F) << (7 * i);
            if digit & 0x80 == 0 {
                return Some(len);
            }
        }
        None
    }

    fn stage_header_byte(&mut self) {
        let byte = self.read_byte();
        if self.read_error || self.header.push(byte).is_err() {
            self.read_error = true;
            return;
        }
        if self.header.is_full() && self.staged_length().is_none() {
            self.read_error = true;
        }
    }

    /// `true` until a write fails.
    pub fn is_write_complete(&self) -> bool {
        !self.write_error
    }

    /// `true` until a read fails.
    pub fn is_read_complete(&self) -> bool {
        !self.read_error
    }

    /// Stop the transport and clear both error latches.
    pub fn close(&mut self) {
        self.transport.stop();
        self.buffer.clear();
        self.header.clear();
        self.discard = 0;
        self.read_error = false;
        self.write_error = false;
    }

    // --- Writing ---

    /// Append one byte to the frame being assembled.
    pub fn write_byte(&mut self, value: u8) {
        if self.write_error {
            return;
        }
        if self.buffer.push(value).is_err() {
            self.write_error = true;
        }
    }

    /// Append raw bytes to the frame being assembled.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.write_error {
            return;
        }
        if self.buffer.extend_from_slice(bytes).is_err() {
            self.write_error = true;
        }
    }

    /// Append a big-endian 16-bit value.
    pub fn write_short(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Append a fixed-header control byte.
    pub fn write_type_flags(&mut self, packet_type: u8, flags: u8) {
        self.write_byte((packet_type << 4) | (flags & 0x0F));
    }

    /// Append a remaining-length varint. Lengths beyond 2^28 - 1 latch a write error.
    pub fn write_remaining_length(&mut self, len: usize) {
        let mut digits = Vec::new();
        match encode_remaining_length(&mut digits, len) {
            Ok(()) => self.write_bytes(&digits),
            Err(_) => self.write_error = true,
        }
    }

    /// Append a 16-bit length followed by `value`. Fields over 65535 bytes are dropped.
    pub fn write_length_prefixed(&mut self, value: &[u8]) {
        if value.len() > MAX_STRING_LEN {
            return;
        }
        self.write_short(value.len() as u16);
        self.write_bytes(value);
    }

    /// Send the assembled frame and start a new one.
    ///
    /// # Errors
    ///
    /// [`Error::WriteError`] if the frame overflowed the buffer, the transport
    /// rejected it, or an earlier write error is still latched.
    pub fn flush(&mut self) -> Result<(), Error> {
        if !self.write_error && self.send_buffer().is_err() {
            self.write_error = true;
        }
        self.buffer.clear();
        if self.write_error {
            Err(Error::WriteError)
        } else {
            Ok(())
        }
    }

    fn send_buffer(&mut self) -> Result<(), Error> {
        let mut sent = 0;
        while sent < self.buffer.len() {
            match self.transport.write(&self.buffer[sent..]) {
                Ok(0) | Err(_) => return Err(Error::WriteError),
                Ok(n) => sent += n,
            }
        }
        self.transport.flush().map_err(|_| Error::WriteError)
    }

    /// Send a QoS 1 PUBLISH.
    pub fn send_publish(
        &mut self,
        topic: &str,
        packet_id: u16,
        payload: &[u8],
        retain: bool,
        duplicate: bool,
    ) -> Result<(), Error> {
        let mut flags = FLAG_QOS1;
        if retain {
            flags |= FLAG_RETAIN;
        }
        if duplicate {
            flags |= FLAG_DUP;
        }
        self.write_type_flags(PUBLISH, flags);
        self.write_remaining_length(2 + topic.len() + 2 + payload.len());
        self.write_length_prefixed(topic.as_bytes());
        self.write_short(packet_id);
        self.write_bytes(payload);
        self.flush()
    }

    /// Send a PINGREQ.
    pub fn send_ping_request(&mut self) -> Result<(), Error> {
        self.write_type_flags(PINGREQ, 0);
        self.write_remaining_length(0);
        self.flush()
    }

    /// Send a DISCONNECT.
    pub fn send_disconnect(&mut self) -> Result<(), Error> {
        self.write_type_flags(DISCONNECT, 0);
        self.write_remaining_length(0);
        self.flush()
    }

    // --- Reading ---

    /// Read one byte; yields 0 once a read error is latched.
    pub fn read_byte(&mut self) -> u8 {
        if self.read_error {
            return 0;
        }
        let mut byte = [0u8; 1];
        match self.transport.read(&mut byte) {
            Ok(n) if n > 0 => byte[0],
            _ => {
                self.read_error = true;
                0
            }
        }
    }

    /// Read a big-endian 16-bit value.
    pub fn read_short(&mut self) -> u16 {
        let high = self.read_byte();
        let low = self.read_byte();
        u16::from_be_bytes([high, low])
    }

    /// Read a remaining-length varint. A fifth continuation byte latches a read error.
    pub fn read_remaining_length(&mut self) -> usize {
        let mut len = 0usize;
        for shift in [0, 7, 14, 21] {
            let digit = self.read_byte();
            len |= usize::from(digit & 0x7F) << shift;
            if digit & 0x80 == 0 {
                return len;
            }
        }
        self.read_error = true;
        len
    }

    fn read_into<const N: usize>(&mut self, buf: &mut Vec<u8, N>, len: usize) {
        if buf.resize(len, 0).is_err() {
            self.read_error = true;
            return;
        }
        for byte in buf.iter_mut() {
            *byte = self.read_byte();
        }
    }

    fn skip(&mut self, mut len: usize) {
        while len > 0 && !self.read_error {
            self.read_byte();
            len -= 1;
        }
    }

    /// Read and decode one frame.
    ///
    /// Returns `None` when the frame is of a type this client does not handle,
    /// fails its length check, or cannot be read completely. In the first two
    /// cases the rest of the frame is drained so the stream stays aligned; in
    /// the last case [`is_read_complete`](Self::is_read_complete) turns `false`.
    pub fn receive(&mut self) -> Option<Frame> {
        while self.staged_length().is_none() && !self.read_error {
            self.stage_header_byte();
        }
        let first = self.header.first().copied().unwrap_or(0);
        let length = self.staged_length();
        self.header.clear();
        let length = match length {
            Some(length) if !self.read_error => length,
            _ => return None,
        };
        let packet_type = first >> 4;
        let flags = first & 0x0F;

        let mut consumed = 0;
        let frame = match packet_type {
            CONNACK if length == 2 => {
                let session_present = self.read_byte() & 0x01 != 0;
                let return_code = self.read_byte().into();
                consumed = 2;
                Some(Frame::ConnectAck {
                    session_present,
                    return_code,
                })
            }
            PUBLISH => self.decode_publish(flags, length, &mut consumed),
            PUBACK if length == 2 => {
                consumed = 2;
                Some(Frame::PublishAck {
                    packet_id: self.read_short(),
                })
            }
            SUBACK if length == 3 => {
                let packet_id = self.read_short();
                let return_code = self.read_byte();
                consumed = 3;
                Some(Frame::SubscribeAck {
                    packet_id,
                    return_code,
                })
            }
            PINGRESP if length == 0 => Some(Frame::PingResponse),
            _ => None,
        };

        if frame.is_none() {
            self.skip(length.saturating_sub(consumed));
        }
        if self.read_error {
            return None;
        }
        frame
    }

    fn decode_publish(&mut self, flags: u8, length: usize, consumed: &mut usize) -> Option<Frame> {
        if length < 2 {
            return None;
        }
        let topic_len = usize::from(self.read_short());
        *consumed = 2;
        let id_len = if flags & FLAG_QOS_MASK != 0 { 2 } else { 0 };
        let payload_len = length.checked_sub(2 + topic_len + id_len)?;
        if topic_len > MAX_TOPIC_LEN || payload_len > MAX_PAYLOAD_LEN {
            return None;
        }

        let mut topic = Vec::<u8, MAX_TOPIC_LEN>::new();
        self.read_into(&mut topic, topic_len);
        *consumed += topic_len;
        let packet_id = if id_len > 0 {
            *consumed += 2;
            Some(self.read_short())
        } else {
            None
        };
        let mut payload = Vec::new();
        self.read_into(&mut payload, payload_len);
        *consumed += payload_len;

        let topic = String::from_utf8(topic).ok()?;
        Some(Frame::Publish(PublishNotification {
            topic,
            packet_id,
            payload,
            duplicate: flags & FLAG_DUP != 0,
        }))
    }
}
