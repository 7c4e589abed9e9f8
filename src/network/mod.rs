//! A network abstraction layer for embedded systems
//!
//! The traits in this module describe the byte-stream transport the MQTT client
//! runs over. They are deliberately small so that they can be implemented on top
//! of anything from a `smoltcp` socket to a UART bridge or an in-memory mock.
//!
//! The transport is expected to be *non-blocking*: [`Read::read`] returns
//! whatever is buffered (possibly nothing) and [`Transport::available`] tells the
//! caller how many bytes can be read without waiting.

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application-layer protocol implementations
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Read, Write, Transport};
}

/// Reads bytes from a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Writes bytes to a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A reusable stream socket, opened and closed in place.
///
/// Unlike a one-shot connection, a `Transport` survives reconnects: the MQTT
/// client calls [`connect`](Transport::connect) for every session and
/// [`stop`](Transport::stop) when tearing one down.
///
/// # Examples
///
/// ```rust
/// use libmqtt::network::{Read, Transport, Write};
///
/// struct Loopback {
///     open: bool,
///     buf: heapless::Deque<u8, 64>,
/// }
///
/// impl Read for Loopback {
///     type Error = ();
///     fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
///         let mut n = 0;
///         while n < buf.len() {
///             match self.buf.pop_front() {
///                 Some(b) => buf[n] = b,
///                 None => break,
///             }
///             n += 1;
///         }
///         Ok(n)
///     }
/// }
///
/// impl Write for Loopback {
///     type Error = ();
///     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
///         for b in buf {
///             self.buf.push_back(*b).map_err(|_| ())?;
///         }
///         Ok(buf.len())
///     }
///     fn flush(&mut self) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// impl Transport for Loopback {
///     fn connect(&mut self, _host: &str, _port: u16) -> bool {
///         self.open = true;
///         true
///     }
///     fn available(&self) -> usize {
///         self.buf.len()
///     }
///     fn is_connected(&self) -> bool {
///         self.open
///     }
///     fn stop(&mut self) {
///         self.open = false;
///         self.buf.clear();
///     }
/// }
///
/// let mut socket = Loopback { open: false, buf: heapless::Deque::new() };
/// assert!(socket.connect("broker.local", 1883));
/// socket.write(&[0xD0, 0x00]).unwrap();
/// assert_eq!(socket.available(), 2);
/// ```
pub trait Transport: Read + Write {
    /// Open the stream to `host:port`, returning whether it succeeded.
    fn connect(&mut self, host: &str, port: u16) -> bool;

    /// Number of bytes that can be read right now without blocking.
    fn available(&self) -> usize;

    /// Whether the stream is still open.
    fn is_connected(&self) -> bool;

    /// Close the stream and drop any buffered data.
    fn stop(&mut self);
}
