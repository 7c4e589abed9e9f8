//! MQTT 3.1.1 publishing client for embedded systems.
//!
//! A small, non-blocking client that publishes at QoS 1 and keeps retrying
//! until every message is acknowledged. It is written for `no_std` targets:
//! all buffers are fixed-size `heapless` containers and nothing ever waits.
//! Work that has to happen later (CONNACK, retransmissions, keep-alive) is
//! armed in a [`Scheduler`](crate::system::scheduler::Scheduler) and run from
//! [`Client::poll`].
//!
//! # Layers
//!
//! - [`packet`]: wire constants and decoded frames
//! - [`codec`]: frame encoding and decoding over a [`Transport`](crate::network::Transport)
//! - [`handshake`]: CONNECT / CONNACK state machine
//! - [`queue`]: outbound publishes waiting for PUBACK
//! - [`client`]: the session tying everything together
//! - [`topic`]: a named handle that publishes through a client
//!
//! Only one client may be connected at a time per [`ActiveSession`] register.
//!
//! # Usage
//!
//! ```rust,no_run
//! use libmqtt::network::application::mqtt::{ActiveSession, Client, Options, Topic};
//! # use libmqtt::network::{Read, Transport, Write};
//! # use libmqtt::system::scheduler::Clock;
//! # struct Modem;
//! # impl Read for Modem {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Modem {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Transport for Modem {
//! #     fn connect(&mut self, _host: &str, _port: u16) -> bool { true }
//! #     fn available(&self) -> usize { 0 }
//! #     fn is_connected(&self) -> bool { true }
//! #     fn stop(&mut self) {}
//! # }
//! # struct Rtc;
//! # impl Clock for Rtc { fn now_ms(&self) -> u64 { 0 } }
//!
//! static SESSION: ActiveSession = ActiveSession::new();
//!
//! let options = Options::new("iot.example.com", 1883, "greenhouse-3").with_keep_alive(60);
//! let mut client: Client<_, _, 4> = Client::new(Modem, Rtc, options, &SESSION);
//! let humidity = Topic::new("greenhouse/3/humidity").with_retain(false);
//!
//! client.connect()?;
//! humidity.publish(&mut client, b"61")?;
//! loop {
//!     client.poll()?;
//! #   break;
//! }
//! # Ok::<(), libmqtt::network::error::Error>(())
//! ```

pub mod client;
pub mod codec;
pub mod handshake;
pub mod options;
pub mod packet;
pub mod queue;
pub mod topic;


pub use client::{
    ACK_CHECK_INTERVAL_MS, ActiveSession, CONNACK_TIMEOUT_MS, Client, DEFAULT_QUEUE_LEN,
    RETRY_INTERVAL_MS,
};
pub use codec::Codec;
pub use handshake::{ConnectionState, Handshake};
pub use options::Options;
pub use packet::{ConnectReturnCode, Frame, PublishNotification};
pub use queue::{MAX_ATTEMPTS, PendingPublish, PendingQueue};
pub use topic::Topic;
