//! # libmqtt - MQTT publishing for embedded devices
//!
//! A `no_std` MQTT 3.1.1 client that lets a device push telemetry to a broker
//! with at-least-once delivery. It owns no sockets and no timers: the firmware
//! supplies a byte [`Transport`](network::Transport) and a millisecond
//! [`Clock`](system::scheduler::Clock), then calls
//! [`Client::poll`](network::application::mqtt::Client::poll) from its main loop.
//!
//! ## Features
//!
//! ### Network
//! - **Transport abstraction**: connect, read, write and stop over any byte stream
//! - **MQTT client**: CONNECT handshake with timeout, QoS 1 publish with
//!   retransmission, keep-alive pings, clean DISCONNECT
//!
//! ### System
//! - **Scheduler**: deadline and condition tasks for a cooperative main loop
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libmqtt = "0.1.0"
//! ```
//!
//! ### Publishing a reading
//!
//! ```rust,no_run
//! use libmqtt::network::application::mqtt::{ActiveSession, Client, Options};
//! # use libmqtt::network::{Read, Transport, Write};
//! # use libmqtt::system::scheduler::Clock;
//! # struct Uart;
//! # impl Read for Uart {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Uart {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Transport for Uart {
//! #     fn connect(&mut self, _host: &str, _port: u16) -> bool { true }
//! #     fn available(&self) -> usize { 0 }
//! #     fn is_connected(&self) -> bool { true }
//! #     fn stop(&mut self) {}
//! # }
//! # struct SysTick;
//! # impl Clock for SysTick { fn now_ms(&self) -> u64 { 0 } }
//!
//! static SESSION: ActiveSession = ActiveSession::new();
//!
//! let options = Options::new("broker.local", 1883, "my_device");
//! let mut client: Client<_, _> = Client::new(Uart, SysTick, options, &SESSION);
//!
//! client.connect()?;
//! client.publish(false, "sensors/temperature", b"23.5")?;
//! # Ok::<(), libmqtt::network::error::Error>(())
//! ```
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, etc.)
//! - Linux-based IoT devices (Raspberry Pi, etc.)
//! - Any platform supporting Rust's `core` library with atomic compare-and-swap
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support and `StdClock` (default: disabled)
//! - `defmt`: Enable defmt formatting for embedded debugging

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Network abstraction layer and the MQTT client built on it.
///
/// Contains the [`Transport`](network::Transport) trait the firmware
/// implements, the shared [`Error`](network::error::Error) type and the MQTT
/// application protocol.
pub mod network;

/// System utilities for embedded devices.
///
/// Contains the cooperative scheduler that drives every deferred step of the
/// MQTT session.
pub mod system;
