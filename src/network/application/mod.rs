//! # Application Layer Network Protocols
//!
//! This module contains the application layer (OSI Layer 7) protocols built on
//! top of the [`Transport`](crate::network::Transport) trait.
//!
//! ## Design Principles
//!
//! - **Connection Agnostic**: Work with any type implementing [`Transport`](crate::network::Transport)
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Resource Conscious**: Use fixed-size buffers and minimal memory
//! - **Non-blocking**: Never wait on the network; progress is made from a poll loop

/// MQTT client implementation.
///
/// Provides an MQTT 3.1.1 client that delivers QoS 1 publishes with bounded
/// retries, driven by a cooperative poll loop.
pub mod mqtt;
