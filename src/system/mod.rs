//! System utilities for embedded devices.
//!
//! This module provides the system-level plumbing the protocol code runs on.
//! It focuses on lightweight, `no_std` compatible building blocks.
//!
//! # Available Utilities
//!
//! - **[`scheduler`]**: Cooperative task table with delayed, conditional and
//!   raced tasks, plus the [`Clock`](scheduler::Clock) abstraction it runs on
//!
//! # Design Principles
//!
//! - **Embedded-First**: All utilities are designed for resource-constrained environments
//! - **Zero-Allocation**: Fixed-size buffers and stack-based operations
//! - **Portable**: Works across different embedded platforms and architectures
//!
//! # Usage
//!
//! ```rust
//! use libmqtt::system::scheduler::{Clock, Scheduler};
//!
//! struct Fixed(u64);
//! impl Clock for Fixed {
//!     fn now_ms(&self) -> u64 {
//!         self.0
//!     }
//! }
//!
//! let clock = Fixed(0);
//! let mut tasks: Scheduler<&str, (), 4> = Scheduler::new();
//! tasks.after(clock.now_ms(), 500, "blink").unwrap();
//!
//! assert_eq!(tasks.next_ready(499, |_| false), None);
//! assert_eq!(tasks.next_ready(500, |_| false), Some("blink"));
//! ```

/// Cooperative single-threaded scheduler.
///
/// Provides one-shot timers, poll-until-true conditions and "first of two"
/// races without blocking or allocating.
pub mod scheduler;
