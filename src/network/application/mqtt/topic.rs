//! Per-topic publishing handle.

use super::client::Client;
use crate::network::Transport;
use crate::network::error::Error;
use crate::system::scheduler::Clock;

/// A topic name plus its retain policy.
///
/// Handles are cheap and never talk to the broker themselves; [`Topic::publish`]
/// just queues on the client it is given.
///
/// # Examples
///
/// ```rust
/// use libmqtt::network::application::mqtt::Topic;
///
/// let status = Topic::new("devices/node-7/status");
/// assert!(status.retain());
///
/// let readings = Topic::new("devices/node-7/readings").with_retain(false);
/// assert!(!readings.retain());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic<'a> {
    name: &'a str,
    retain: bool,
}

impl<'a> Topic<'a> {
    /// A retained topic.
    pub const fn new(name: &'a str) -> Self {
        Self { name, retain: true }
    }

    /// Change the retain policy.
    pub const fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    /// Topic name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Whether messages published here are retained by the broker.
    pub fn retain(&self) -> bool {
        self.retain
    }

    /// Queue `payload` on `client` under this topic.
    ///
    /// # Errors
    ///
    /// Same as [`Client::publish`].
    pub fn publish<T: Transport, K: Clock, const Q: usize>(
        &self,
        client: &mut Client<'_, T, K, Q>,
        payload: &[u8],
    ) -> Result<u16, Error> {
        client.publish(self.retain, self.name, payload)
    }
}
