//! Outbound QoS 1 publishes waiting for their PUBACK.
//!
//! The queue is a dense array: slot 0 is the head, the next packet to
//! transmit, and the last slot is the tail. New publishes go in at the head so
//! they are sent right away; after each transmission the head moves to the
//! tail, so one packet that is never acknowledged cannot starve the others.

use super::packet::{MAX_PAYLOAD_LEN, MAX_TOPIC_LEN};
use crate::network::error::Error;
use heapless::{String, Vec};
use log::debug;

/// Delivery attempts before a packet is given up.
pub const MAX_ATTEMPTS: u16 = 10;

/// One outstanding QoS 1 publish.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PendingPublish {
    topic: String<MAX_TOPIC_LEN>,
    payload: Vec<u8, MAX_PAYLOAD_LEN>,
    retain: bool,
    packet_id: u16,
    attempts: u16,
}

impl PendingPublish {
    /// Topic name.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether the broker should retain the message.
    pub fn retain(&self) -> bool {
        self.retain
    }

    /// Packet identifier, never 0.
    pub fn packet_id(&self) -> u16 {
        self.packet_id
    }

    /// How many times the packet has been transmitted.
    pub fn attempts(&self) -> u16 {
        self.attempts
    }

    /// Whether the retry budget is used up.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_ATTEMPTS
    }

    /// Whether the next transmission is a redelivery (DUP flag).
    pub fn is_duplicate(&self) -> bool {
        self.attempts > 0
    }
}

/// Fixed-capacity queue of pending publishes.
///
/// # Examples
///
/// ```rust
/// use libmqtt::network::application::mqtt::PendingQueue;
///
/// let mut queue: PendingQueue<4> = PendingQueue::new();
/// let first = queue.push(false, "a/b", b"1").unwrap();
/// let second = queue.push(false, "a/b", b"2").unwrap();
///
/// assert_eq!((first, second), (1, 2));
/// assert_eq!(queue.head().map(|p| p.packet_id()), Some(2));
///
/// queue.rotate();
/// assert_eq!(queue.head().map(|p| p.packet_id()), Some(1));
/// ```
#[derive(Debug, Default)]
pub struct PendingQueue<const N: usize> {
    items: Vec<PendingPublish, N>,
}

impl<const N: usize> PendingQueue<N> {
    /// An empty queue.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of pending packets.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether every publish has been acknowledged or discarded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The next packet to transmit.
    pub fn head(&self) -> Option<&PendingPublish> {
        self.items.first()
    }

    /// Pending packets from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &PendingPublish> {
        self.items.iter()
    }

    /// Whether a packet with this identifier is pending.
    pub fn contains(&self, packet_id: u16) -> bool {
        self.items.iter().any(|p| p.packet_id == packet_id)
    }

    /// Copy a publish into the queue head and return its packet identifier.
    ///
    /// The identifier is one more than the largest pending identifier, or 1 for
    /// an empty queue. If that would overflow, the lowest free identifier is
    /// used instead.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if the topic, the payload or the queue is
    /// too large. The queue is left unchanged.
    pub fn push(&mut self, retain: bool, topic: &str, payload: &[u8]) -> Result<u16, Error> {
        if self.items.is_full() {
            return Err(Error::CapacityExceeded);
        }
        let topic = String::try_from(topic).map_err(|_| Error::CapacityExceeded)?;
        let payload = Vec::from_slice(payload).map_err(|_| Error::CapacityExceeded)?;
        let packet_id = self.next_packet_id();
        self.items
            .insert(
                0,
                PendingPublish {
                    topic,
                    payload,
                    retain,
                    packet_id,
                    attempts: 0,
                },
            )
            .map_err(|_| Error::CapacityExceeded)?;
        debug!("queued publish {} ({} pending)", packet_id, self.items.len());
        Ok(packet_id)
    }

    fn next_packet_id(&self) -> u16 {
        let max = self.items.iter().map(|p| p.packet_id).max().unwrap_or(0);
        match max.checked_add(1) {
            Some(id) => id,
            // At most N < 65535 identifiers are taken, so a free one exists.
            None => (1..=u16::MAX).find(|id| !self.contains(*id)).unwrap_or(1),
        }
    }

    /// Record a transmission of the head packet.
    pub fn mark_head_sent(&mut self) {
        if let Some(head) = self.items.first_mut() {
            head.attempts = head.attempts.saturating_add(1);
        }
    }

    /// Remove the packet with this identifier, wherever it is.
    pub fn remove(&mut self, packet_id: u16) -> Option<PendingPublish> {
        let pos = self.items.iter().position(|p| p.packet_id == packet_id)?;
        Some(self.items.remove(pos))
    }

    /// Remove and return the head packet.
    pub fn pop_head(&mut self) -> Option<PendingPublish> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Move the head to the tail. No-op with fewer than two packets.
    pub fn rotate(&mut self) {
        if self.items.len() >= 2 {
            self.items.rotate_left(1);
        }
    }

    /// Drop every pending packet.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
