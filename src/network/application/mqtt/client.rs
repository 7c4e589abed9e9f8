//! MQTT 3.1.1 client for embedded systems.
//!
//! The [`Client`] owns the codec, the handshake, the pending-publish queue and
//! a small task table. It never blocks: [`Client::connect`] only sends CONNECT,
//! [`Client::publish`] only queues, and all waiting happens in tasks that the
//! host advances by calling [`Client::poll`] from its main loop.
//!
//! # Delivery
//!
//! Every publish is QoS 1. While connected, one transmission task walks the
//! queue:
//!
//! 1. a whole inbound frame is waiting: read it (a PUBACK removes its packet),
//!    check again after [`ACK_CHECK_INTERVAL_MS`]
//! 2. the head packet used all [`MAX_ATTEMPTS`]: drop it, check again after
//!    [`ACK_CHECK_INTERVAL_MS`]
//! 3. otherwise send the head packet, move it to the tail, try again after
//!    [`RETRY_INTERVAL_MS`]
//!
//! The task goes idle when the queue empties or the connection is lost, and is
//! re-armed by the next publish or the next accepted CONNACK.
//!
//! # Examples
//!
//! ```rust,no_run
//! use libmqtt::network::application::mqtt::{ActiveSession, Client, Options};
//! # use libmqtt::network::{Read, Transport, Write};
//! # use libmqtt::system::scheduler::Clock;
//! # struct Socket;
//! # impl Read for Socket {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Socket {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Transport for Socket {
//! #     fn connect(&mut self, _host: &str, _port: u16) -> bool { true }
//! #     fn available(&self) -> usize { 0 }
//! #     fn is_connected(&self) -> bool { true }
//! #     fn stop(&mut self) {}
//! # }
//! # struct Ticks;
//! # impl Clock for Ticks { fn now_ms(&self) -> u64 { 0 } }
//!
//! static SESSION: ActiveSession = ActiveSession::new();
//!
//! let options = Options::new("broker.local", 1883, "sensor_node_1");
//! let mut client: Client<_, _> = Client::new(Socket, Ticks, options, &SESSION);
//!
//! client.connect()?;
//! client.publish(false, "sensors/temperature", b"23.5")?;
//!
//! while !client.publish_acknowledged() {
//!     client.poll()?;
//! }
//! client.disconnect();
//! # Ok::<(), libmqtt::network::error::Error>(())
//! ```

use super::codec::Codec;
use super::handshake::{ConnectionState, Handshake};
use super::options::Options;
use super::packet::Frame;
use super::queue::{MAX_ATTEMPTS, PendingQueue};
use crate::network::Transport;
use crate::network::error::Error;
use crate::system::scheduler::{Clock, Scheduler};
use core::sync::atomic::{AtomicU32, Ordering};
use log::{debug, error, info, warn};

/// Delay before the unacknowledged head packet is sent again.
pub const RETRY_INTERVAL_MS: u64 = 1000;
/// Delay between acknowledgement checks after a PUBACK or a discard.
pub const ACK_CHECK_INTERVAL_MS: u64 = 100;
/// How long to wait for CONNACK after sending CONNECT.
pub const CONNACK_TIMEOUT_MS: u64 = 10_000;
/// Default capacity of the pending-publish queue.
pub const DEFAULT_QUEUE_LEN: usize = 8;

// CONNACK is always exactly four bytes on the wire.
const CONNACK_LEN: usize = 4;
// CONNACK, its timeout, transmission and keep-alive.
const MAX_TASKS: usize = 4;

static NEXT_CLIENT_ID: AtomicU32 = AtomicU32::new(1);

/// Take the next client id from `counter`, skipping 0 (the free register).
pub(crate) fn next_client_id(counter: &AtomicU32) -> u32 {
    loop {
        let id = counter.fetch_add(1, Ordering::Relaxed);
        if id != 0 {
            return id;
        }
    }
}

/// Register of the one client allowed to be connected at a time.
///
/// Clients sharing a register exclude each other: while one holds it, a
/// second [`Client::connect`] fails with [`Error::SessionActive`]. The
/// register is released when the holder tears down or is dropped. It is
/// usually a `static`.
#[derive(Debug)]
pub struct ActiveSession {
    holder: AtomicU32,
}

impl ActiveSession {
    /// A register nobody holds.
    pub const fn new() -> Self {
        Self {
            holder: AtomicU32::new(0),
        }
    }

    /// Whether some client holds the register.
    pub fn is_active(&self) -> bool {
        self.holder.load(Ordering::Acquire) != 0
    }

    fn claim(&self, client: u32) -> bool {
        self.holder
            .compare_exchange(0, client, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self, client: u32) {
        let _ = self
            .holder
            .compare_exchange(client, 0, Ordering::AcqRel, Ordering::Acquire);
    }
}

impl Default for ActiveSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    ConnAck,
    ConnAckTimeout,
    Transmit,
    KeepAlive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Readable(usize),
}

/// An MQTT 3.1.1 publishing client.
///
/// # Type Parameters
///
/// * `T` - the transport implementing [`Transport`]
/// * `K` - the millisecond [`Clock`]
/// * `Q` - capacity of the pending-publish queue
#[derive(Debug)]
pub struct Client<'a, T: Transport, K: Clock, const Q: usize = DEFAULT_QUEUE_LEN> {
    id: u32,
    options: Options<'a>,
    register: &'a ActiveSession,
    codec: Codec<T>,
    clock: K,
    handshake: Handshake,
    queue: PendingQueue<Q>,
    tasks: Scheduler<Task, Condition, MAX_TASKS>,
    transmitting: bool,
    last_sent_ms: u64,
}

impl<'a, T: Transport, K: Clock, const Q: usize> Client<'a, T, K, Q> {
    /// Create a disconnected client.
    pub fn new(transport: T, clock: K, options: Options<'a>, register: &'a ActiveSession) -> Self {
        Self {
            id: next_client_id(&NEXT_CLIENT_ID),
            options,
            register,
            codec: Codec::new(transport),
            clock,
            handshake: Handshake::new(),
            queue: PendingQueue::new(),
            tasks: Scheduler::new(),
            transmitting: false,
            last_sent_ms: 0,
        }
    }

    /// Open the transport and send CONNECT.
    ///
    /// Returns once CONNECT is on the wire. The CONNACK is awaited by
    /// [`poll`](Self::poll), which fails the session with [`Error::Timeout`]
    /// if none arrives within [`CONNACK_TIMEOUT_MS`].
    ///
    /// # Errors
    ///
    /// * [`Error::SessionActive`] - this or another client is already active;
    ///   the active client is not disturbed
    /// * [`Error::ConnectionRefused`] - the transport could not connect
    /// * [`Error::WriteError`] - CONNECT could not be sent
    /// * [`Error::InvalidAddress`] / [`Error::InvalidConfig`] - bad options
    pub fn connect(&mut self) -> Result<(), Error> {
        self.options.validate()?;
        self.handshake.begin()?;
        if !self.register.claim(self.id) {
            warn!("another mqtt client is connected");
            self.handshake.reset();
            return Err(Error::SessionActive);
        }
        if let Err(e) = self.handshake.open(&mut self.codec, &self.options) {
            if e == Error::WriteError {
                error!("cannot send connect packet");
            }
            return Err(self.abort(e));
        }
        self.last_sent_ms = self.clock.now_ms();
        if let Err(e) = self.await_connack() {
            return Err(self.abort(e));
        }
        Ok(())
    }

    fn await_connack(&mut self) -> Result<(), Error> {
        let now = self.clock.now_ms();
        let ack = self
            .tasks
            .if_then(Condition::Readable(CONNACK_LEN), Task::ConnAck)?;
        let timeout = self.tasks.after(now, CONNACK_TIMEOUT_MS, Task::ConnAckTimeout)?;
        self.tasks.only_one_of(ack, timeout);
        Ok(())
    }

    /// Whether the broker has accepted the connection.
    pub fn connected(&self) -> bool {
        self.handshake.state() == ConnectionState::Connected
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.handshake.state()
    }

    /// Whether the broker resumed a stored session on the last connect.
    pub fn session_present(&self) -> bool {
        self.handshake.session_present()
    }

    /// `true` once every queued publish has been acknowledged or discarded.
    pub fn publish_acknowledged(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of publishes still waiting for their PUBACK.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The pending-publish queue, head first.
    pub fn queue(&self) -> &PendingQueue<Q> {
        &self.queue
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        self.codec.transport()
    }

    /// Connection options.
    pub fn options(&self) -> &Options<'a> {
        &self.options
    }

    /// Queue a QoS 1 publish and return its packet identifier.
    ///
    /// Publishing while disconnected is allowed; the packet goes out once a
    /// connection is accepted.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if the topic, payload or queue is too
    /// large; nothing is queued in that case.
    pub fn publish(&mut self, retain: bool, topic: &str, payload: &[u8]) -> Result<u16, Error> {
        let packet_id = self
            .queue
            .push(retain, topic, payload)
            .inspect_err(|_| warn!("cannot enqueue publish packet"))?;
        if self.connected() {
            self.arm_transmit(0);
        }
        Ok(packet_id)
    }

    /// Send DISCONNECT if connected, then tear the session down.
    ///
    /// Pending publishes stay queued for the next connection.
    pub fn disconnect(&mut self) {
        if self.connected() && self.codec.send_disconnect().is_err() {
            warn!("cannot send disconnect packet");
        }
        self.teardown();
    }

    /// Run every task that is due.
    ///
    /// Call this regularly from the main loop, e.g. every few milliseconds or
    /// whenever the transport becomes readable.
    ///
    /// # Errors
    ///
    /// The fatal error that tore the session down during this poll, if any:
    /// [`Error::Timeout`], [`Error::ConnectionRefused`],
    /// [`Error::ProtocolError`], [`Error::WriteError`], [`Error::ReadError`]
    /// or [`Error::ConnectionClosed`].
    pub fn poll(&mut self) -> Result<(), Error> {
        if self.connected() && !self.codec.is_connected() {
            warn!("connection lost");
            return Err(self.abort(Error::ConnectionClosed));
        }
        let now = self.clock.now_ms();
        loop {
            let codec = &self.codec;
            let Some(task) = self.tasks.next_ready(now, |condition| match condition {
                Condition::Readable(len) => codec.available() >= *len,
            }) else {
                return Ok(());
            };
            self.run(task, now)?;
        }
    }

    fn run(&mut self, task: Task, now: u64) -> Result<(), Error> {
        match task {
            Task::ConnAck => self.receive_connack(),
            Task::ConnAckTimeout => {
                warn!("no connect acknowledgement within {} ms", CONNACK_TIMEOUT_MS);
                Err(self.abort(Error::Timeout))
            }
            Task::Transmit => self.transmit(),
            Task::KeepAlive => self.keep_alive(now),
        }
    }

    fn receive_connack(&mut self) -> Result<(), Error> {
        let frame = self.codec.receive();
        if let Err(e) = self.handshake.complete(frame) {
            return Err(self.abort(e));
        }
        if !self.queue.is_empty() {
            self.arm_transmit(0);
        }
        if let Some(interval) = self.options.keep_alive_ms() {
            self.arm_keep_alive(interval);
        }
        Ok(())
    }

    fn transmit(&mut self) -> Result<(), Error> {
        self.transmitting = false;
        if !self.connected() || self.queue.is_empty() {
            return Ok(());
        }
        if self.inbound_ready()? {
            self.service_inbound()?;
            self.arm_transmit(ACK_CHECK_INTERVAL_MS);
            return Ok(());
        }
        let Some(head) = self.queue.head() else {
            return Ok(());
        };
        if head.is_exhausted() {
            warn!(
                "discarding packet {} after {} attempts: {}",
                head.packet_id(),
                MAX_ATTEMPTS,
                Error::RetryExhausted
            );
            self.queue.pop_head();
            self.arm_transmit(ACK_CHECK_INTERVAL_MS);
            return Ok(());
        }

        let sent = self.codec.send_publish(
            head.topic(),
            head.packet_id(),
            head.payload(),
            head.retain(),
            head.is_duplicate(),
        );
        match sent {
            Ok(()) => {
                self.last_sent_ms = self.clock.now_ms();
                self.queue.mark_head_sent();
                self.queue.rotate();
                self.arm_transmit(RETRY_INTERVAL_MS);
                Ok(())
            }
            Err(e) => {
                error!("cannot send publish packet");
                Err(self.abort(e))
            }
        }
    }

    fn keep_alive(&mut self, now: u64) -> Result<(), Error> {
        let Some(interval) = self.options.keep_alive_ms() else {
            return Ok(());
        };
        if !self.connected() {
            return Ok(());
        }
        while self.inbound_ready()? {
            self.service_inbound()?;
        }
        let idle = now.saturating_sub(self.last_sent_ms);
        if idle < interval {
            self.arm_keep_alive(interval - idle);
            return Ok(());
        }
        if let Err(e) = self.codec.send_ping_request() {
            error!("cannot send ping request");
            return Err(self.abort(e));
        }
        self.last_sent_ms = now;
        self.arm_keep_alive(interval);
        Ok(())
    }

    fn inbound_ready(&mut self) -> Result<bool, Error> {
        let ready = self.codec.frame_available();
        if !self.codec.is_read_complete() {
            error!("malformed frame header");
            return Err(self.abort(Error::ReadError));
        }
        Ok(ready)
    }

    fn service_inbound(&mut self) -> Result<(), Error> {
        match self.codec.receive() {
            Some(Frame::PublishAck { packet_id }) => {
                if self.queue.remove(packet_id).is_some() {
                    info!("publish {} acknowledged", packet_id);
                } else {
                    debug!("acknowledgement for unknown packet {}", packet_id);
                }
            }
            Some(Frame::PingResponse) => debug!("ping response"),
            Some(Frame::Publish(notification)) => {
                debug!("dropping inbound publish on {}", notification.topic);
            }
            Some(frame) => warn!("unexpected frame {:?}", frame),
            None if !self.codec.is_read_complete() => {
                error!("cannot read frame");
                return Err(self.abort(Error::ReadError));
            }
            None => debug!("skipped unsupported frame"),
        }
        Ok(())
    }

    fn arm_transmit(&mut self, delay_ms: u64) {
        if self.transmitting {
            return;
        }
        let now = self.clock.now_ms();
        match self.tasks.after(now, delay_ms, Task::Transmit) {
            Ok(_) => self.transmitting = true,
            Err(e) => error!("cannot schedule transmission: {}", e),
        }
    }

    fn arm_keep_alive(&mut self, delay_ms: u64) {
        let now = self.clock.now_ms();
        if let Err(e) = self.tasks.after(now, delay_ms, Task::KeepAlive) {
            error!("cannot schedule keep-alive: {}", e);
        }
    }

    fn abort(&mut self, cause: Error) -> Error {
        self.handshake.fail();
        debug!("session failed: {}", cause);
        self.teardown();
        cause
    }

    fn teardown(&mut self) {
        self.codec.close();
        self.tasks.clear();
        self.transmitting = false;
        self.handshake.reset();
        self.register.release(self.id);
    }
}

impl<T: Transport, K: Clock, const Q: usize> Drop for Client<'_, T, K, Q> {
    fn drop(&mut self) {
        self.register.release(self.id);
    }
}
