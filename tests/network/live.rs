use dotenvy::dotenv;
use libmqtt::network::application::mqtt::{ActiveSession, Client, Options};
use libmqtt::network::error::Error;
use libmqtt::network::{Read, Transport, Write};
use libmqtt::system::scheduler::Clock;
use std::env;
use std::io::{ErrorKind, Read as StdRead, Write as StdWrite};
use std::net::TcpStream;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct TcpTransport {
    stream: Option<TcpStream>,
    closed: bool,
}

impl Read for TcpTransport {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;
        match stream.read(buf) {
            Ok(0) if !buf.is_empty() => {
                self.closed = true;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(_) => Err(Error::ReadError),
        }
    }
}

impl Write for TcpTransport {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;
        stream.write(buf).map_err(|_| Error::WriteError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        let stream = self.stream.as_mut().ok_or(Error::NotOpen)?;
        stream.flush().map_err(|_| Error::WriteError)
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, host: &str, port: u16) -> bool {
        let Ok(stream) = TcpStream::connect((host, port)) else {
            return false;
        };
        if stream.set_nonblocking(true).is_err() {
            return false;
        }
        self.stream = Some(stream);
        self.closed = false;
        true
    }

    fn available(&self) -> usize {
        let mut peeked = [0u8; 2048];
        match &self.stream {
            Some(stream) => stream.peek(&mut peeked).unwrap_or(0),
            None => 0,
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some() && !self.closed
    }

    fn stop(&mut self) {
        self.stream = None;
    }
}

#[derive(Debug)]
struct InstantClock(Instant);

impl Clock for InstantClock {
    fn now_ms(&self) -> u64 {
        self.0.elapsed().as_millis() as u64
    }
}

fn poll_until<T: Transport, K: Clock>(
    client: &mut Client<'_, T, K>,
    done: impl Fn(&Client<'_, T, K>) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(15);
    while !done(client) {
        client.poll().expect("session failed");
        assert!(Instant::now() < deadline, "broker did not answer in time");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
#[ignore = "needs a reachable MQTT broker"]
fn test_publish_to_live_broker() {
    dotenv().ok();
    let address = env::var("TEST_MQTT_ADDRESS").unwrap_or("test.mosquitto.org:1883".to_string());
    let (host, port) = address.rsplit_once(':').expect("address must be host:port");
    let port: u16 = port.parse().expect("invalid port");

    let register = ActiveSession::new();
    let options = Options::new(host, port, "libmqtt-test-client-4711").with_keep_alive(30);
    let mut client: Client<_, _> = Client::new(
        TcpTransport::default(),
        InstantClock(Instant::now()),
        options,
        &register,
    );

    client.connect().unwrap();
    poll_until(&mut client, |c| c.connected());

    client
        .publish(false, "libmqtt/test/hello", b"hello from libmqtt")
        .unwrap();
    poll_until(&mut client, |c| c.publish_acknowledged());

    client.disconnect();
    assert!(!client.connected());
}
