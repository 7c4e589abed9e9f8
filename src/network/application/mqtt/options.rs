//! Connection configuration for the MQTT client.

use crate::network::error::Error;
use serde::Deserialize;

/// Standard unencrypted MQTT port.
pub const DEFAULT_PORT: u16 = 1883;
/// Keep-alive used when none is configured.
pub const DEFAULT_KEEP_ALIVE_SECONDS: u16 = 300;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_keep_alive() -> u16 {
    DEFAULT_KEEP_ALIVE_SECONDS
}

/// Configuration options for MQTT client connection.
///
/// Every string is borrowed, so options can be built from `'static` literals
/// or parsed in place from a JSON blob stored in flash.
///
/// # Examples
///
/// ```rust
/// use libmqtt::network::application::mqtt::Options;
///
/// let options = Options::new("broker.local", 1883, "my_iot_device")
///     .with_credentials("device", "s3cret")
///     .with_keep_alive(60);
///
/// assert_eq!(options.username, Some("device"));
/// assert_eq!(options.keep_alive_seconds, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Options<'a> {
    /// Broker host name or address.
    #[serde(borrow)]
    pub host: &'a str,

    /// Broker TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The client identifier, must be unique within the broker.
    ///
    /// If a client connects with a client identifier that is already in use,
    /// the broker will disconnect the existing client.
    #[serde(borrow)]
    pub client_id: &'a str,

    /// Optional user name; sets the user name flag in CONNECT.
    #[serde(default, borrow)]
    pub username: Option<&'a str>,

    /// Optional password; sets the password flag in CONNECT.
    #[serde(default, borrow)]
    pub password: Option<&'a str>,

    /// The keep-alive time interval in seconds.
    ///
    /// The client sends a PINGREQ whenever it has been silent this long.
    /// A value of 0 disables keep-alive.
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u16,
}

impl<'a> Options<'a> {
    /// Options without credentials and with the default keep-alive.
    pub fn new(host: &'a str, port: u16, client_id: &'a str) -> Self {
        Self {
            host,
            port,
            client_id,
            username: None,
            password: None,
            keep_alive_seconds: DEFAULT_KEEP_ALIVE_SECONDS,
        }
    }

    /// Set user name and password.
    pub fn with_credentials(mut self, username: &'a str, password: &'a str) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    /// Set the keep-alive interval in seconds.
    pub fn with_keep_alive(mut self, seconds: u16) -> Self {
        self.keep_alive_seconds = seconds;
        self
    }

    /// Parse options from JSON.
    ///
    /// `port` and `keep_alive_seconds` fall back to their defaults, the
    /// credentials to `None`. Strings must not contain escape sequences since
    /// they are borrowed straight from `json`.
    ///
    /// ```rust
    /// use libmqtt::network::application::mqtt::Options;
    ///
    /// let json = br#"{"host":"10.0.0.2","client_id":"node-7","keep_alive_seconds":30}"#;
    /// let options = Options::from_json(json).unwrap();
    ///
    /// assert_eq!(options.host, "10.0.0.2");
    /// assert_eq!(options.port, 1883);
    /// assert_eq!(options.password, None);
    /// ```
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidConfig`] - malformed JSON or missing required fields
    /// * [`Error::InvalidAddress`] - empty host
    pub fn from_json(json: &'a [u8]) -> Result<Self, Error> {
        let (options, _): (Self, usize) =
            serde_json_core::from_slice(json).map_err(|_| Error::InvalidConfig)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the options can be encoded into a CONNECT packet.
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.is_empty() {
            return Err(Error::InvalidAddress);
        }
        let too_long = |s: &str| s.len() > super::packet::MAX_STRING_LEN;
        if too_long(self.client_id)
            || self.username.is_some_and(too_long)
            || self.password.is_some_and(too_long)
        {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }

    /// Keep-alive in milliseconds, `None` when disabled.
    pub fn keep_alive_ms(&self) -> Option<u64> {
        match self.keep_alive_seconds {
            0 => None,
            seconds => Some(u64::from(seconds) * 1000),
        }
    }
}
