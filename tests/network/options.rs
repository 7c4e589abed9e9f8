use libmqtt::network::application::mqtt::Options;
use libmqtt::network::application::mqtt::options::{DEFAULT_KEEP_ALIVE_SECONDS, DEFAULT_PORT};
use libmqtt::network::error::Error;

#[test]
fn test_options_from_json() {
    let json = br#"{
        "host": "mqtt.example.net",
        "port": 8883,
        "client_id": "pump-controller",
        "username": "pump",
        "password": "hunter2",
        "keep_alive_seconds": 45
    }"#;
    let options = Options::from_json(json).unwrap();

    assert_eq!(options.host, "mqtt.example.net");
    assert_eq!(options.port, 8883);
    assert_eq!(options.client_id, "pump-controller");
    assert_eq!(options.username, Some("pump"));
    assert_eq!(options.password, Some("hunter2"));
    assert_eq!(options.keep_alive_ms(), Some(45_000));
}

#[test]
fn test_options_defaults() {
    let options = Options::from_json(br#"{"host":"10.0.0.1","client_id":"a"}"#).unwrap();
    assert_eq!(options, Options::new("10.0.0.1", DEFAULT_PORT, "a"));
    assert_eq!(options.keep_alive_seconds, DEFAULT_KEEP_ALIVE_SECONDS);
    assert_eq!(options.username, None);
}

#[test]
fn test_options_invalid_json() {
    assert_eq!(
        Options::from_json(br#"{"host":"10.0.0.1"}"#),
        Err(Error::InvalidConfig)
    );
    assert_eq!(Options::from_json(b"not json"), Err(Error::InvalidConfig));
    assert_eq!(
        Options::from_json(br#"{"host":"","client_id":"a"}"#),
        Err(Error::InvalidAddress)
    );
}

#[test]
fn test_keep_alive_zero_disables() {
    let options = Options::new("h", 1883, "c").with_keep_alive(0);
    assert_eq!(options.keep_alive_ms(), None);
}
