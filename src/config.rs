//! Configuration surface consumed from an external loader.
//!
//! Loading itself (finding/parsing the TOML file) is ambient plumbing, not
//! core logic, but it is still implemented here so the binary in
//! `src/bin` has something concrete to call.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Opaque 64-bit gateway identifier, transmitted as two big-endian halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayId(pub u64);

impl GatewayId {
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let bytes = hex::decode(s).map_err(|_| ConfigError::InvalidGatewayId(s.to_string()))?;
        if bytes.len() != 8 {
            return Err(ConfigError::InvalidGatewayId(s.to_string()));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes);
        Ok(GatewayId(u64::from_be_bytes(buf)))
    }

    /// The 8 bytes written at offsets 4..11 of every outgoing header.
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterPolicy {
    pub forward_valid_crc: bool,
    pub forward_bad_crc: bool,
    pub forward_no_crc: bool,
}

impl FilterPolicy {
    pub fn admits(&self, status: crate::hal::CrcStatus) -> bool {
        use crate::hal::CrcStatus::*;
        match status {
            Ok => self.forward_valid_crc,
            Bad => self.forward_bad_crc,
            Absent => self.forward_no_crc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stdout,
    Syslog,
    Both,
    None,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gateway_id: GatewayId,
    pub server_address: String,
    pub serv_port_up: u16,
    pub serv_port_down: u16,
    pub keepalive_interval_s: u64,
    pub stat_interval_s: u64,
    /// Half of `push_timeout_ms`: the ack wait budget per receive attempt.
    pub push_timeout_half_ms: u64,
    pub pull_timeout_ms: u64,
    pub filter: FilterPolicy,
    pub logging_level: u8,
    pub log_sink: LogSink,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gateway_id: GatewayId(0),
            server_address: String::new(),
            serv_port_up: 1780,
            serv_port_down: 1782,
            keepalive_interval_s: 5,
            stat_interval_s: 30,
            push_timeout_half_ms: 50,
            pull_timeout_ms: 200,
            filter: FilterPolicy::default(),
            logging_level: 0,
            log_sink: LogSink::Stdout,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {0:?}: {1}")]
    Read(String, std::io::Error),
    #[error("failed to parse configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("gateway_ID must be 16 hex nibbles, got {0:?}")]
    InvalidGatewayId(String),
    #[error("missing mandatory configuration key: {0}")]
    MissingKey(&'static str),
}

/// Mirrors the raw TOML shape; every field optional so defaults can be
/// applied uniformly in `RawConfig::into_config`.
#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(rename = "gateway_ID")]
    gateway_id: Option<String>,
    server_address: Option<String>,
    serv_port_up: Option<u16>,
    serv_port_down: Option<u16>,
    keepalive_interval: Option<u64>,
    stat_interval: Option<u64>,
    push_timeout_ms: Option<u64>,
    pull_timeout_ms: Option<u64>,
    forward_crc_valid: Option<bool>,
    forward_crc_error: Option<bool>,
    forward_crc_disabled: Option<bool>,
    logging_level: Option<u8>,
    stdout: Option<bool>,
    syslog: Option<bool>,
}

impl RawConfig {
    fn into_config(self) -> Result<Config, ConfigError> {
        let gateway_id = GatewayId::from_hex(
            self.gateway_id
                .as_deref()
                .ok_or(ConfigError::MissingKey("gateway_ID"))?,
        )?;
        let server_address = self
            .server_address
            .ok_or(ConfigError::MissingKey("server_address"))?;

        let defaults = Config::default();
        let log_sink = match (self.stdout.unwrap_or(true), self.syslog.unwrap_or(false)) {
            (true, true) => LogSink::Both,
            (true, false) => LogSink::Stdout,
            (false, true) => LogSink::Syslog,
            (false, false) => LogSink::None,
        };

        Ok(Config {
            gateway_id,
            server_address,
            serv_port_up: self.serv_port_up.unwrap_or(defaults.serv_port_up),
            serv_port_down: self.serv_port_down.unwrap_or(defaults.serv_port_down),
            keepalive_interval_s: self
                .keepalive_interval
                .unwrap_or(defaults.keepalive_interval_s),
            stat_interval_s: self.stat_interval.unwrap_or(defaults.stat_interval_s),
            push_timeout_half_ms: self.push_timeout_ms.unwrap_or(100) / 2,
            pull_timeout_ms: self.pull_timeout_ms.unwrap_or(defaults.pull_timeout_ms),
            filter: FilterPolicy {
                forward_valid_crc: self.forward_crc_valid.unwrap_or(true),
                forward_bad_crc: self.forward_crc_error.unwrap_or(false),
                forward_no_crc: self.forward_crc_disabled.unwrap_or(false),
            },
            logging_level: self.logging_level.unwrap_or(defaults.logging_level),
            log_sink,
        })
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(text)?;
    raw.into_config()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gateway_id_round_trips_through_be_bytes() {
        let id = GatewayId::from_hex("00800000a0001234").unwrap();
        assert_eq!(id.to_be_bytes(), [0x00, 0x80, 0x00, 0x00, 0xa0, 0x00, 0x12, 0x34]);
    }

    #[test]
    fn gateway_id_rejects_wrong_length() {
        assert!(GatewayId::from_hex("abcd").is_err());
    }

    #[test]
    fn parses_minimal_config_with_defaults() {
        let cfg = parse(
            r#"
            gateway_ID = "00800000a0001234"
            server_address = "router.example.org"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.serv_port_up, 1780);
        assert_eq!(cfg.serv_port_down, 1782);
        assert_eq!(cfg.push_timeout_half_ms, 50);
        assert_eq!(cfg.keepalive_interval_s, 5);
        assert_eq!(cfg.stat_interval_s, 30);
        assert!(cfg.filter.forward_valid_crc);
        assert!(!cfg.filter.forward_bad_crc);
    }

    #[test]
    fn missing_gateway_id_is_fatal() {
        let err = parse(r#"server_address = "router.example.org""#).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey("gateway_ID")));
    }

    #[test]
    fn filter_policy_admits_per_status() {
        let policy = FilterPolicy {
            forward_valid_crc: true,
            forward_bad_crc: false,
            forward_no_crc: false,
        };
        assert!(policy.admits(crate::hal::CrcStatus::Ok));
        assert!(!policy.admits(crate::hal::CrcStatus::Bad));
        assert!(!policy.admits(crate::hal::CrcStatus::Absent));
    }
}
