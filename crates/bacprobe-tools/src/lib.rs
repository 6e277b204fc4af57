//! Shared argument handling for the bacprobe command-line tools.

use bacprobe_client::{BacnetClient, ClientConfig, ClientError};
use bacprobe_core::types::{ObjectId, ObjectType, PropertyValue};
use bacprobe_datalink::{BacnetIpTransport, DataLinkAddress};
use clap::{Args, ValueEnum};
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Socket and timeout flags common to every tool.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Local address to bind.
    #[arg(long, default_value = "0.0.0.0:0")]
    pub bind: SocketAddr,
    /// Destination of broadcast requests.
    #[arg(long, default_value = "255.255.255.255:47808")]
    pub broadcast: SocketAddr,
    /// Response timeout for confirmed requests, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    pub timeout_ms: u64,
}

impl ConnectArgs {
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_bind_addr(self.bind)
            .with_broadcast_addr(self.broadcast)
            .with_response_timeout(Duration::from_millis(self.timeout_ms))
    }

    pub async fn connect(&self) -> Result<BacnetClient<BacnetIpTransport>, ClientError> {
        BacnetClient::bind(self.config()).await
    }
}

/// Parses `ip` or `ip:port`; the port defaults to 47808.
pub fn parse_target(s: &str) -> Result<DataLinkAddress, String> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(DataLinkAddress::Ip(addr));
    }
    s.parse::<IpAddr>()
        .map(DataLinkAddress::bacnet_default)
        .map_err(|_| format!("invalid target '{s}', expected ip or ip:port"))
}

/// How a command-line value is turned into a [`PropertyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ValueKind {
    /// Boolean, unsigned, real or null when the text reads as one, else string.
    #[default]
    Auto,
    Real,
    Unsigned,
    Bool,
    String,
    Null,
}

pub fn parse_value(text: &str, kind: ValueKind) -> Result<PropertyValue, String> {
    let invalid = |what: &str| format!("'{text}' is not a valid {what}");
    match kind {
        ValueKind::Auto => Ok(auto_value(text)),
        ValueKind::Real => text
            .parse::<f32>()
            .map(PropertyValue::Real)
            .map_err(|_| invalid("real")),
        ValueKind::Unsigned => text
            .parse::<u32>()
            .map(PropertyValue::UnsignedInteger)
            .map_err(|_| invalid("unsigned integer")),
        ValueKind::Bool => parse_bool(text)
            .map(PropertyValue::Boolean)
            .ok_or_else(|| invalid("boolean")),
        ValueKind::String => Ok(PropertyValue::CharacterString(text.to_string())),
        ValueKind::Null => Ok(PropertyValue::Null),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "on" | "active" => Some(true),
        "false" | "off" | "inactive" => Some(false),
        _ => None,
    }
}

fn auto_value(text: &str) -> PropertyValue {
    if text.eq_ignore_ascii_case("null") {
        return PropertyValue::Null;
    }
    if let Some(b) = parse_bool(text) {
        return PropertyValue::Boolean(b);
    }
    if let Ok(v) = text.parse::<u32>() {
        return PropertyValue::UnsignedInteger(v);
    }
    match text.parse::<f32>() {
        Ok(v) if v.is_finite() => PropertyValue::Real(v),
        _ => PropertyValue::CharacterString(text.to_string()),
    }
}

/// Parses `property=value` pairs for object creation.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected property=value, got '{s}'"))
}

/// The device object to address at `target`.
///
/// An explicit instance wins. Otherwise a Who-Is is sent straight to the
/// target and the first announced identity is used, falling back to
/// instance 1 when nothing answers.
pub async fn resolve_device(
    client: &BacnetClient<BacnetIpTransport>,
    target: DataLinkAddress,
    instance: Option<u32>,
) -> Result<ObjectId, ClientError> {
    if let Some(instance) = instance {
        return Ok(ObjectId::new(ObjectType::Device, instance)?);
    }
    let announced = client
        .who_is(None, Duration::from_secs(1), Some(target))
        .await?
        .into_iter()
        .find_map(|d| d.device_id);
    match announced {
        Some(id) => Ok(id),
        None => {
            log::debug!("no i-am from {target}, assuming device instance 1");
            Ok(ObjectId::new(ObjectType::Device, 1)?)
        }
    }
}

/// Prints `err` to stderr and exits with status 1.
pub fn fail(context: &str, err: impl Display) -> ! {
    eprintln!("{context}: {err}");
    std::process::exit(1)
}

/// Reports a `Result<bool>` from an acknowledged service and exits 1 unless
/// the device acknowledged.
pub fn report_ack(service: &str, target: DataLinkAddress, result: Result<bool, ClientError>) {
    match result {
        Ok(true) => println!("{service} acknowledged by {target}"),
        Ok(false) => {
            eprintln!("{service}: no response from {target}");
            std::process::exit(1)
        }
        Err(e) => fail(service, e),
    }
}
