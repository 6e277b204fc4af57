//! BACnet/IP client-side encoding and decoding.
//!
//! `bacprobe-core` holds the data model shared by the bacprobe crates and the
//! codec that turns a [`services::ServiceRequest`] into APDU bytes. Responses
//! are decoded with a deliberately small heuristic value scanner
//! ([`services::value_codec::decode_value`]) rather than a full
//! tag-length-value parser; only the practically-used service subset is
//! covered.
//!
//! # Feature flags
//!
//! - **`serde`**: derives `Serialize`/`Deserialize` on the data model types.

/// APDU headers for confirmed/unconfirmed requests and their responses.
pub mod apdu;
/// Byte reader/writer and the tag bytes used by the request layout.
pub mod encoding;
/// Error types for encoding and decoding operations.
pub mod error;
/// NPDU (network layer) header handling.
pub mod npdu;
/// Service request codec and the response value scanner.
pub mod services;
/// Object identifiers, property identifiers, and property values.
pub mod types;

pub use error::{DecodeError, EncodeError};
