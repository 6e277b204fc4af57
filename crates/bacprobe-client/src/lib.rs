//! Async BACnet/IP client.
//!
//! [`BacnetClient`] sends requests over any [`DataLink`](bacprobe_datalink::DataLink)
//! and matches responses to them by invoke id. Discovery collects I-Am
//! announcements for a bounded window. The [`survey`] and [`operations`]
//! modules build the probing workflows of the command-line tools on top of
//! the client, and [`simulator`] provides a small in-memory device for tests.

pub mod client;
pub mod config;
pub mod correlator;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod operations;
pub mod simulator;
pub mod survey;

#[cfg(test)]
mod testing;

pub use bacprobe_core::services::ReinitializeKind;
pub use client::BacnetClient;
pub use config::ClientConfig;
pub use correlator::Reply;
pub use discovery::DiscoveredDevice;
pub use error::ClientError;
pub use operations::{DeviceOperation, ObjectCommand};
pub use simulator::SimulatedDevice;
pub use survey::{ConnectionReport, DeviceReport, PermissionReport, WriteOutcome};
