//! Object commands and device management operations.
//!
//! Each command is a thin mapping onto one client request, so the results
//! follow the usual convention: `Ok(true)` acknowledged, `Ok(false)` no
//! response, `Err` for local failures and remote errors.

use crate::{BacnetClient, ClientError};
use bacprobe_core::services::device_management::command;
use bacprobe_core::services::request::DEFAULT_PRIORITY;
use bacprobe_core::services::ReinitializeKind;
use bacprobe_core::types::{ObjectId, PropertyId, PropertyValue};
use bacprobe_datalink::{DataLink, DataLinkAddress};

/// Action applied to a single object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectCommand {
    /// Write presentValue at `priority`, 16 when unset.
    SetValue {
        value: PropertyValue,
        priority: Option<u8>,
    },
    /// Clear outOfService.
    Enable,
    /// Set outOfService.
    Disable,
    Reset,
    Acknowledge,
}

impl ObjectCommand {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetValue { .. } => "set_value",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Reset => "reset",
            Self::Acknowledge => "acknowledge",
        }
    }
}

/// Operation applied to a whole device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceOperation {
    Reinitialize(ReinitializeKind),
    Backup,
    Restore { data: String },
    UpdateFirmware { image: String },
    SetTime { time: String },
}

impl DeviceOperation {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Reinitialize(_) => "reinitialize",
            Self::Backup => command::BACKUP,
            Self::Restore { .. } => command::RESTORE,
            Self::UpdateFirmware { .. } => command::UPDATE_FIRMWARE,
            Self::SetTime { .. } => command::SET_TIME,
        }
    }
}

/// Applies `cmd` to `object` on the device at `destination`.
pub async fn execute_command<D: DataLink>(
    client: &BacnetClient<D>,
    destination: DataLinkAddress,
    object: ObjectId,
    cmd: ObjectCommand,
) -> Result<bool, ClientError> {
    log::debug!("executing {} on {object} at {destination}", cmd.name());
    match cmd {
        ObjectCommand::SetValue { value, priority } => {
            client
                .write_property(
                    destination,
                    object,
                    PropertyId::PresentValue,
                    value,
                    Some(priority.unwrap_or(DEFAULT_PRIORITY)),
                )
                .await
        }
        ObjectCommand::Enable => set_out_of_service(client, destination, object, false).await,
        ObjectCommand::Disable => set_out_of_service(client, destination, object, true).await,
        ObjectCommand::Reset => {
            client
                .device_communication_control(destination, object, command::RESET, &[])
                .await
        }
        ObjectCommand::Acknowledge => {
            client
                .acknowledge_alarm(destination, object, "acknowledge")
                .await
        }
    }
}

async fn set_out_of_service<D: DataLink>(
    client: &BacnetClient<D>,
    destination: DataLinkAddress,
    object: ObjectId,
    out_of_service: bool,
) -> Result<bool, ClientError> {
    client
        .write_property(
            destination,
            object,
            PropertyId::OutOfService,
            PropertyValue::Boolean(out_of_service),
            None,
        )
        .await
}

/// Runs `op` against `device` at `destination`.
pub async fn manage_device<D: DataLink>(
    client: &BacnetClient<D>,
    destination: DataLinkAddress,
    device: ObjectId,
    op: DeviceOperation,
) -> Result<bool, ClientError> {
    log::debug!("running {} on {device} at {destination}", op.name());
    let (cmd, argument) = match op {
        DeviceOperation::Reinitialize(kind) => {
            return client.reinitialize_device(destination, kind).await;
        }
        DeviceOperation::Backup => (command::BACKUP, None),
        DeviceOperation::Restore { data } => (command::RESTORE, Some(data)),
        DeviceOperation::UpdateFirmware { image } => (command::UPDATE_FIRMWARE, Some(image)),
        DeviceOperation::SetTime { time } => (command::SET_TIME, Some(time)),
    };
    let arguments: Vec<String> = argument.into_iter().collect();
    client
        .device_communication_control(destination, device, cmd, &arguments)
        .await
}

#[cfg(test)]
mod tests {
    use super::{execute_command, manage_device, DeviceOperation, ObjectCommand};
    use crate::testing::simulated;
    use crate::{ClientConfig, ClientError, ReinitializeKind};
    use bacprobe_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
    use std::time::Duration;

    fn config() -> ClientConfig {
        ClientConfig::default().with_response_timeout(Duration::from_millis(500))
    }

    #[tokio::test]
    async fn set_value_and_out_of_service_reach_the_device() {
        let (client, device, addr) = simulated(20, config());
        let ao = ObjectId::new(ObjectType::AnalogOutput, 2).unwrap();
        device
            .add_object(ao, [(PropertyId::PresentValue, PropertyValue::Real(0.0))])
            .await;

        let set = ObjectCommand::SetValue {
            value: PropertyValue::Real(42.0),
            priority: None,
        };
        assert!(execute_command(&client, addr, ao, set).await.unwrap());
        assert_eq!(
            device.property(ao, PropertyId::PresentValue).await,
            Some(PropertyValue::Real(42.0))
        );

        assert!(execute_command(&client, addr, ao, ObjectCommand::Disable)
            .await
            .unwrap());
        assert_eq!(
            device.property(ao, PropertyId::OutOfService).await,
            Some(PropertyValue::Boolean(true))
        );
        assert!(execute_command(&client, addr, ao, ObjectCommand::Enable)
            .await
            .unwrap());
        assert_eq!(
            device.property(ao, PropertyId::OutOfService).await,
            Some(PropertyValue::Boolean(false))
        );
    }

    #[tokio::test]
    async fn command_on_missing_object_is_a_remote_error() {
        let (client, _device, addr) = simulated(20, config());
        let missing = ObjectId::new(ObjectType::BinaryOutput, 9).unwrap();
        let err = execute_command(&client, addr, missing, ObjectCommand::Enable)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::RemoteServiceError {
                error_code_raw: Some(31),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reset_acknowledge_and_device_operations_are_acknowledged() {
        let (client, device, addr) = simulated(20, config());
        let dev = device.device_id();
        let bi = ObjectId::new(ObjectType::BinaryInput, 1).unwrap();

        assert!(execute_command(&client, addr, bi, ObjectCommand::Reset)
            .await
            .unwrap());
        assert!(execute_command(&client, addr, bi, ObjectCommand::Acknowledge)
            .await
            .unwrap());

        for op in [
            DeviceOperation::Reinitialize(ReinitializeKind::Warmstart),
            DeviceOperation::Backup,
            DeviceOperation::Restore {
                data: "config-blob".into(),
            },
            DeviceOperation::UpdateFirmware {
                image: "fw-2.1.bin".into(),
            },
            DeviceOperation::SetTime {
                time: "2024-01-01T00:00:00".into(),
            },
        ] {
            assert!(manage_device(&client, addr, dev, op).await.unwrap());
        }
    }

    #[tokio::test]
    async fn silent_device_reports_false() {
        let (client, _device, _) = simulated(20, config());
        let nowhere = bacprobe_datalink::DataLinkAddress::Ip("10.9.9.9:47808".parse().unwrap());
        let dev = ObjectId::new(ObjectType::Device, 20).unwrap();
        assert!(!manage_device(&client, nowhere, dev, DeviceOperation::Backup)
            .await
            .unwrap());
    }

    #[test]
    fn names() {
        assert_eq!(ObjectCommand::Reset.name(), "reset");
        assert_eq!(
            DeviceOperation::UpdateFirmware {
                image: String::new()
            }
            .name(),
            "update_firmware"
        );
    }
}
