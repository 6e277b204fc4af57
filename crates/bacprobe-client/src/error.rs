use bacprobe_core::apdu::BacnetError;
use bacprobe_core::types::{ErrorClass, ErrorCode};
use bacprobe_datalink::DataLinkError;
use thiserror::Error;

/// Failures surfaced by [`BacnetClient`](crate::BacnetClient).
///
/// A request that simply goes unanswered is not an error; see the individual
/// client methods for how "no response" is reported.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("datalink error: {0}")]
    DataLink(#[from] DataLinkError),
    #[error("encode error: {0}")]
    Encode(#[from] bacprobe_core::EncodeError),
    #[error("a discovery window is already open")]
    Busy,
    #[error("all invoke ids are in use")]
    InvokeIdsExhausted,
    #[error("remote service error for service choice {service_choice}")]
    RemoteServiceError {
        service_choice: u8,
        error_class_raw: Option<u32>,
        error_code_raw: Option<u32>,
        error_class: Option<ErrorClass>,
        error_code: Option<ErrorCode>,
    },
    #[error("remote reject reason {reason}")]
    RemoteReject { reason: u8 },
    #[error("remote abort reason {reason} (server={server})")]
    RemoteAbort { reason: u8, server: bool },
    #[error("unexpected response")]
    UnexpectedResponse,
}

impl ClientError {
    /// Whether the remote device answered with an Error, Reject or Abort PDU.
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteServiceError { .. } | Self::RemoteReject { .. } | Self::RemoteAbort { .. }
        )
    }
}

pub(crate) fn remote_service_error(err: BacnetError) -> ClientError {
    ClientError::RemoteServiceError {
        service_choice: err.service_choice,
        error_class_raw: err.error_class,
        error_code_raw: err.error_code,
        error_class: err.error_class.and_then(ErrorClass::from_u32),
        error_code: err.error_code.and_then(ErrorCode::from_u32),
    }
}
