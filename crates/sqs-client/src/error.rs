//! Error types for client operations.

use crate::batch::PartitionError;
use crate::validation::InvalidParams;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

/// Error codes returned by the queue service
pub mod codes {
    pub const BATCH_ENTRY_IDS_NOT_DISTINCT: &str =
        "AWS.SimpleQueueService.BatchEntryIdsNotDistinct";
    pub const BATCH_REQUEST_TOO_LONG: &str = "AWS.SimpleQueueService.BatchRequestTooLong";
    pub const EMPTY_BATCH_REQUEST: &str = "AWS.SimpleQueueService.EmptyBatchRequest";
    pub const INVALID_ATTRIBUTE_NAME: &str = "InvalidAttributeName";
    pub const INVALID_BATCH_ENTRY_ID: &str = "AWS.SimpleQueueService.InvalidBatchEntryId";
    pub const INVALID_ID_FORMAT: &str = "InvalidIdFormat";
    pub const INVALID_MESSAGE_CONTENTS: &str = "InvalidMessageContents";
    pub const MESSAGE_NOT_INFLIGHT: &str = "AWS.SimpleQueueService.MessageNotInflight";
    pub const OVER_LIMIT: &str = "OverLimit";
    pub const PURGE_QUEUE_IN_PROGRESS: &str = "AWS.SimpleQueueService.PurgeQueueInProgress";
    pub const QUEUE_DELETED_RECENTLY: &str = "AWS.SimpleQueueService.QueueDeletedRecently";
    pub const QUEUE_DOES_NOT_EXIST: &str = "AWS.SimpleQueueService.NonExistentQueue";
    pub const QUEUE_NAME_EXISTS: &str = "QueueAlreadyExists";
    pub const RECEIPT_HANDLE_IS_INVALID: &str = "ReceiptHandleIsInvalid";
    pub const TOO_MANY_ENTRIES_IN_BATCH_REQUEST: &str =
        "AWS.SimpleQueueService.TooManyEntriesInBatchRequest";
    pub const UNSUPPORTED_OPERATION: &str = "AWS.SimpleQueueService.UnsupportedOperation";
}

/// Call-level error for every client operation
///
/// Per-entry failures of a batch call are not errors; they are reported in
/// the `failed` list of the batch output.
#[derive(Debug, Error)]
pub enum SqsError {
    #[error("Invalid request parameters: {0}")]
    Validation(#[from] InvalidParams),

    #[error("Batch contains {size} entries (max: {max_size})")]
    BatchTooLarge { size: usize, max_size: usize },

    #[error("Batch payload is {size} bytes (max: {max_size})")]
    PayloadTooLarge { size: usize, max_size: usize },

    #[error("Queue does not exist: {message}")]
    QueueDoesNotExist { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Service error ({status}) {code}: {message}")]
    Service {
        code: String,
        message: String,
        status: u16,
        sender_fault: bool,
        request_id: Option<String>,
    },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Malformed response: {message}")]
    Serialization { message: String },

    #[error("Batch response does not match the request: {0}")]
    IncompleteBatchResponse(#[from] PartitionError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl SqsError {
    /// Check if error is transient and the call could succeed when repeated
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::BatchTooLarge { .. } => false,
            Self::PayloadTooLarge { .. } => false,
            Self::QueueDoesNotExist { .. } => false,
            Self::AuthenticationFailed { .. } => false,
            Self::Service {
                status,
                sender_fault,
                code,
                ..
            } => *status >= 500 || !*sender_fault || code == "ThrottlingException",
            Self::Network { .. } => true,
            Self::Timeout { .. } => true,
            Self::Cancelled => false,
            Self::Serialization { .. } => false,
            Self::IncompleteBatchResponse(_) => false,
            Self::Configuration(_) => false,
        }
    }

    /// Service error code, if the error came from the remote side
    pub fn service_code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            Self::QueueDoesNotExist { .. } => Some(codes::QUEUE_DOES_NOT_EXIST),
            _ => None,
        }
    }

    pub(crate) fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Configuration parsing failed: {message}")]
    Parsing { message: String },
}
