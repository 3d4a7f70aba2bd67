//! Request and response types for every operation.
//!
//! Optional fields are `Option<T>`; validation reports a required field that
//! is `None` (or an empty string) as missing. Maps are `BTreeMap` so that
//! both fault order and wire order are deterministic. All inputs derive
//! serde with the wire field names, so they can be loaded from JSON or YAML.

mod attributes;
mod batch;
mod message;
mod queue;

pub use attributes::{MessageAttributeValue, MessageSystemAttributeValue};
pub use batch::{
    ChangeMessageVisibilityBatchInput, ChangeMessageVisibilityBatchOutput,
    ChangeMessageVisibilityBatchRequestEntry, ChangeMessageVisibilityBatchResultEntry,
    DeleteMessageBatchInput, DeleteMessageBatchOutput, DeleteMessageBatchRequestEntry,
    DeleteMessageBatchResultEntry, SendMessageBatchInput, SendMessageBatchOutput,
    SendMessageBatchRequestEntry, SendMessageBatchResultEntry,
};
pub use message::{
    ChangeMessageVisibilityInput, DeleteMessageInput, Message, ReceiveMessageInput,
    ReceiveMessageOutput, SendMessageInput, SendMessageOutput,
};
pub use queue::{
    AddPermissionInput, CreateQueueInput, CreateQueueOutput, DeleteQueueInput,
    GetQueueAttributesInput, GetQueueAttributesOutput, GetQueueUrlInput, GetQueueUrlOutput,
    ListDeadLetterSourceQueuesInput, ListDeadLetterSourceQueuesOutput, ListQueueTagsInput,
    ListQueueTagsOutput, ListQueuesInput, ListQueuesOutput, PurgeQueueInput,
    RemovePermissionInput, SetQueueAttributesInput, TagQueueInput, UntagQueueInput,
};

use crate::protocol::XmlElement;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;

/// Output of operations that return nothing but a request id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Acknowledged {
    pub request_id: Option<String>,
}

impl Acknowledged {
    pub(crate) fn from_response(response: &XmlElement) -> Self {
        Self {
            request_id: response.request_id(),
        }
    }
}

/// Join a parameter prefix and a field name with a dot
pub(crate) fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
