//! Entries and per-entry results of the three batch operations.

use super::attributes::{
    attribute_map_size, validate_attribute_map, write_attribute_map, MessageAttributeValue,
    MessageSystemAttributeValue,
};
use super::join;
use crate::batch::{BatchEntry, BatchInput, BatchOutput, BatchResultEntry};
use crate::error::SqsError;
use crate::protocol::{QueryParams, XmlElement};
use crate::validation::{require_str, FaultAggregator, InvalidParams, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type SendMessageBatchInput = BatchInput<SendMessageBatchRequestEntry>;
pub type SendMessageBatchOutput = BatchOutput<SendMessageBatchResultEntry>;
pub type DeleteMessageBatchInput = BatchInput<DeleteMessageBatchRequestEntry>;
pub type DeleteMessageBatchOutput = BatchOutput<DeleteMessageBatchResultEntry>;
pub type ChangeMessageVisibilityBatchInput = BatchInput<ChangeMessageVisibilityBatchRequestEntry>;
pub type ChangeMessageVisibilityBatchOutput = BatchOutput<ChangeMessageVisibilityBatchResultEntry>;

// ============================================================================
// SendMessageBatch
// ============================================================================

/// One message of a `SendMessageBatch` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SendMessageBatchRequestEntry {
    pub id: Option<String>,
    pub message_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<i64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub message_attributes: BTreeMap<String, MessageAttributeValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub message_system_attributes: BTreeMap<String, MessageSystemAttributeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_deduplication_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_group_id: Option<String>,
}

impl SendMessageBatchRequestEntry {
    pub fn new(id: impl Into<String>, message_body: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            message_body: Some(message_body.into()),
            ..Self::default()
        }
    }

    pub fn with_delay_seconds(mut self, seconds: i64) -> Self {
        self.delay_seconds = Some(seconds);
        self
    }

    pub fn with_message_attribute(
        mut self,
        name: impl Into<String>,
        value: MessageAttributeValue,
    ) -> Self {
        self.message_attributes.insert(name.into(), value);
        self
    }

    pub fn with_message_system_attribute(
        mut self,
        name: impl Into<String>,
        value: MessageSystemAttributeValue,
    ) -> Self {
        self.message_system_attributes.insert(name.into(), value);
        self
    }

    /// FIFO queues only
    pub fn with_message_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.message_group_id = Some(group_id.into());
        self
    }

    /// FIFO queues only
    pub fn with_message_deduplication_id(mut self, dedup_id: impl Into<String>) -> Self {
        self.message_deduplication_id = Some(dedup_id.into());
        self
    }
}

impl Validate for SendMessageBatchRequestEntry {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("SendMessageBatchRequestEntry");
        require_str(&mut faults, "Id", &self.id);
        require_str(&mut faults, "MessageBody", &self.message_body);
        validate_attribute_map(&mut faults, "MessageAttributes", &self.message_attributes);
        validate_attribute_map(
            &mut faults,
            "MessageSystemAttributes",
            &self.message_system_attributes,
        );
        faults.into_result()
    }
}

impl BatchEntry for SendMessageBatchRequestEntry {
    const ACTION: &'static str = "SendMessageBatch";
    const ENTRY_NAME: &'static str = "SendMessageBatchRequestEntry";
    const INPUT_NAME: &'static str = "SendMessageBatchInput";

    type Success = SendMessageBatchResultEntry;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn write_params(&self, prefix: &str, params: &mut QueryParams) {
        params.insert_opt(join(prefix, "Id"), self.id.as_deref());
        params.insert_opt(join(prefix, "MessageBody"), self.message_body.as_deref());
        params.insert_opt(join(prefix, "DelaySeconds"), self.delay_seconds);
        params.insert_opt(
            join(prefix, "MessageDeduplicationId"),
            self.message_deduplication_id.as_deref(),
        );
        params.insert_opt(join(prefix, "MessageGroupId"), self.message_group_id.as_deref());
        write_attribute_map(params, prefix, "MessageAttribute", &self.message_attributes);
        write_attribute_map(
            params,
            prefix,
            "MessageSystemAttribute",
            &self.message_system_attributes,
        );
    }

    fn payload_size(&self) -> usize {
        self.message_body.as_ref().map_or(0, String::len)
            + attribute_map_size(&self.message_attributes)
    }
}

/// Success record of one `SendMessageBatch` entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendMessageBatchResultEntry {
    pub id: String,
    pub message_id: String,
    #[serde(rename = "MD5OfMessageBody")]
    pub md5_of_message_body: String,
    #[serde(rename = "MD5OfMessageAttributes", skip_serializing_if = "Option::is_none")]
    pub md5_of_message_attributes: Option<String>,
    #[serde(
        rename = "MD5OfMessageSystemAttributes",
        skip_serializing_if = "Option::is_none"
    )]
    pub md5_of_message_system_attributes: Option<String>,
    /// FIFO queues only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
}

impl BatchResultEntry for SendMessageBatchResultEntry {
    const ENTRY_NAME: &'static str = "SendMessageBatchResultEntry";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_xml(element: &XmlElement) -> Result<Self, SqsError> {
        Ok(Self {
            id: element.required_text("Id")?,
            message_id: element.required_text("MessageId")?,
            md5_of_message_body: element.required_text("MD5OfMessageBody")?,
            md5_of_message_attributes: element.child_text("MD5OfMessageAttributes"),
            md5_of_message_system_attributes: element.child_text("MD5OfMessageSystemAttributes"),
            sequence_number: element.child_text("SequenceNumber"),
        })
    }
}

// ============================================================================
// DeleteMessageBatch
// ============================================================================

/// One receipt handle of a `DeleteMessageBatch` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeleteMessageBatchRequestEntry {
    pub id: Option<String>,
    pub receipt_handle: Option<String>,
}

impl DeleteMessageBatchRequestEntry {
    pub fn new(id: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            receipt_handle: Some(receipt_handle.into()),
        }
    }
}

impl Validate for DeleteMessageBatchRequestEntry {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("DeleteMessageBatchRequestEntry");
        require_str(&mut faults, "Id", &self.id);
        require_str(&mut faults, "ReceiptHandle", &self.receipt_handle);
        faults.into_result()
    }
}

impl BatchEntry for DeleteMessageBatchRequestEntry {
    const ACTION: &'static str = "DeleteMessageBatch";
    const ENTRY_NAME: &'static str = "DeleteMessageBatchRequestEntry";
    const INPUT_NAME: &'static str = "DeleteMessageBatchInput";

    type Success = DeleteMessageBatchResultEntry;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn write_params(&self, prefix: &str, params: &mut QueryParams) {
        params.insert_opt(join(prefix, "Id"), self.id.as_deref());
        params.insert_opt(join(prefix, "ReceiptHandle"), self.receipt_handle.as_deref());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteMessageBatchResultEntry {
    pub id: String,
}

impl BatchResultEntry for DeleteMessageBatchResultEntry {
    const ENTRY_NAME: &'static str = "DeleteMessageBatchResultEntry";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_xml(element: &XmlElement) -> Result<Self, SqsError> {
        Ok(Self {
            id: element.required_text("Id")?,
        })
    }
}

// ============================================================================
// ChangeMessageVisibilityBatch
// ============================================================================

/// One receipt handle and new timeout of a `ChangeMessageVisibilityBatch` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChangeMessageVisibilityBatchRequestEntry {
    pub id: Option<String>,
    pub receipt_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_timeout: Option<i64>,
}

impl ChangeMessageVisibilityBatchRequestEntry {
    pub fn new(id: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            receipt_handle: Some(receipt_handle.into()),
            visibility_timeout: None,
        }
    }

    pub fn with_visibility_timeout(mut self, seconds: i64) -> Self {
        self.visibility_timeout = Some(seconds);
        self
    }
}

impl Validate for ChangeMessageVisibilityBatchRequestEntry {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("ChangeMessageVisibilityBatchRequestEntry");
        require_str(&mut faults, "Id", &self.id);
        require_str(&mut faults, "ReceiptHandle", &self.receipt_handle);
        faults.into_result()
    }
}

impl BatchEntry for ChangeMessageVisibilityBatchRequestEntry {
    const ACTION: &'static str = "ChangeMessageVisibilityBatch";
    const ENTRY_NAME: &'static str = "ChangeMessageVisibilityBatchRequestEntry";
    const INPUT_NAME: &'static str = "ChangeMessageVisibilityBatchInput";

    type Success = ChangeMessageVisibilityBatchResultEntry;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn write_params(&self, prefix: &str, params: &mut QueryParams) {
        params.insert_opt(join(prefix, "Id"), self.id.as_deref());
        params.insert_opt(join(prefix, "ReceiptHandle"), self.receipt_handle.as_deref());
        params.insert_opt(join(prefix, "VisibilityTimeout"), self.visibility_timeout);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeMessageVisibilityBatchResultEntry {
    pub id: String,
}

impl BatchResultEntry for ChangeMessageVisibilityBatchResultEntry {
    const ENTRY_NAME: &'static str = "ChangeMessageVisibilityBatchResultEntry";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_xml(element: &XmlElement) -> Result<Self, SqsError> {
        Ok(Self {
            id: element.required_text("Id")?,
        })
    }
}
