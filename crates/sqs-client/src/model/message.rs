//! Single-message operations.

use super::attributes::{
    read_attribute_map, validate_attribute_map, write_attribute_map, MessageAttributeValue,
    MessageSystemAttributeValue,
};
use super::Acknowledged;
use crate::error::SqsError;
use crate::protocol::{Operation, QueryParams, XmlElement};
use crate::validation::{require, require_str, FaultAggregator, InvalidParams, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// SendMessage
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SendMessageInput {
    pub queue_url: Option<String>,
    pub message_body: Option<String>,
    pub delay_seconds: Option<i64>,
    pub message_attributes: BTreeMap<String, MessageAttributeValue>,
    pub message_system_attributes: BTreeMap<String, MessageSystemAttributeValue>,
    pub message_deduplication_id: Option<String>,
    pub message_group_id: Option<String>,
}

impl SendMessageInput {
    pub fn new(queue_url: impl Into<String>, message_body: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
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

    pub fn with_message_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.message_group_id = Some(group_id.into());
        self
    }

    pub fn with_message_deduplication_id(mut self, dedup_id: impl Into<String>) -> Self {
        self.message_deduplication_id = Some(dedup_id.into());
        self
    }
}

impl Validate for SendMessageInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("SendMessageInput");
        require_str(&mut faults, "MessageBody", &self.message_body);
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        validate_attribute_map(&mut faults, "MessageAttributes", &self.message_attributes);
        validate_attribute_map(
            &mut faults,
            "MessageSystemAttributes",
            &self.message_system_attributes,
        );
        faults.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendMessageOutput {
    pub message_id: Option<String>,
    #[serde(rename = "MD5OfMessageBody")]
    pub md5_of_message_body: Option<String>,
    #[serde(rename = "MD5OfMessageAttributes")]
    pub md5_of_message_attributes: Option<String>,
    #[serde(rename = "MD5OfMessageSystemAttributes")]
    pub md5_of_message_system_attributes: Option<String>,
    pub sequence_number: Option<String>,
}

impl Operation for SendMessageInput {
    const ACTION: &'static str = "SendMessage";

    type Output = SendMessageOutput;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_opt("MessageBody", self.message_body.as_deref());
        params.insert_opt("DelaySeconds", self.delay_seconds);
        params.insert_opt(
            "MessageDeduplicationId",
            self.message_deduplication_id.as_deref(),
        );
        params.insert_opt("MessageGroupId", self.message_group_id.as_deref());
        write_attribute_map(params, "", "MessageAttribute", &self.message_attributes);
        write_attribute_map(
            params,
            "",
            "MessageSystemAttribute",
            &self.message_system_attributes,
        );
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        let result = response.result_of(Self::ACTION)?;
        Ok(SendMessageOutput {
            message_id: result.child_text("MessageId"),
            md5_of_message_body: result.child_text("MD5OfMessageBody"),
            md5_of_message_attributes: result.child_text("MD5OfMessageAttributes"),
            md5_of_message_system_attributes: result.child_text("MD5OfMessageSystemAttributes"),
            sequence_number: result.child_text("SequenceNumber"),
        })
    }
}

// ============================================================================
// ReceiveMessage
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReceiveMessageInput {
    pub queue_url: Option<String>,
    /// System attributes to return, e.g. `SentTimestamp` or `All`
    pub attribute_names: Vec<String>,
    /// User attributes to return; `All` or `.*` selects every attribute
    pub message_attribute_names: Vec<String>,
    pub max_number_of_messages: Option<i64>,
    pub visibility_timeout: Option<i64>,
    pub wait_time_seconds: Option<i64>,
    /// FIFO queues only
    pub receive_request_attempt_id: Option<String>,
}

impl ReceiveMessageInput {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            ..Self::default()
        }
    }

    pub fn with_max_number_of_messages(mut self, max: i64) -> Self {
        self.max_number_of_messages = Some(max);
        self
    }

    pub fn with_wait_time_seconds(mut self, seconds: i64) -> Self {
        self.wait_time_seconds = Some(seconds);
        self
    }

    pub fn with_visibility_timeout(mut self, seconds: i64) -> Self {
        self.visibility_timeout = Some(seconds);
        self
    }

    pub fn with_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.attribute_names.push(name.into());
        self
    }

    pub fn with_message_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.message_attribute_names.push(name.into());
        self
    }
}

impl Validate for ReceiveMessageInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("ReceiveMessageInput");
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        faults.into_result()
    }
}

/// A message returned by `ReceiveMessage`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub message_id: Option<String>,
    /// Needed to delete the message or change its visibility
    pub receipt_handle: Option<String>,
    #[serde(rename = "MD5OfBody")]
    pub md5_of_body: Option<String>,
    pub body: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(rename = "MD5OfMessageAttributes", skip_serializing_if = "Option::is_none")]
    pub md5_of_message_attributes: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub message_attributes: BTreeMap<String, MessageAttributeValue>,
}

impl Message {
    fn from_xml(element: &XmlElement) -> Result<Self, SqsError> {
        Ok(Self {
            message_id: element.child_text("MessageId"),
            receipt_handle: element.child_text("ReceiptHandle"),
            md5_of_body: element.child_text("MD5OfBody"),
            body: element.child_text("Body"),
            attributes: element.pairs("Attribute", "Name"),
            md5_of_message_attributes: element.child_text("MD5OfMessageAttributes"),
            message_attributes: read_attribute_map(element, "MessageAttribute")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiveMessageOutput {
    pub messages: Vec<Message>,
}

impl Operation for ReceiveMessageInput {
    const ACTION: &'static str = "ReceiveMessage";

    type Output = ReceiveMessageOutput;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_list("AttributeName", &self.attribute_names);
        params.insert_list("MessageAttributeName", &self.message_attribute_names);
        params.insert_opt("MaxNumberOfMessages", self.max_number_of_messages);
        params.insert_opt("VisibilityTimeout", self.visibility_timeout);
        params.insert_opt("WaitTimeSeconds", self.wait_time_seconds);
        params.insert_opt(
            "ReceiveRequestAttemptId",
            self.receive_request_attempt_id.as_deref(),
        );
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        let result = response.result_of(Self::ACTION)?;
        let messages = result
            .children_named("Message")
            .map(Message::from_xml)
            .collect::<Result<_, _>>()?;
        Ok(ReceiveMessageOutput { messages })
    }
}

// ============================================================================
// DeleteMessage
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeleteMessageInput {
    pub queue_url: Option<String>,
    pub receipt_handle: Option<String>,
}

impl DeleteMessageInput {
    pub fn new(queue_url: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            receipt_handle: Some(receipt_handle.into()),
        }
    }
}

impl Validate for DeleteMessageInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("DeleteMessageInput");
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        require_str(&mut faults, "ReceiptHandle", &self.receipt_handle);
        faults.into_result()
    }
}

impl Operation for DeleteMessageInput {
    const ACTION: &'static str = "DeleteMessage";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_opt("ReceiptHandle", self.receipt_handle.as_deref());
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}

// ============================================================================
// ChangeMessageVisibility
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChangeMessageVisibilityInput {
    pub queue_url: Option<String>,
    pub receipt_handle: Option<String>,
    pub visibility_timeout: Option<i64>,
}

impl ChangeMessageVisibilityInput {
    pub fn new(
        queue_url: impl Into<String>,
        receipt_handle: impl Into<String>,
        visibility_timeout: i64,
    ) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            receipt_handle: Some(receipt_handle.into()),
            visibility_timeout: Some(visibility_timeout),
        }
    }
}

impl Validate for ChangeMessageVisibilityInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("ChangeMessageVisibilityInput");
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        require_str(&mut faults, "ReceiptHandle", &self.receipt_handle);
        require(&mut faults, "VisibilityTimeout", &self.visibility_timeout);
        faults.into_result()
    }
}

impl Operation for ChangeMessageVisibilityInput {
    const ACTION: &'static str = "ChangeMessageVisibility";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_opt("ReceiptHandle", self.receipt_handle.as_deref());
        params.insert_opt("VisibilityTimeout", self.visibility_timeout);
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}
