//! Queue management operations.

use super::Acknowledged;
use crate::error::SqsError;
use crate::protocol::{Operation, QueryParams, XmlElement};
use crate::validation::{require_str, FaultAggregator, InvalidParams, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input that only names a queue by URL
macro_rules! queue_url_input {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "PascalCase", default)]
        pub struct $name {
            pub queue_url: Option<String>,
        }

        impl $name {
            pub fn new(queue_url: impl Into<String>) -> Self {
                Self {
                    queue_url: Some(queue_url.into()),
                }
            }
        }

        impl Validate for $name {
            fn validate(&self) -> Result<(), InvalidParams> {
                let mut faults = FaultAggregator::new(stringify!($name));
                require_str(&mut faults, "QueueUrl", &self.queue_url);
                faults.into_result()
            }
        }
    };
}

queue_url_input!(DeleteQueueInput);
queue_url_input!(
    /// Deletes every message in the queue; takes up to 60 seconds
    PurgeQueueInput
);
queue_url_input!(ListQueueTagsInput);
queue_url_input!(
    /// Lists queues whose redrive policy points at this queue
    ListDeadLetterSourceQueuesInput
);

// ============================================================================
// CreateQueue
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateQueueInput {
    pub queue_name: Option<String>,
    /// Queue attributes such as `VisibilityTimeout` or `FifoQueue`
    pub attributes: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

impl CreateQueueInput {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: Some(queue_name.into()),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

impl Validate for CreateQueueInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("CreateQueueInput");
        require_str(&mut faults, "QueueName", &self.queue_name);
        faults.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateQueueOutput {
    pub queue_url: String,
}

impl Operation for CreateQueueInput {
    const ACTION: &'static str = "CreateQueue";

    type Output = CreateQueueOutput;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueName", self.queue_name.as_deref());
        params.insert_map("Attribute", "Name", &self.attributes);
        params.insert_map("Tag", "Key", &self.tags);
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(CreateQueueOutput {
            queue_url: response.result_of(Self::ACTION)?.required_text("QueueUrl")?,
        })
    }
}

// ============================================================================
// DeleteQueue / PurgeQueue
// ============================================================================

impl Operation for DeleteQueueInput {
    const ACTION: &'static str = "DeleteQueue";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}

impl Operation for PurgeQueueInput {
    const ACTION: &'static str = "PurgeQueue";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}

// ============================================================================
// GetQueueUrl
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GetQueueUrlInput {
    pub queue_name: Option<String>,
    #[serde(rename = "QueueOwnerAWSAccountId")]
    pub queue_owner_aws_account_id: Option<String>,
}

impl GetQueueUrlInput {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: Some(queue_name.into()),
            queue_owner_aws_account_id: None,
        }
    }

    pub fn with_owner_account(mut self, account_id: impl Into<String>) -> Self {
        self.queue_owner_aws_account_id = Some(account_id.into());
        self
    }
}

impl Validate for GetQueueUrlInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("GetQueueUrlInput");
        require_str(&mut faults, "QueueName", &self.queue_name);
        faults.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetQueueUrlOutput {
    pub queue_url: String,
}

impl Operation for GetQueueUrlInput {
    const ACTION: &'static str = "GetQueueUrl";

    type Output = GetQueueUrlOutput;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueName", self.queue_name.as_deref());
        params.insert_opt(
            "QueueOwnerAWSAccountId",
            self.queue_owner_aws_account_id.as_deref(),
        );
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(GetQueueUrlOutput {
            queue_url: response.result_of(Self::ACTION)?.required_text("QueueUrl")?,
        })
    }
}

// ============================================================================
// GetQueueAttributes / SetQueueAttributes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GetQueueAttributesInput {
    pub queue_url: Option<String>,
    pub attribute_names: Vec<String>,
}

impl GetQueueAttributesInput {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            attribute_names: Vec::new(),
        }
    }

    pub fn with_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.attribute_names.push(name.into());
        self
    }
}

impl Validate for GetQueueAttributesInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("GetQueueAttributesInput");
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        faults.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetQueueAttributesOutput {
    pub attributes: BTreeMap<String, String>,
}

impl Operation for GetQueueAttributesInput {
    const ACTION: &'static str = "GetQueueAttributes";

    type Output = GetQueueAttributesOutput;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_list("AttributeName", &self.attribute_names);
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(GetQueueAttributesOutput {
            attributes: response.result_of(Self::ACTION)?.pairs("Attribute", "Name"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SetQueueAttributesInput {
    pub queue_url: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl SetQueueAttributesInput {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl Validate for SetQueueAttributesInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("SetQueueAttributesInput");
        if self.attributes.is_empty() {
            faults.add_required("Attributes");
        }
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        faults.into_result()
    }
}

impl Operation for SetQueueAttributesInput {
    const ACTION: &'static str = "SetQueueAttributes";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_map("Attribute", "Name", &self.attributes);
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}

// ============================================================================
// ListQueues / ListDeadLetterSourceQueues
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListQueuesInput {
    pub queue_name_prefix: Option<String>,
}

impl ListQueuesInput {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            queue_name_prefix: Some(prefix.into()),
        }
    }
}

impl Validate for ListQueuesInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListQueuesOutput {
    pub queue_urls: Vec<String>,
}

impl Operation for ListQueuesInput {
    const ACTION: &'static str = "ListQueues";

    type Output = ListQueuesOutput;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueNamePrefix", self.queue_name_prefix.as_deref());
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(ListQueuesOutput {
            queue_urls: response.result_of(Self::ACTION)?.child_texts("QueueUrl"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListDeadLetterSourceQueuesOutput {
    pub queue_urls: Vec<String>,
}

impl Operation for ListDeadLetterSourceQueuesInput {
    const ACTION: &'static str = "ListDeadLetterSourceQueues";

    type Output = ListDeadLetterSourceQueuesOutput;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(ListDeadLetterSourceQueuesOutput {
            queue_urls: response.result_of(Self::ACTION)?.child_texts("QueueUrl"),
        })
    }
}

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListQueueTagsOutput {
    pub tags: BTreeMap<String, String>,
}

impl Operation for ListQueueTagsInput {
    const ACTION: &'static str = "ListQueueTags";

    type Output = ListQueueTagsOutput;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(ListQueueTagsOutput {
            tags: response.result_of(Self::ACTION)?.pairs("Tag", "Key"),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TagQueueInput {
    pub queue_url: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl TagQueueInput {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

impl Validate for TagQueueInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("TagQueueInput");
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        if self.tags.is_empty() {
            faults.add_required("Tags");
        }
        faults.into_result()
    }
}

impl Operation for TagQueueInput {
    const ACTION: &'static str = "TagQueue";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_map("Tag", "Key", &self.tags);
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UntagQueueInput {
    pub queue_url: Option<String>,
    pub tag_keys: Vec<String>,
}

impl UntagQueueInput {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            tag_keys: Vec::new(),
        }
    }

    pub fn with_tag_key(mut self, key: impl Into<String>) -> Self {
        self.tag_keys.push(key.into());
        self
    }
}

impl Validate for UntagQueueInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("UntagQueueInput");
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        if self.tag_keys.is_empty() {
            faults.add_required("TagKeys");
        }
        faults.into_result()
    }
}

impl Operation for UntagQueueInput {
    const ACTION: &'static str = "UntagQueue";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_list("TagKey", &self.tag_keys);
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}

// ============================================================================
// Permissions
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AddPermissionInput {
    pub queue_url: Option<String>,
    /// Unique identifier of the permission, max 80 characters
    pub label: Option<String>,
    #[serde(rename = "AWSAccountIds")]
    pub aws_account_ids: Vec<String>,
    /// Action names such as `SendMessage`, or `*` for all actions
    pub actions: Vec<String>,
}

impl Validate for AddPermissionInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("AddPermissionInput");
        if self.aws_account_ids.is_empty() {
            faults.add_required("AWSAccountIds");
        }
        if self.actions.is_empty() {
            faults.add_required("Actions");
        }
        require_str(&mut faults, "Label", &self.label);
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        faults.into_result()
    }
}

impl Operation for AddPermissionInput {
    const ACTION: &'static str = "AddPermission";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_opt("Label", self.label.as_deref());
        params.insert_list("AWSAccountId", &self.aws_account_ids);
        params.insert_list("ActionName", &self.actions);
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RemovePermissionInput {
    pub queue_url: Option<String>,
    pub label: Option<String>,
}

impl RemovePermissionInput {
    pub fn new(queue_url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            label: Some(label.into()),
        }
    }
}

impl Validate for RemovePermissionInput {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new("RemovePermissionInput");
        require_str(&mut faults, "Label", &self.label);
        require_str(&mut faults, "QueueUrl", &self.queue_url);
        faults.into_result()
    }
}

impl Operation for RemovePermissionInput {
    const ACTION: &'static str = "RemovePermission";

    type Output = Acknowledged;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        params.insert_opt("Label", self.label.as_deref());
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        Ok(Acknowledged::from_response(response))
    }
}
