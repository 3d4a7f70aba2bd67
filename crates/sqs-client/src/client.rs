//! Queue service client.
//!
//! Every call runs the same pipeline: validate the input, pre-check batch
//! limits, encode the query parameters, send them through the transport,
//! decode the response and, for batch calls, partition the per-entry
//! outcomes. Inputs that fail validation never reach the transport.

use crate::batch::{failure_codes, BatchEntry, BatchInput, BatchOutput};
use crate::config::ClientConfig;
use crate::error::SqsError;
use crate::model::*;
use crate::protocol::{Operation, QueryParams, XmlElement};
use crate::transport::{HttpTransport, Transport};
use crate::validation::Validate;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Client for the queue service
///
/// Cheap to clone; clones share the transport.
///
/// # Example
///
/// ```no_run
/// use sqs_client::{
///     ClientConfig, DeleteMessageBatchInput, DeleteMessageBatchRequestEntry, SqsClient,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SqsClient::new(ClientConfig::load(None)?)?;
///
/// let input = DeleteMessageBatchInput::new("https://sqs.us-east-1.amazonaws.com/123/orders")
///     .with_entry(DeleteMessageBatchRequestEntry::new("1", "receipt-1"))
///     .with_entry(DeleteMessageBatchRequestEntry::new("2", "receipt-2"));
///
/// let output = client.delete_message_batch(&input).await?;
/// for failed in &output.failed {
///     eprintln!("{} failed: {} (sender fault: {})", failed.id, failed.code, failed.sender_fault);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqsClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl SqsClient {
    /// Create a client that talks HTTP to the configured endpoint
    pub fn new(config: ClientConfig) -> Result<Self, SqsError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run any operation through the validate, send and decode pipeline
    pub async fn execute<O: Operation + Sync>(&self, input: &O) -> Result<O::Output, SqsError> {
        input.validate()?;
        self.dispatch(input).await
    }

    async fn dispatch<O: Operation + Sync>(&self, input: &O) -> Result<O::Output, SqsError> {
        let mut params = QueryParams::new();
        input.write_params(&mut params);

        debug!(action = O::ACTION, params = params.len(), "Dispatching request");
        let body = self.transport.send(O::ACTION, params).await?;

        let response = XmlElement::parse(&body)?;
        input.read_output(&response)
    }

    async fn execute_batch<E>(&self, input: &BatchInput<E>) -> Result<BatchOutput<E::Success>, SqsError>
    where
        E: BatchEntry + Sync,
    {
        input.validate()?;
        if self.config.enforce_batch_limits {
            input.check_limits(
                self.config.max_batch_entries,
                self.config.max_batch_payload_bytes,
            )?;
        }

        let output = self.dispatch(input).await?;

        if output.has_failures() {
            warn!(
                action = E::ACTION,
                succeeded = output.successful.len(),
                failed = output.failed.len(),
                codes = ?failure_codes(&output.failed),
                "Batch completed with failed entries"
            );
        } else {
            debug!(action = E::ACTION, succeeded = output.successful.len(), "Batch completed");
        }

        Ok(output)
    }

    // ------------------------------------------------------------------------
    // Batch operations
    // ------------------------------------------------------------------------

    /// Send up to ten messages in one call
    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url, entries = input.entries().len()))]
    pub async fn send_message_batch(
        &self,
        input: &SendMessageBatchInput,
    ) -> Result<SendMessageBatchOutput, SqsError> {
        self.execute_batch(input).await
    }

    /// Delete up to ten messages in one call
    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url, entries = input.entries().len()))]
    pub async fn delete_message_batch(
        &self,
        input: &DeleteMessageBatchInput,
    ) -> Result<DeleteMessageBatchOutput, SqsError> {
        self.execute_batch(input).await
    }

    /// Change the visibility timeout of up to ten messages in one call
    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url, entries = input.entries().len()))]
    pub async fn change_message_visibility_batch(
        &self,
        input: &ChangeMessageVisibilityBatchInput,
    ) -> Result<ChangeMessageVisibilityBatchOutput, SqsError> {
        self.execute_batch(input).await
    }

    // ------------------------------------------------------------------------
    // Message operations
    // ------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn send_message(&self, input: &SendMessageInput) -> Result<SendMessageOutput, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn receive_message(
        &self,
        input: &ReceiveMessageInput,
    ) -> Result<ReceiveMessageOutput, SqsError> {
        let output = self.execute(input).await?;
        debug!(count = output.messages.len(), "Received messages");
        Ok(output)
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn delete_message(&self, input: &DeleteMessageInput) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn change_message_visibility(
        &self,
        input: &ChangeMessageVisibilityInput,
    ) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }

    // ------------------------------------------------------------------------
    // Queue operations
    // ------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(queue_name = ?input.queue_name))]
    pub async fn create_queue(&self, input: &CreateQueueInput) -> Result<CreateQueueOutput, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn delete_queue(&self, input: &DeleteQueueInput) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_name = ?input.queue_name))]
    pub async fn get_queue_url(&self, input: &GetQueueUrlInput) -> Result<GetQueueUrlOutput, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn get_queue_attributes(
        &self,
        input: &GetQueueAttributesInput,
    ) -> Result<GetQueueAttributesOutput, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn set_queue_attributes(
        &self,
        input: &SetQueueAttributesInput,
    ) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(prefix = ?input.queue_name_prefix))]
    pub async fn list_queues(&self, input: &ListQueuesInput) -> Result<ListQueuesOutput, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn purge_queue(&self, input: &PurgeQueueInput) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn list_queue_tags(
        &self,
        input: &ListQueueTagsInput,
    ) -> Result<ListQueueTagsOutput, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn tag_queue(&self, input: &TagQueueInput) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn untag_queue(&self, input: &UntagQueueInput) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url))]
    pub async fn list_dead_letter_source_queues(
        &self,
        input: &ListDeadLetterSourceQueuesInput,
    ) -> Result<ListDeadLetterSourceQueuesOutput, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url, label = ?input.label))]
    pub async fn add_permission(&self, input: &AddPermissionInput) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }

    #[instrument(skip(self, input), fields(queue_url = ?input.queue_url, label = ?input.label))]
    pub async fn remove_permission(
        &self,
        input: &RemovePermissionInput,
    ) -> Result<Acknowledged, SqsError> {
        self.execute(input).await
    }
}

impl fmt::Debug for SqsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqsClient")
            .field("endpoint", &self.config.endpoint_url())
            .field("region", &self.config.region)
            .finish()
    }
}
