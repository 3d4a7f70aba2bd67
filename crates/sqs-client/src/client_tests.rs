//! Tests for the client pipeline against mock transports and a mock server.

use super::*;
use crate::batch::PartitionError;
use crate::error::codes;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::matchers::{any, body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUEUE_URL: &str = "https://sqs.us-east-1.amazonaws.com/123456789012/orders";

// ============================================================================
// Test helpers
// ============================================================================

/// Transport that records every request and answers with a fixed body
struct RecordingTransport {
    response: String,
    calls: Mutex<Vec<(String, QueryParams)>>,
}

impl RecordingTransport {
    fn new(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: response.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, QueryParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, action: &str, params: QueryParams) -> Result<String, SqsError> {
        self.calls
            .lock()
            .unwrap()
            .push((action.to_string(), params));
        Ok(self.response.clone())
    }
}

fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_endpoint(server.uri())
        .with_credentials("AKIDEXAMPLE", "secret")
}

fn xml_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/xml")
        .set_body_string(body)
}

fn error_response(status: u16, code: &str, message: &str) -> ResponseTemplate {
    let body = format!(
        "<ErrorResponse><Error><Type>Sender</Type><Code>{}</Code><Message>{}</Message></Error>\
         <RequestId>req-err</RequestId></ErrorResponse>",
        code, message
    );
    ResponseTemplate::new(status)
        .insert_header("content-type", "text/xml")
        .set_body_string(body)
}

fn delete_batch(ids: &[&str]) -> DeleteMessageBatchInput {
    DeleteMessageBatchInput::new(QUEUE_URL).with_entries(
        ids.iter()
            .map(|id| DeleteMessageBatchRequestEntry::new(*id, format!("receipt-{}", id))),
    )
}

// ============================================================================
// Batch operations over HTTP
// ============================================================================

mod batch_calls {
    use super::*;

    #[tokio::test]
    async fn test_delete_batch_with_partial_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_string_contains("Action=DeleteMessageBatch"))
            .and(body_string_contains("Version=2012-11-05"))
            .and(body_string_contains("DeleteMessageBatchRequestEntry.2.ReceiptHandle=receipt-2"))
            .and(header_exists("authorization"))
            .respond_with(xml_response(
                "<DeleteMessageBatchResponse><DeleteMessageBatchResult>\
                 <DeleteMessageBatchResultEntry><Id>1</Id></DeleteMessageBatchResultEntry>\
                 <BatchResultErrorEntry><Id>2</Id><Code>ReceiptHandleIsInvalid</Code>\
                 <Message>The receipt handle is not valid.</Message>\
                 <SenderFault>true</SenderFault></BatchResultErrorEntry>\
                 <DeleteMessageBatchResultEntry><Id>3</Id></DeleteMessageBatchResultEntry>\
                 </DeleteMessageBatchResult>\
                 <ResponseMetadata><RequestId>req-1</RequestId></ResponseMetadata>\
                 </DeleteMessageBatchResponse>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let output = client
            .delete_message_batch(&delete_batch(&["1", "2", "3"]))
            .await
            .unwrap();

        let successful: Vec<&str> = output.successful.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(successful, vec!["1", "3"]);
        assert_eq!(output.failed.len(), 1);
        assert_eq!(output.failed[0].id, "2");
        assert_eq!(output.failed[0].code, codes::RECEIPT_HANDLE_IS_INVALID);
        assert!(output.failed[0].sender_fault);
    }

    #[tokio::test]
    async fn test_send_batch_success() {
        let server = MockServer::start().await;

        Mock::given(body_string_contains("Action=SendMessageBatch"))
            .and(body_string_contains("SendMessageBatchRequestEntry.1.MessageBody=hello%20world"))
            .respond_with(xml_response(
                "<SendMessageBatchResponse><SendMessageBatchResult>\
                 <SendMessageBatchResultEntry><Id>a</Id><MessageId>m-1</MessageId>\
                 <MD5OfMessageBody>5eb63bbbe01eeed093cb22bb8f5acdc3</MD5OfMessageBody>\
                 </SendMessageBatchResultEntry>\
                 </SendMessageBatchResult></SendMessageBatchResponse>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let input = SendMessageBatchInput::new(QUEUE_URL)
            .with_entry(SendMessageBatchRequestEntry::new("a", "hello world"));

        let output = client.send_message_batch(&input).await.unwrap();
        assert!(!output.has_failures());
        assert_eq!(output.successful[0].message_id, "m-1");
    }

    #[tokio::test]
    async fn test_invalid_batch_is_never_sent() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let input = DeleteMessageBatchInput::new(QUEUE_URL)
            .with_entry(DeleteMessageBatchRequestEntry::new("a", "r1"))
            .with_entry(DeleteMessageBatchRequestEntry::new("a", "r2"));

        match client.delete_message_batch(&input).await {
            Err(SqsError::Validation(err)) => {
                assert_eq!(err.paths(), vec!["Entries[1].Id"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_oversized_batch_is_rejected_locally() {
        let transport = RecordingTransport::new("");
        let client = SqsClient::with_transport(ClientConfig::default(), transport.clone());

        let ids: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

        let result = client.delete_message_batch(&delete_batch(&ids)).await;
        assert!(matches!(
            result,
            Err(SqsError::BatchTooLarge {
                size: 11,
                max_size: 10
            })
        ));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_limits_can_be_left_to_the_service() {
        let server = MockServer::start().await;

        Mock::given(body_string_contains("Action=DeleteMessageBatch"))
            .respond_with(error_response(
                400,
                codes::TOO_MANY_ENTRIES_IN_BATCH_REQUEST,
                "Maximum number of entries per request are 10.",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig {
            enforce_batch_limits: false,
            ..test_config(&server)
        };
        let client = SqsClient::new(config).unwrap();

        let ids: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

        let err = client
            .delete_message_batch(&delete_batch(&ids))
            .await
            .unwrap_err();
        assert_eq!(err.service_code(), Some(codes::TOO_MANY_ENTRIES_IN_BATCH_REQUEST));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_incomplete_batch_response_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(xml_response(
                "<ChangeMessageVisibilityBatchResponse><ChangeMessageVisibilityBatchResult>\
                 <ChangeMessageVisibilityBatchResultEntry><Id>1</Id>\
                 </ChangeMessageVisibilityBatchResultEntry>\
                 </ChangeMessageVisibilityBatchResult></ChangeMessageVisibilityBatchResponse>",
            ))
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let input = ChangeMessageVisibilityBatchInput::new(QUEUE_URL)
            .with_entry(ChangeMessageVisibilityBatchRequestEntry::new("1", "r1"))
            .with_entry(ChangeMessageVisibilityBatchRequestEntry::new("2", "r2"));

        match client.change_message_visibility_batch(&input).await {
            Err(SqsError::IncompleteBatchResponse(PartitionError::MissingIds { ids })) => {
                assert_eq!(ids, vec!["2".to_string()]);
            }
            other => panic!("expected incomplete response error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_call_level_failure_for_missing_queue() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(error_response(
                400,
                codes::QUEUE_DOES_NOT_EXIST,
                "The specified queue does not exist for this wsdl version.",
            ))
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let err = client
            .delete_message_batch(&delete_batch(&["1"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SqsError::QueueDoesNotExist { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let err = client
            .delete_message_batch(&delete_batch(&["1"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SqsError::Service { status: 503, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_malformed_response_is_serialization_error() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(xml_response("<DeleteMessageBatchResponse><Oops>"))
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let err = client
            .delete_message_batch(&delete_batch(&["1"]))
            .await
            .unwrap_err();

        assert!(matches!(err, SqsError::Serialization { .. }));
    }
}

// ============================================================================
// Single-item operations
// ============================================================================

mod single_calls {
    use super::*;

    #[tokio::test]
    async fn test_receive_message_encodes_request() {
        let transport = RecordingTransport::new(
            "<ReceiveMessageResponse><ReceiveMessageResult>\
             <Message><MessageId>m-1</MessageId><ReceiptHandle>rh-1</ReceiptHandle>\
             <Body>hi</Body></Message>\
             </ReceiveMessageResult></ReceiveMessageResponse>",
        );
        let client = SqsClient::with_transport(ClientConfig::default(), transport.clone());

        let input = ReceiveMessageInput::new(QUEUE_URL)
            .with_max_number_of_messages(5)
            .with_wait_time_seconds(10);
        let output = client.receive_message(&input).await.unwrap();

        assert_eq!(output.messages.len(), 1);
        assert_eq!(output.messages[0].receipt_handle.as_deref(), Some("rh-1"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let (action, params) = &calls[0];
        assert_eq!(action, "ReceiveMessage");
        assert_eq!(params.get("MaxNumberOfMessages"), Some("5"));
        assert_eq!(params.get("WaitTimeSeconds"), Some("10"));
    }

    #[tokio::test]
    async fn test_single_delete_validation_reports_all_faults() {
        let transport = RecordingTransport::new("");
        let client = SqsClient::with_transport(ClientConfig::default(), transport.clone());

        let err = client
            .delete_message(&DeleteMessageInput::default())
            .await
            .unwrap_err();

        match err {
            SqsError::Validation(err) => {
                assert_eq!(err.paths(), vec!["QueueUrl", "ReceiptHandle"])
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_queue_url_over_http() {
        let server = MockServer::start().await;

        Mock::given(body_string_contains("Action=GetQueueUrl"))
            .and(body_string_contains("QueueName=orders"))
            .respond_with(xml_response(
                "<GetQueueUrlResponse><GetQueueUrlResult>\
                 <QueueUrl>https://sqs.us-east-1.amazonaws.com/123456789012/orders</QueueUrl>\
                 </GetQueueUrlResult></GetQueueUrlResponse>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let output = client
            .get_queue_url(&GetQueueUrlInput::new("orders"))
            .await
            .unwrap();

        assert_eq!(output.queue_url, QUEUE_URL);
    }

    #[tokio::test]
    async fn test_list_queues_with_prefix() {
        let transport = RecordingTransport::new(
            "<ListQueuesResponse><ListQueuesResult>\
             <QueueUrl>https://sqs.us-east-1.amazonaws.com/123/orders</QueueUrl>\
             <QueueUrl>https://sqs.us-east-1.amazonaws.com/123/orders-dlq</QueueUrl>\
             </ListQueuesResult></ListQueuesResponse>",
        );
        let client = SqsClient::with_transport(ClientConfig::default(), transport.clone());

        let output = client
            .list_queues(&ListQueuesInput::with_prefix("orders"))
            .await
            .unwrap();

        assert_eq!(output.queue_urls.len(), 2);
        assert_eq!(transport.calls()[0].1.get("QueueNamePrefix"), Some("orders"));
    }

    #[tokio::test]
    async fn test_tag_queue_is_acknowledged() {
        let transport = RecordingTransport::new(
            "<TagQueueResponse><ResponseMetadata><RequestId>req-tag</RequestId>\
             </ResponseMetadata></TagQueueResponse>",
        );
        let client = SqsClient::with_transport(ClientConfig::default(), transport.clone());

        let output = client
            .tag_queue(&TagQueueInput::new(QUEUE_URL).with_tag("team", "billing"))
            .await
            .unwrap();

        assert_eq!(output.request_id.as_deref(), Some("req-tag"));
        let (action, params) = &transport.calls()[0];
        assert_eq!(action, "TagQueue");
        assert_eq!(params.get("Tag.1.Key"), Some("team"));
        assert_eq!(params.get("Tag.1.Value"), Some("billing"));
    }

    #[tokio::test]
    async fn test_queue_operation_without_url_is_never_sent() {
        let transport = RecordingTransport::new("<PurgeQueueResponse/>");
        let client = SqsClient::with_transport(ClientConfig::default(), transport.clone());

        let err = client
            .purge_queue(&PurgeQueueInput::default())
            .await
            .unwrap_err();

        match err {
            SqsError::Validation(invalid) => assert_eq!(invalid.paths(), vec!["QueueUrl"]),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(transport.calls().is_empty());
    }
}

// ============================================================================
// Timeouts and cancellation
// ============================================================================

mod interruption {
    use super::*;
    use crate::transport::with_cancellation;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(xml_response("<X/>").set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let config = ClientConfig {
            request_timeout_seconds: 1,
            ..test_config(&server)
        };
        let client = SqsClient::new(config).unwrap();

        let err = client
            .purge_queue(&PurgeQueueInput::new(QUEUE_URL))
            .await
            .unwrap_err();

        assert!(matches!(err, SqsError::Timeout { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_cancelled_call() {
        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(xml_response("<X/>").set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = SqsClient::new(test_config(&server)).unwrap();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        cancel_tx.send(()).unwrap();

        let input = delete_batch(&["1"]);
        let result = with_cancellation(client.delete_message_batch(&input), cancel_rx).await;

        assert!(matches!(result, Err(SqsError::Cancelled)));
    }
}
