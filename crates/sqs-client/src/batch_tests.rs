//! Tests for batch validation and result partitioning.

use super::*;
use crate::model::{
    ChangeMessageVisibilityBatchInput, ChangeMessageVisibilityBatchRequestEntry,
    DeleteMessageBatchInput, DeleteMessageBatchRequestEntry, DeleteMessageBatchResultEntry,
    MessageAttributeValue, SendMessageBatchInput, SendMessageBatchRequestEntry,
};
use crate::validation::FaultKind;

const QUEUE_URL: &str = "https://sqs.us-east-1.amazonaws.com/123456789012/orders";

fn delete_ok(id: &str) -> BatchOutcome<DeleteMessageBatchResultEntry> {
    BatchOutcome::Succeeded(DeleteMessageBatchResultEntry { id: id.to_string() })
}

fn delete_failed(id: &str, code: &str, sender_fault: bool) -> BatchOutcome<DeleteMessageBatchResultEntry> {
    BatchOutcome::Failed(BatchResultErrorEntry {
        id: id.to_string(),
        code: code.to_string(),
        message: Some("failed".to_string()),
        sender_fault,
    })
}

// ============================================================================
// Batch Request Validator
// ============================================================================

mod validation {
    use super::*;

    #[test]
    fn test_valid_unique_complete_entries_pass() {
        let input = SendMessageBatchInput::new(QUEUE_URL)
            .with_entry(SendMessageBatchRequestEntry::new("a", "x"))
            .with_entry(
                SendMessageBatchRequestEntry::new("b", "y")
                    .with_message_attribute("trace", MessageAttributeValue::string("t-1")),
            );

        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_missing_body_reports_entry_position() {
        let input = SendMessageBatchInput::new(QUEUE_URL)
            .with_entry(SendMessageBatchRequestEntry::new("a", "x"))
            .with_entry(SendMessageBatchRequestEntry {
                id: Some("b".to_string()),
                ..Default::default()
            });

        let err = input.validate().unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.faults()[0].to_string(), "Entries[1].MessageBody is required");
        assert_eq!(err.context(), "SendMessageBatchInput");
    }

    #[test]
    fn test_duplicate_id_flags_only_the_later_entry() {
        let input = DeleteMessageBatchInput::new(QUEUE_URL)
            .with_entry(DeleteMessageBatchRequestEntry::new("a", "r1"))
            .with_entry(DeleteMessageBatchRequestEntry::new("a", "r2"));

        let err = input.validate().unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(
            err.faults()[0].to_string(),
            "Entries[1].Id: Id must be unique within the request"
        );
        assert_eq!(err.faults()[0].kind(), &FaultKind::DuplicateId);
    }

    #[test]
    fn test_three_copies_of_an_id_give_two_duplicate_faults() {
        let input = DeleteMessageBatchInput::new(QUEUE_URL)
            .with_entry(DeleteMessageBatchRequestEntry::new("a", "r1"))
            .with_entry(DeleteMessageBatchRequestEntry::new("b", "r2"))
            .with_entry(DeleteMessageBatchRequestEntry::new("a", "r3"))
            .with_entry(DeleteMessageBatchRequestEntry::new("a", "r4"));

        let err = input.validate().unwrap_err();
        assert_eq!(err.paths(), vec!["Entries[2].Id", "Entries[3].Id"]);
    }

    #[test]
    fn test_missing_queue_url_and_entries() {
        let input = ChangeMessageVisibilityBatchInput::default();

        let err = input.validate().unwrap_err();
        assert_eq!(err.paths(), vec!["QueueUrl", "Entries"]);
        assert!(err
            .faults()
            .iter()
            .all(|fault| fault.kind() == &FaultKind::Required));
    }

    #[test]
    fn test_empty_entries_is_missing_entries() {
        let input = DeleteMessageBatchInput {
            queue_url: Some(QUEUE_URL.to_string()),
            entries: Some(Vec::new()),
        };

        let err = input.validate().unwrap_err();
        assert_eq!(err.paths(), vec!["Entries"]);
    }

    #[test]
    fn test_empty_queue_url_is_missing() {
        let input = DeleteMessageBatchInput::new("")
            .with_entry(DeleteMessageBatchRequestEntry::new("a", "r1"));

        let err = input.validate().unwrap_err();
        assert_eq!(err.paths(), vec!["QueueUrl"]);
    }

    #[test]
    fn test_fault_order_is_top_level_then_entries_then_uniqueness() {
        let input = ChangeMessageVisibilityBatchInput {
            queue_url: None,
            entries: Some(vec![
                ChangeMessageVisibilityBatchRequestEntry::new("a", "r1"),
                ChangeMessageVisibilityBatchRequestEntry {
                    id: Some("a".to_string()),
                    ..Default::default()
                },
                ChangeMessageVisibilityBatchRequestEntry {
                    receipt_handle: Some("r3".to_string()),
                    ..Default::default()
                },
            ]),
        };

        let err = input.validate().unwrap_err();
        assert_eq!(
            err.paths(),
            vec![
                "QueueUrl",
                "Entries[1].ReceiptHandle",
                "Entries[2].Id",
                "Entries[1].Id",
            ]
        );
    }

    #[test]
    fn test_two_missing_ids_collide() {
        let input = DeleteMessageBatchInput::new(QUEUE_URL)
            .with_entry(DeleteMessageBatchRequestEntry {
                receipt_handle: Some("r1".to_string()),
                ..Default::default()
            })
            .with_entry(DeleteMessageBatchRequestEntry {
                id: Some(String::new()),
                receipt_handle: Some("r2".to_string()),
            });

        let err = input.validate().unwrap_err();
        assert_eq!(
            err.paths(),
            vec!["Entries[0].Id", "Entries[1].Id", "Entries[1].Id"]
        );
        assert_eq!(err.faults()[2].kind(), &FaultKind::DuplicateId);
    }

    #[test]
    fn test_nested_attribute_fault_is_fully_scoped() {
        let input = SendMessageBatchInput::new(QUEUE_URL).with_entry(
            SendMessageBatchRequestEntry::new("a", "x").with_message_attribute(
                "trace",
                MessageAttributeValue {
                    string_value: Some("t-1".to_string()),
                    ..Default::default()
                },
            ),
        );

        let err = input.validate().unwrap_err();
        assert_eq!(
            err.faults()[0].to_string(),
            "Entries[0].MessageAttributes[\"trace\"].DataType is required"
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let input = SendMessageBatchInput::new(QUEUE_URL)
            .with_entry(SendMessageBatchRequestEntry::new("a", "x"))
            .with_entry(SendMessageBatchRequestEntry::default())
            .with_entry(SendMessageBatchRequestEntry::new("a", "z"));

        let first = input.validate().unwrap_err();
        let second = input.validate().unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_id_faults_on_unique_ids_is_empty() {
        let entries = vec![
            DeleteMessageBatchRequestEntry::new("a", "r1"),
            DeleteMessageBatchRequestEntry::new("b", "r2"),
        ];
        assert!(duplicate_id_faults(&entries).is_empty());
    }
}

// ============================================================================
// Result Partitioner
// ============================================================================

mod partitioning {
    use super::*;

    #[test]
    fn test_mixed_outcomes_keep_response_order() {
        let outcomes = vec![
            delete_ok("1"),
            delete_failed("2", "ReceiptHandleIsInvalid", true),
            delete_ok("3"),
        ];

        let output = partition(&["1", "2", "3"], outcomes).unwrap();

        let successful: Vec<&str> = output.successful.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(successful, vec!["1", "3"]);
        assert_eq!(output.failed.len(), 1);
        assert_eq!(output.failed[0].id, "2");
        assert_eq!(output.failed[0].code, "ReceiptHandleIsInvalid");
        assert!(output.failed[0].sender_fault);
        assert!(output.has_failures());
        assert_eq!(output.len(), 3);
    }

    #[test]
    fn test_response_order_wins_over_request_order() {
        let outcomes = vec![delete_ok("c"), delete_ok("a"), delete_ok("b")];

        let output = partition(&["a", "b", "c"], outcomes).unwrap();

        let successful: Vec<&str> = output.successful.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(successful, vec!["c", "a", "b"]);
        assert!(!output.has_failures());
    }

    #[test]
    fn test_sender_fault_passes_through() {
        let outcomes = vec![
            delete_failed("a", "InternalError", false),
            delete_failed("b", "ReceiptHandleIsInvalid", true),
        ];

        let output = partition(&["a", "b"], outcomes).unwrap();

        assert!(output.successful.is_empty());
        assert!(!output.failed[0].sender_fault);
        assert!(output.failed[1].sender_fault);
    }

    #[test]
    fn test_missing_outcome_is_rejected() {
        let outcomes = vec![delete_ok("1"), delete_ok("3")];

        let err = partition(&["1", "2", "3"], outcomes).unwrap_err();
        assert_eq!(
            err,
            PartitionError::MissingIds {
                ids: vec!["2".to_string()]
            }
        );
    }

    #[test]
    fn test_unknown_outcome_is_rejected() {
        let outcomes = vec![delete_ok("1"), delete_ok("9")];

        let err = partition(&["1"], outcomes).unwrap_err();
        assert_eq!(
            err,
            PartitionError::UnknownId {
                id: "9".to_string()
            }
        );
    }

    #[test]
    fn test_repeated_outcome_is_rejected() {
        let outcomes = vec![
            delete_ok("1"),
            delete_failed("1", "InternalError", false),
        ];

        let err = partition(&["1", "2"], outcomes).unwrap_err();
        assert_eq!(
            err,
            PartitionError::DuplicateId {
                id: "1".to_string()
            }
        );
    }
}

// ============================================================================
// Envelope helpers
// ============================================================================

mod envelope {
    use super::*;

    #[test]
    fn test_check_limits_rejects_too_many_entries() {
        let input = DeleteMessageBatchInput::new(QUEUE_URL).with_entries(
            (0..11).map(|i| DeleteMessageBatchRequestEntry::new(i.to_string(), "r")),
        );

        assert!(matches!(
            input.check_limits(MAX_BATCH_ENTRIES, MAX_BATCH_PAYLOAD_BYTES),
            Err(SqsError::BatchTooLarge {
                size: 11,
                max_size: 10
            })
        ));
    }

    #[test]
    fn test_check_limits_rejects_large_payload() {
        let body = "x".repeat(100_000);
        let input = SendMessageBatchInput::new(QUEUE_URL).with_entries(
            (0..3).map(|i| SendMessageBatchRequestEntry::new(i.to_string(), body.clone())),
        );

        assert_eq!(input.payload_size(), 300_000);
        assert!(matches!(
            input.check_limits(MAX_BATCH_ENTRIES, MAX_BATCH_PAYLOAD_BYTES),
            Err(SqsError::PayloadTooLarge { size: 300_000, .. })
        ));
    }

    #[test]
    fn test_check_limits_accepts_full_batch() {
        let input = DeleteMessageBatchInput::new(QUEUE_URL).with_entries(
            (0..10).map(|i| DeleteMessageBatchRequestEntry::new(i.to_string(), "r")),
        );

        assert!(input
            .check_limits(MAX_BATCH_ENTRIES, MAX_BATCH_PAYLOAD_BYTES)
            .is_ok());
    }

    #[test]
    fn test_write_params_numbers_entries_from_one() {
        let input = ChangeMessageVisibilityBatchInput::new(QUEUE_URL)
            .with_entry(ChangeMessageVisibilityBatchRequestEntry::new("a", "r1"))
            .with_entry(
                ChangeMessageVisibilityBatchRequestEntry::new("b", "r2").with_visibility_timeout(60),
            );

        let mut params = QueryParams::new();
        input.write_params(&mut params);

        assert_eq!(params.get("QueueUrl"), Some(QUEUE_URL));
        assert_eq!(
            params.get("ChangeMessageVisibilityBatchRequestEntry.1.Id"),
            Some("a")
        );
        assert_eq!(
            params.get("ChangeMessageVisibilityBatchRequestEntry.2.ReceiptHandle"),
            Some("r2")
        );
        assert_eq!(
            params.get("ChangeMessageVisibilityBatchRequestEntry.2.VisibilityTimeout"),
            Some("60")
        );
        assert!(!params.contains_key("ChangeMessageVisibilityBatchRequestEntry.1.VisibilityTimeout"));
    }

    #[test]
    fn test_read_output_partitions_against_request() {
        let input = DeleteMessageBatchInput::new(QUEUE_URL)
            .with_entry(DeleteMessageBatchRequestEntry::new("1", "r1"))
            .with_entry(DeleteMessageBatchRequestEntry::new("2", "r2"))
            .with_entry(DeleteMessageBatchRequestEntry::new("3", "r3"));

        let xml = "<DeleteMessageBatchResponse><DeleteMessageBatchResult>\
            <DeleteMessageBatchResultEntry><Id>1</Id></DeleteMessageBatchResultEntry>\
            <BatchResultErrorEntry><Id>2</Id><Code>ReceiptHandleIsInvalid</Code>\
            <Message>bad handle</Message><SenderFault>true</SenderFault></BatchResultErrorEntry>\
            <DeleteMessageBatchResultEntry><Id>3</Id></DeleteMessageBatchResultEntry>\
            </DeleteMessageBatchResult></DeleteMessageBatchResponse>";
        let root = XmlElement::parse(xml).unwrap();

        let output = input.read_output(&root).unwrap();
        assert_eq!(output.successful.len(), 2);
        assert_eq!(output.failed[0].message.as_deref(), Some("bad handle"));
    }

    #[test]
    fn test_read_output_rejects_incomplete_response() {
        let input = DeleteMessageBatchInput::new(QUEUE_URL)
            .with_entry(DeleteMessageBatchRequestEntry::new("1", "r1"))
            .with_entry(DeleteMessageBatchRequestEntry::new("2", "r2"));

        let xml = "<DeleteMessageBatchResponse><DeleteMessageBatchResult>\
            <DeleteMessageBatchResultEntry><Id>1</Id></DeleteMessageBatchResultEntry>\
            </DeleteMessageBatchResult></DeleteMessageBatchResponse>";
        let root = XmlElement::parse(xml).unwrap();

        assert!(matches!(
            input.read_output(&root),
            Err(SqsError::IncompleteBatchResponse(PartitionError::MissingIds { .. }))
        ));
    }
}

// ============================================================================
// Loading batch inputs from files
// ============================================================================

mod serde_files {
    use super::*;
    use serde::de::DeserializeOwned;

    fn load<E: BatchEntry + DeserializeOwned>(json: &str) -> BatchInput<E> {
        serde_json::from_str(json).unwrap()
    }

    fn paths_of<E: BatchEntry>(input: &BatchInput<E>) -> Vec<String> {
        match input.validate() {
            Ok(()) => Vec::new(),
            Err(err) => err.paths().into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_full_input_loads_for_any_entry_type() {
        let json = format!(
            r#"{{"QueueUrl": "{}", "Entries": [{{"Id": "1", "ReceiptHandle": "r-1"}}]}}"#,
            QUEUE_URL
        );

        let delete: BatchInput<DeleteMessageBatchRequestEntry> = load(&json);
        let visibility: BatchInput<ChangeMessageVisibilityBatchRequestEntry> = load(&json);

        assert_eq!(delete.queue_url.as_deref(), Some(QUEUE_URL));
        assert_eq!(delete.entry_ids(), vec!["1"]);
        assert!(paths_of(&delete).is_empty());
        assert_eq!(visibility.entries()[0].receipt_handle.as_deref(), Some("r-1"));
    }

    #[test]
    fn test_missing_queue_url_loads_as_none() {
        let input: BatchInput<SendMessageBatchRequestEntry> =
            load(r#"{"Entries": [{"Id": "a", "MessageBody": "x"}]}"#);

        assert!(input.queue_url.is_none());
        assert_eq!(paths_of(&input), vec!["QueueUrl"]);
    }

    #[test]
    fn test_empty_object_loads_as_empty_input() {
        let input: BatchInput<DeleteMessageBatchRequestEntry> = load("{}");

        assert_eq!(input, BatchInput::default());
        assert_eq!(paths_of(&input), vec!["QueueUrl", "Entries"]);
    }
}
