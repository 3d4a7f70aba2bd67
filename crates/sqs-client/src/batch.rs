//! Batch operation contract.
//!
//! A batch call carries up to ten independent entries, each tagged with a
//! caller-chosen id. The request as a whole is validated up front: the
//! envelope, every entry and the uniqueness of the ids. Once dispatched,
//! every entry succeeds or fails on its own and the response reports one
//! outcome per id. [`partition`] turns those outcomes into a
//! [`BatchOutput`] and rejects responses that do not account for every id
//! exactly once.
//!
//! The three batch inputs share one generic envelope, [`BatchInput`], and
//! differ only in their entry type:
//!
//! ```
//! use sqs_client::{DeleteMessageBatchInput, DeleteMessageBatchRequestEntry, Validate};
//!
//! let input = DeleteMessageBatchInput::new("https://sqs.us-east-1.amazonaws.com/123/orders")
//!     .with_entry(DeleteMessageBatchRequestEntry::new("a", "receipt-a"))
//!     .with_entry(DeleteMessageBatchRequestEntry::new("a", "receipt-b"));
//!
//! let err = input.validate().unwrap_err();
//! assert_eq!(err.paths(), vec!["Entries[1].Id"]);
//! ```

use crate::error::SqsError;
use crate::protocol::{Operation, QueryParams, XmlElement};
use crate::validation::{FaultAggregator, InvalidParams, Validate, ValidationFault};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;

/// Maximum number of entries the service accepts in one batch call
pub const MAX_BATCH_ENTRIES: usize = 10;

/// Maximum aggregate payload of one batch call, in bytes
pub const MAX_BATCH_PAYLOAD_BYTES: usize = 262_144;

/// One caller-supplied sub-request of a batch call
pub trait BatchEntry: Validate {
    /// Query action of the batch call, e.g. `DeleteMessageBatch`
    const ACTION: &'static str;

    /// Wire name of one entry, e.g. `DeleteMessageBatchRequestEntry`
    const ENTRY_NAME: &'static str;

    /// Name of the batch input, used as validation context
    const INPUT_NAME: &'static str;

    /// Per-entry success record returned by the service
    type Success: BatchResultEntry;

    /// Caller-chosen id correlating this entry with its outcome
    fn id(&self) -> Option<&str>;

    /// Write this entry's fields under `prefix` (e.g. `...RequestEntry.3`)
    fn write_params(&self, prefix: &str, params: &mut QueryParams);

    /// Bytes this entry counts towards the aggregate payload limit
    fn payload_size(&self) -> usize {
        0
    }
}

/// Per-entry success record of a batch call
pub trait BatchResultEntry: Sized {
    /// Wire name of the success element, e.g. `SendMessageBatchResultEntry`
    const ENTRY_NAME: &'static str;

    fn id(&self) -> &str;

    fn from_xml(element: &XmlElement) -> Result<Self, SqsError>;
}

/// Failure record for one entry of a batch call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchResultErrorEntry {
    pub id: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// `true` when the caller caused the failure, `false` when the service did
    pub sender_fault: bool,
}

impl BatchResultErrorEntry {
    const ENTRY_NAME: &'static str = "BatchResultErrorEntry";

    fn from_xml(element: &XmlElement) -> Result<Self, SqsError> {
        Ok(Self {
            id: element.required_text("Id")?,
            code: element.required_text("Code")?,
            message: element.child_text("Message"),
            sender_fault: element.child_parsed("SenderFault")?.unwrap_or(false),
        })
    }
}

/// Result of a batch call that reached the service
///
/// Both lists keep the order in which the service reported the entries.
/// Together they account for every entry of the request exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchOutput<S> {
    pub successful: Vec<S>,
    pub failed: Vec<BatchResultErrorEntry>,
}

impl<S> BatchOutput<S> {
    /// `true` when at least one entry failed
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> Default for BatchOutput<S> {
    fn default() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Outcome of one entry as reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome<S> {
    Succeeded(S),
    Failed(BatchResultErrorEntry),
}

impl<S: BatchResultEntry> BatchOutcome<S> {
    pub fn id(&self) -> &str {
        match self {
            Self::Succeeded(entry) => entry.id(),
            Self::Failed(entry) => &entry.id,
        }
    }
}

/// A batch response that does not match its request one-to-one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("response reports id '{id}' which was not in the request")]
    UnknownId { id: String },

    #[error("response reports id '{id}' more than once")]
    DuplicateId { id: String },

    #[error("response has no outcome for id(s) {ids:?}")]
    MissingIds { ids: Vec<String> },
}

/// Split per-entry outcomes into successful and failed lists
///
/// Outcomes are taken in response order and each list preserves it. Every
/// id in `request_ids` must be reported exactly once; anything else is a
/// contract violation by the remote side.
pub fn partition<S: BatchResultEntry>(
    request_ids: &[&str],
    outcomes: Vec<BatchOutcome<S>>,
) -> Result<BatchOutput<S>, PartitionError> {
    let mut pending: HashSet<&str> = request_ids.iter().copied().collect();
    let mut reported: HashSet<String> = HashSet::new();
    let mut output = BatchOutput::default();

    for outcome in outcomes {
        let id = outcome.id().to_string();
        if !pending.remove(id.as_str()) {
            return Err(if reported.contains(&id) {
                PartitionError::DuplicateId { id }
            } else {
                PartitionError::UnknownId { id }
            });
        }
        reported.insert(id);

        match outcome {
            BatchOutcome::Succeeded(entry) => output.successful.push(entry),
            BatchOutcome::Failed(entry) => output.failed.push(entry),
        }
    }

    if !pending.is_empty() {
        let ids = request_ids
            .iter()
            .filter(|id| pending.contains(*id))
            .map(|id| id.to_string())
            .collect();
        return Err(PartitionError::MissingIds { ids });
    }

    Ok(output)
}

/// Flag every entry whose id was already used by an earlier entry
///
/// Entries are scanned in order; the first occurrence of an id is never
/// flagged. A missing id and an empty id are the same id here.
pub fn duplicate_id_faults<E: BatchEntry>(entries: &[E]) -> Vec<ValidationFault> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut faults = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if !seen.insert(entry.id().unwrap_or("")) {
            faults.push(ValidationFault::duplicate_id(format!("Entries[{}].Id", i)));
        }
    }
    faults
}

/// Envelope shared by every batch call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchInput<E> {
    pub queue_url: Option<String>,
    pub entries: Option<Vec<E>>,
}

impl<E> Default for BatchInput<E> {
    fn default() -> Self {
        Self {
            queue_url: None,
            entries: None,
        }
    }
}

impl<E: BatchEntry> BatchInput<E> {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: Some(queue_url.into()),
            entries: None,
        }
    }

    pub fn with_entry(mut self, entry: E) -> Self {
        self.entries.get_or_insert_with(Vec::new).push(entry);
        self
    }

    pub fn with_entries(mut self, entries: impl IntoIterator<Item = E>) -> Self {
        self.entries.get_or_insert_with(Vec::new).extend(entries);
        self
    }

    pub fn entries(&self) -> &[E] {
        self.entries.as_deref().unwrap_or(&[])
    }

    /// Ids of all entries in request order
    pub fn entry_ids(&self) -> Vec<&str> {
        self.entries()
            .iter()
            .map(|entry| entry.id().unwrap_or(""))
            .collect()
    }

    /// Aggregate payload of all entries
    pub fn payload_size(&self) -> usize {
        self.entries().iter().map(BatchEntry::payload_size).sum()
    }

    /// Reject calls the service would refuse as a whole for their size
    pub fn check_limits(&self, max_entries: usize, max_payload_bytes: usize) -> Result<(), SqsError> {
        let size = self.entries().len();
        if size > max_entries {
            return Err(SqsError::BatchTooLarge {
                size,
                max_size: max_entries,
            });
        }

        let payload = self.payload_size();
        if payload > max_payload_bytes {
            return Err(SqsError::PayloadTooLarge {
                size: payload,
                max_size: max_payload_bytes,
            });
        }

        Ok(())
    }
}

impl<E: BatchEntry> Validate for BatchInput<E> {
    fn validate(&self) -> Result<(), InvalidParams> {
        let mut faults = FaultAggregator::new(E::INPUT_NAME);

        if self.queue_url.as_deref().map_or(true, str::is_empty) {
            faults.add_required("QueueUrl");
        }

        match self.entries.as_deref() {
            None | Some([]) => faults.add_required("Entries"),
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if let Err(nested) = entry.validate() {
                        faults.add_nested(&format!("Entries[{}]", i), nested);
                    }
                }
                faults.extend(duplicate_id_faults(entries));
            }
        }

        faults.into_result()
    }
}

impl<E: BatchEntry> Operation for BatchInput<E> {
    const ACTION: &'static str = E::ACTION;

    type Output = BatchOutput<E::Success>;

    fn write_params(&self, params: &mut QueryParams) {
        params.insert_opt("QueueUrl", self.queue_url.as_deref());
        for (i, entry) in self.entries().iter().enumerate() {
            entry.write_params(&format!("{}.{}", E::ENTRY_NAME, i + 1), params);
        }
    }

    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError> {
        let outcomes = read_outcomes::<E::Success>(response.result_of(E::ACTION)?)?;
        Ok(partition(&self.entry_ids(), outcomes)?)
    }
}

/// Read per-entry outcomes from a batch result element, in document order
pub(crate) fn read_outcomes<S: BatchResultEntry>(
    result: &XmlElement,
) -> Result<Vec<BatchOutcome<S>>, SqsError> {
    let mut outcomes = Vec::with_capacity(result.children().len());
    for child in result.children() {
        if child.name() == S::ENTRY_NAME {
            outcomes.push(BatchOutcome::Succeeded(S::from_xml(child)?));
        } else if child.name() == BatchResultErrorEntry::ENTRY_NAME {
            outcomes.push(BatchOutcome::Failed(BatchResultErrorEntry::from_xml(child)?));
        }
    }
    Ok(outcomes)
}

/// Count outcomes per code, for log summaries
pub(crate) fn failure_codes(failed: &[BatchResultErrorEntry]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for entry in failed {
        *counts.entry(entry.code.as_str()).or_insert(0) += 1;
    }
    counts
}
