//! # SQS Client
//!
//! Client surface for the Amazon SQS query protocol (API version
//! `2012-11-05`), centred on the batch operation contract.
//!
//! A batch call carries up to ten independent entries. This library:
//! - Validates the whole request locally and reports every fault at once,
//!   with positional field paths such as `Entries[2].ReceiptHandle`
//! - Rejects duplicate entry ids before anything is sent
//! - Splits the response into `successful` and `failed` entries, tagged with
//!   the caller's ids, and rejects responses that skip or repeat an id
//! - Exposes the single-message and queue-management operations with the
//!   same validate, send and decode pipeline
//!
//! ## Module Organization
//!
//! - [validation] - Fault types, the aggregator and the [`Validate`] trait
//! - [batch] - Batch envelope, uniqueness check and result partitioning
//! - [model] - Inputs and outputs of every operation
//! - [protocol] - Query encoding, XML decoding and request signing
//! - [transport] - The [`Transport`] trait and its HTTP implementation
//! - [client] - [`SqsClient`]
//! - [config] - [`ClientConfig`] loading
//! - [error] - [`SqsError`] and service error codes
//!
//! Retries are left to the caller; [`SqsError::is_transient`] tells which
//! failures are worth repeating.

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod transport;
pub mod validation;

pub use batch::{
    duplicate_id_faults, partition, BatchEntry, BatchInput, BatchOutcome, BatchOutput,
    BatchResultEntry, BatchResultErrorEntry, PartitionError,
};
pub use client::SqsClient;
pub use config::{ClientConfig, Credentials};
pub use error::{codes, ConfigurationError, SqsError};
pub use model::*;
pub use protocol::Operation;
pub use transport::{with_cancellation, HttpTransport, Transport};
pub use validation::{FaultAggregator, FaultKind, InvalidParams, Validate, ValidationFault};
