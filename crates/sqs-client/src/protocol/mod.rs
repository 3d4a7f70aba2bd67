//! Wire protocol: query-string requests, XML responses, request signing.

use crate::error::SqsError;
use crate::validation::Validate;

pub mod query;
pub mod signer;
pub mod xml;

pub use query::QueryParams;
pub use signer::AwsV4Signer;
pub use xml::XmlElement;

/// API version sent with every request
pub const API_VERSION: &str = "2012-11-05";

/// A request input that can be sent as one query-protocol action
///
/// Implementors describe how to flatten themselves into query parameters
/// and how to read their output back from the response document. The client
/// validates the input before `write_params` is ever called.
pub trait Operation: Validate {
    /// Query action name, e.g. `SendMessageBatch`
    const ACTION: &'static str;

    type Output;

    fn write_params(&self, params: &mut QueryParams);

    /// Decode the output from the root element of a success response
    fn read_output(&self, response: &XmlElement) -> Result<Self::Output, SqsError>;
}
