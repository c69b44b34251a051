//! XML layer for Notistack.
//!
//! Two document families share one writer: the bucket notification
//! configuration exchanged on `?notification` (S3 RestXml), and the awsQuery
//! responses of the queue and topic control plane.
//!
//! # Key components
//!
//! - [`XmlSerialize`] and [`to_xml`] for response bodies
//! - [`XmlDeserialize`] and [`from_xml`] for the configuration request body
//! - [`to_query_response`] for `{Action}Response` envelopes
//! - [`error_to_xml`] and [`query_error_to_xml`] for the two error envelopes

pub mod deserialize;
pub mod error;
pub mod query;
pub mod serialize;

pub use deserialize::{XmlDeserialize, from_xml};
pub use error::{XmlError, error_to_xml, query_error_to_xml};
pub use query::{QueryResult, SNS_NAMESPACE, SQS_NAMESPACE, to_query_response};
pub use serialize::{S3_NAMESPACE, XmlSerialize, to_xml};
