//! Observed storage events and the JSON record delivered for them.

use chrono::{DateTime, Utc};
use notistack_core::AwsRegion;

use crate::event_name::EventName;
use crate::resource::Resource;

/// Timestamp layout of `eventTime`.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A storage operation classified from a proxied exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedEvent {
    /// Synthesized leaf event.
    pub event_name: EventName,
    /// Bucket the object lives in.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Request content length for creates, 0 otherwise.
    pub size: u64,
    /// `ETag` response header, if any.
    pub etag: Option<String>,
    /// `x-amz-request-id` response header, if any.
    pub request_id: Option<String>,
    /// Client address.
    pub source_ip: String,
    /// When the response was observed.
    pub event_time: DateTime<Utc>,
}

/// The event body appended to queues and posted to webhooks.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Always `2.0`.
    pub event_version: String,
    /// Always `aws:s3`.
    pub event_source: String,
    /// Configured region.
    pub aws_region: String,
    /// UTC time formatted with [`EVENT_TIME_FORMAT`].
    pub event_time: String,
    /// Leaf event name.
    pub event_name: EventName,
    /// Principal that caused the event.
    pub user_identity: Identity,
    /// `sourceIPAddress`.
    pub request_parameters: RequestParameters,
    /// `x-amz-request-id`.
    pub response_elements: ResponseElements,
    /// Bucket and object details.
    pub s3: S3Metadata,
}

/// `principalId` wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Principal id, empty when unknown.
    pub principal_id: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    #[serde(rename = "sourceIPAddress")]
    pub source_ip_address: String,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResponseElements {
    #[serde(rename = "x-amz-request-id")]
    pub request_id: String,
}

/// The `s3` section of a record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Metadata {
    /// Always `1.0`.
    pub s3_schema_version: String,
    /// Always `Config`.
    pub configuration_id: String,
    /// Bucket section.
    pub bucket: BucketInfo,
    /// Object section.
    pub object: ObjectInfo,
}

/// The `s3.bucket` section.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// Bucket owner.
    pub owner_identity: Identity,
    /// ARN of the destination the record is delivered to.
    pub arn: String,
}

/// The `s3.object` section.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Object size.
    pub size: u64,
    /// Entity tag, empty when the response had none.
    #[serde(rename = "eTag")]
    pub etag: String,
    /// Uppercase hex of the event time in unix nanoseconds.
    pub sequencer: String,
}

impl EventRecord {
    /// Build the record delivered to `destination`.
    #[must_use]
    pub fn new(event: &ObservedEvent, region: &AwsRegion, destination: &Resource) -> Self {
        let nanos = event.event_time.timestamp_nanos_opt().unwrap_or_default();
        Self {
            event_version: "2.0".to_owned(),
            event_source: "aws:s3".to_owned(),
            aws_region: region.to_string(),
            event_time: event.event_time.format(EVENT_TIME_FORMAT).to_string(),
            event_name: event.event_name,
            user_identity: Identity::default(),
            request_parameters: RequestParameters {
                source_ip_address: event.source_ip.clone(),
            },
            response_elements: ResponseElements {
                request_id: event.request_id.clone().unwrap_or_default(),
            },
            s3: S3Metadata {
                s3_schema_version: "1.0".to_owned(),
                configuration_id: "Config".to_owned(),
                bucket: BucketInfo {
                    name: event.bucket.clone(),
                    owner_identity: Identity::default(),
                    arn: destination.arn(region),
                },
                object: ObjectInfo {
                    key: event.key.clone(),
                    size: event.size,
                    etag: event.etag.clone().unwrap_or_default(),
                    sequencer: format!("{nanos:X}"),
                },
            },
        }
    }
}
