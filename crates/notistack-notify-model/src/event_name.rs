//! Typed S3 event names and their group expansion.

use std::fmt;
use std::str::FromStr;

/// An event name a binding can fire on.
///
/// The `*All` variants are groups; [`EventName::expand`] maps them to the
/// leaf names the classifier actually produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    /// `s3:ObjectCreated:*`
    ObjectCreatedAll,
    /// `s3:ObjectCreated:Put`
    ObjectCreatedPut,
    /// `s3:ObjectCreated:Post`
    ObjectCreatedPost,
    /// `s3:ObjectCreated:Copy`
    ObjectCreatedCopy,
    /// `s3:ObjectCreated:CompleteMultipartUpload`
    ObjectCreatedCompleteMultipartUpload,
    /// `s3:ObjectRemoved:*`
    ObjectRemovedAll,
    /// `s3:ObjectRemoved:Delete`
    ObjectRemovedDelete,
    /// `s3:ObjectRemoved:DeleteMarkerCreated`
    ObjectRemovedDeleteMarkerCreated,
    /// `s3:ObjectAccessed:*`
    ObjectAccessedAll,
    /// `s3:ObjectAccessed:Get`
    ObjectAccessedGet,
    /// `s3:ObjectAccessed:Head`
    ObjectAccessedHead,
}

const CREATED: &[EventName] = &[
    EventName::ObjectCreatedPut,
    EventName::ObjectCreatedPost,
    EventName::ObjectCreatedCopy,
    EventName::ObjectCreatedCompleteMultipartUpload,
];
const REMOVED: &[EventName] = &[
    EventName::ObjectRemovedDelete,
    EventName::ObjectRemovedDeleteMarkerCreated,
];
const ACCESSED: &[EventName] = &[EventName::ObjectAccessedGet, EventName::ObjectAccessedHead];

impl EventName {
    /// Wire name, e.g. `s3:ObjectCreated:Put`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectCreatedAll => "s3:ObjectCreated:*",
            Self::ObjectCreatedPut => "s3:ObjectCreated:Put",
            Self::ObjectCreatedPost => "s3:ObjectCreated:Post",
            Self::ObjectCreatedCopy => "s3:ObjectCreated:Copy",
            Self::ObjectCreatedCompleteMultipartUpload => {
                "s3:ObjectCreated:CompleteMultipartUpload"
            }
            Self::ObjectRemovedAll => "s3:ObjectRemoved:*",
            Self::ObjectRemovedDelete => "s3:ObjectRemoved:Delete",
            Self::ObjectRemovedDeleteMarkerCreated => "s3:ObjectRemoved:DeleteMarkerCreated",
            Self::ObjectAccessedAll => "s3:ObjectAccessed:*",
            Self::ObjectAccessedGet => "s3:ObjectAccessed:Get",
            Self::ObjectAccessedHead => "s3:ObjectAccessed:Head",
        }
    }

    /// Leaf names covered by this name. Leaves expand to themselves.
    #[must_use]
    pub fn expand(&self) -> &'static [EventName] {
        match self {
            Self::ObjectCreatedAll => CREATED,
            Self::ObjectRemovedAll => REMOVED,
            Self::ObjectAccessedAll => ACCESSED,
            Self::ObjectCreatedPut => &[Self::ObjectCreatedPut],
            Self::ObjectCreatedPost => &[Self::ObjectCreatedPost],
            Self::ObjectCreatedCopy => &[Self::ObjectCreatedCopy],
            Self::ObjectCreatedCompleteMultipartUpload => {
                &[Self::ObjectCreatedCompleteMultipartUpload]
            }
            Self::ObjectRemovedDelete => &[Self::ObjectRemovedDelete],
            Self::ObjectRemovedDeleteMarkerCreated => &[Self::ObjectRemovedDeleteMarkerCreated],
            Self::ObjectAccessedGet => &[Self::ObjectAccessedGet],
            Self::ObjectAccessedHead => &[Self::ObjectAccessedHead],
        }
    }
}

/// Returned when an event name string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized event name: {0}")]
pub struct UnknownEventName(pub String);

impl FromStr for EventName {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s3:ObjectCreated:*" => Ok(Self::ObjectCreatedAll),
            "s3:ObjectCreated:Put" => Ok(Self::ObjectCreatedPut),
            "s3:ObjectCreated:Post" => Ok(Self::ObjectCreatedPost),
            "s3:ObjectCreated:Copy" => Ok(Self::ObjectCreatedCopy),
            "s3:ObjectCreated:CompleteMultipartUpload" => {
                Ok(Self::ObjectCreatedCompleteMultipartUpload)
            }
            "s3:ObjectRemoved:*" => Ok(Self::ObjectRemovedAll),
            "s3:ObjectRemoved:Delete" => Ok(Self::ObjectRemovedDelete),
            "s3:ObjectRemoved:DeleteMarkerCreated" => Ok(Self::ObjectRemovedDeleteMarkerCreated),
            "s3:ObjectAccessed:*" => Ok(Self::ObjectAccessedAll),
            "s3:ObjectAccessed:Get" => Ok(Self::ObjectAccessedGet),
            "s3:ObjectAccessed:Head" => Ok(Self::ObjectAccessedHead),
            other => Err(UnknownEventName(other.to_owned())),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for EventName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for EventName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
