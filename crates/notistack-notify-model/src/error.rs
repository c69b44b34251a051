//! Control-plane error types.
//!
//! One error type covers both surfaces: bucket configuration errors are
//! rendered in the S3 `<Error>` envelope, queue and topic errors in the
//! awsQuery `<ErrorResponse>` envelope with a `Type` of `Sender` or
//! `Receiver`.

use std::fmt;

/// Well-known control-plane error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum NotifyErrorCode {
    /// Bucket unknown to the owner directory.
    NoSuchBucket,
    /// Caller does not own the bucket or queue.
    AccessDenied,
    /// Caller does not own the topic or subscription.
    AuthorizationError,
    /// ARN could not be parsed.
    InvalidArn,
    /// ARN parsed but names no existing resource of the right kind.
    ArnNotification,
    /// Unknown event name in a configuration.
    InvalidArgument,
    /// Configuration body is not valid XML.
    MalformedXML,
    /// Queue name collision.
    QueueAlreadyExists,
    /// Bad request parameter.
    #[default]
    InvalidParameter,
    /// Resource not found.
    NotFound,
    /// Malformed query-filter expression.
    InvalidSyntax,
    /// Unknown `Action`.
    InvalidAction,
    /// No `Action` parameter.
    MissingAction,
    /// Access key not known.
    InvalidAccessKeyId,
    /// Signature mismatch.
    SignatureDoesNotMatch,
    /// Unparseable `Authorization` header.
    AuthorizationHeaderMalformed,
    /// Unexpected failure.
    InternalError,
}

impl NotifyErrorCode {
    /// Code written to the error envelope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSuchBucket => "NoSuchBucket",
            Self::AccessDenied => "AccessDenied",
            Self::AuthorizationError => "AuthorizationError",
            Self::InvalidArn | Self::ArnNotification | Self::InvalidArgument => "InvalidArgument",
            Self::MalformedXML => "MalformedXML",
            Self::QueueAlreadyExists => "QueueAlreadyExists",
            Self::InvalidParameter => "InvalidParameter",
            Self::NotFound => "NotFound",
            Self::InvalidSyntax => "InvalidSyntax",
            Self::InvalidAction => "InvalidAction",
            Self::MissingAction => "MissingAction",
            Self::InvalidAccessKeyId => "InvalidAccessKeyId",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
            Self::AuthorizationHeaderMalformed => "AuthorizationHeaderMalformed",
            Self::InternalError => "InternalError",
        }
    }

    /// `Sender` for caller mistakes, `Receiver` for server faults.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InternalError => "Receiver",
            _ => "Sender",
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::NoSuchBucket | Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::AccessDenied
            | Self::AuthorizationError
            | Self::InvalidAccessKeyId
            | Self::SignatureDoesNotMatch => http::StatusCode::FORBIDDEN,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => http::StatusCode::BAD_REQUEST,
        }
    }
}

impl fmt::Display for NotifyErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A control-plane error response.
#[derive(Debug)]
pub struct NotifyError {
    /// The error code.
    pub code: NotifyErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NotifyError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for NotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl NotifyError {
    /// Create a new `NotifyError` from an error code.
    #[must_use]
    pub fn new(code: NotifyErrorCode) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: code.as_str().to_owned(),
            code,
            source: None,
        }
    }

    /// Create a new `NotifyError` with a custom message.
    #[must_use]
    pub fn with_message(code: NotifyErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // -- Convenience constructors --

    /// Bucket unknown.
    #[must_use]
    pub fn no_such_bucket(bucket: &str) -> Self {
        Self::with_message(
            NotifyErrorCode::NoSuchBucket,
            format!("The specified bucket does not exist: {bucket}"),
        )
    }

    /// Caller does not own the bucket or queue.
    #[must_use]
    pub fn access_denied() -> Self {
        Self::with_message(NotifyErrorCode::AccessDenied, "Access Denied")
    }

    /// Caller does not own the topic or subscription.
    #[must_use]
    pub fn authorization_error() -> Self {
        Self::with_message(
            NotifyErrorCode::AuthorizationError,
            "The caller is not authorized to access this resource",
        )
    }

    /// ARN could not be parsed.
    #[must_use]
    pub fn invalid_arn(arn: &str) -> Self {
        Self::with_message(NotifyErrorCode::InvalidArn, format!("Invalid ARN: {arn}"))
    }

    /// ARN names no existing destination.
    #[must_use]
    pub fn arn_notification(arn: &str) -> Self {
        Self::with_message(
            NotifyErrorCode::ArnNotification,
            format!("A specified destination ARN does not exist or is not well-formed: {arn}"),
        )
    }

    /// Unknown event name.
    #[must_use]
    pub fn invalid_event(name: &str) -> Self {
        Self::with_message(
            NotifyErrorCode::InvalidArgument,
            format!("The event is not supported for notifications: {name}"),
        )
    }

    /// Configuration body failed to parse.
    #[must_use]
    pub fn malformed_xml() -> Self {
        Self::with_message(
            NotifyErrorCode::MalformedXML,
            "The XML you provided was not well-formed or did not validate against our published schema.",
        )
    }

    /// Queue name collision.
    #[must_use]
    pub fn queue_already_exists() -> Self {
        Self::with_message(
            NotifyErrorCode::QueueAlreadyExists,
            "A queue with this name already exists.",
        )
    }

    /// Bad request parameter named `what`.
    #[must_use]
    pub fn invalid_parameter(what: &str) -> Self {
        Self::with_message(
            NotifyErrorCode::InvalidParameter,
            format!("Invalid parameter: {what}"),
        )
    }

    /// Missing required parameter.
    #[must_use]
    pub fn missing_parameter(name: &str) -> Self {
        Self::with_message(
            NotifyErrorCode::InvalidParameter,
            format!("Missing required parameter: {name}"),
        )
    }

    /// Resource not found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(NotifyErrorCode::NotFound, message)
    }

    /// Unknown `Action`.
    #[must_use]
    pub fn invalid_action(action: &str) -> Self {
        Self::with_message(
            NotifyErrorCode::InvalidAction,
            format!("The action {action} is not valid for this endpoint."),
        )
    }

    /// No `Action` parameter.
    #[must_use]
    pub fn missing_action() -> Self {
        Self::with_message(
            NotifyErrorCode::MissingAction,
            "Missing required parameter: Action",
        )
    }

    /// Unexpected failure.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(NotifyErrorCode::InternalError, message)
    }
}

/// Create a `NotifyError` from an error code.
///
/// # Examples
///
/// ```
/// use notistack_notify_model::notify_error;
/// use notistack_notify_model::error::NotifyErrorCode;
///
/// let err = notify_error!(MalformedXML);
/// assert_eq!(err.code, NotifyErrorCode::MalformedXML);
///
/// let err = notify_error!(NotFound, "Topic does not exist");
/// assert_eq!(err.message, "Topic does not exist");
/// ```
#[macro_export]
macro_rules! notify_error {
    ($code:ident) => {
        $crate::error::NotifyError::new($crate::error::NotifyErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::NotifyError::with_message($crate::error::NotifyErrorCode::$code, $msg)
    };
}
