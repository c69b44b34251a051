//! XML error types and error envelopes.

use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// Errors that can occur during XML serialization or deserialization.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// An unexpected XML element was encountered.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// An error parsing a value from XML text content.
    #[error("failed to parse value: {0}")]
    ParseError(String),
}

/// Format a bucket-level error as a flat S3 `<Error>` document.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <Error>
///   <Code>NoSuchBucket</Code>
///   <Message>The specified bucket does not exist</Message>
///   <Resource>/mybucket</Resource>
///   <RequestId>4442587FB7D0A2F9</RequestId>
/// </Error>
/// ```
pub fn error_to_xml(
    code: &str,
    message: &str,
    resource: Option<&str>,
    request_id: &str,
) -> Vec<u8> {
    render(|w| {
        w.create_element("Error").write_inner_content(|w| {
            w.create_element("Code")
                .write_text_content(BytesText::new(code))?;
            w.create_element("Message")
                .write_text_content(BytesText::new(message))?;
            if let Some(res) = resource {
                w.create_element("Resource")
                    .write_text_content(BytesText::new(res))?;
            }
            w.create_element("RequestId")
                .write_text_content(BytesText::new(request_id))?;
            Ok(())
        })?;
        Ok(())
    })
}

/// Format a control-plane error as an awsQuery `<ErrorResponse>` document.
///
/// ```xml
/// <ErrorResponse>
///   <Error><Type>Sender</Type><Code>QueueAlreadyExists</Code><Message>..</Message></Error>
///   <RequestId>..</RequestId>
/// </ErrorResponse>
/// ```
pub fn query_error_to_xml(
    error_type: &str,
    code: &str,
    message: &str,
    request_id: &str,
) -> Vec<u8> {
    render(|w| {
        w.create_element("ErrorResponse").write_inner_content(|w| {
            w.create_element("Error").write_inner_content(|w| {
                w.create_element("Type")
                    .write_text_content(BytesText::new(error_type))?;
                w.create_element("Code")
                    .write_text_content(BytesText::new(code))?;
                w.create_element("Message")
                    .write_text_content(BytesText::new(message))?;
                Ok(())
            })?;
            w.create_element("RequestId")
                .write_text_content(BytesText::new(request_id))?;
            Ok(())
        })?;
        Ok(())
    })
}

fn render<F>(body: F) -> Vec<u8>
where
    F: FnOnce(&mut Writer<&mut Vec<u8>>) -> io::Result<()>,
{
    let mut buf = Vec::with_capacity(256);
    let result = {
        let mut writer = Writer::new(&mut buf);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .and_then(|()| body(&mut writer))
    };
    // Writing to Vec<u8> only fails on a logic error.
    if let Err(e) = result {
        tracing::error!(error = %e, "failed to serialize error XML");
        buf.clear();
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_format_error_with_resource() {
        let xml = error_to_xml(
            "NoSuchBucket",
            "The specified bucket does not exist",
            Some("/mybucket"),
            "tx000001",
        );
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");

        assert!(xml_str.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml_str.contains("<Code>NoSuchBucket</Code>"));
        assert!(xml_str.contains("<Resource>/mybucket</Resource>"));
        assert!(xml_str.contains("<RequestId>tx000001</RequestId>"));
    }

    #[test]
    fn test_should_format_error_without_resource() {
        let xml = error_to_xml("InternalError", "Internal server error", None, "tx000002");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");

        assert!(xml_str.contains("<Code>InternalError</Code>"));
        assert!(!xml_str.contains("<Resource>"));
    }

    #[test]
    fn test_should_format_query_error_envelope() {
        let xml = query_error_to_xml(
            "Sender",
            "QueueAlreadyExists",
            "A queue with this name already exists.",
            "req-9",
        );
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");

        assert!(xml_str.contains(
            "<ErrorResponse><Error><Type>Sender</Type><Code>QueueAlreadyExists</Code><Message>A queue with this name already exists.</Message></Error><RequestId>req-9</RequestId></ErrorResponse>"
        ));
    }

    #[test]
    fn test_should_escape_special_characters() {
        let xml = query_error_to_xml("Sender", "InvalidParameter", "a < b & c", "r");
        let xml_str = std::str::from_utf8(&xml).expect("valid UTF-8");
        assert!(xml_str.contains("a &lt; b &amp; c"));
    }
}
