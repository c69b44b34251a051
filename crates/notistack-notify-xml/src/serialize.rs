//! XML serialization of the notification configuration.
//!
//! Conventions follow S3 RestXml: a `<?xml version="1.0" encoding="UTF-8"?>`
//! declaration, the S3 namespace on the root, flattened `<Event>` lists.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

use notistack_notify_model::notification::{
    FilterRule, NotificationConfiguration, NotificationFilter, QueueConfiguration, S3KeyFilter,
    TopicConfiguration,
};

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Types that write themselves as child elements of the current element.
///
/// The root element is written by [`to_xml`] or
/// [`to_query_response`](crate::query::to_query_response).
pub trait XmlSerialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as a complete document with `root_element` in `namespace`.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: XmlSerialize>(
    root_element: &str,
    namespace: &str,
    value: &T,
) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element(root_element)
        .with_attribute(("xmlns", namespace))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Write a simple `<tag>text</tag>` element.
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Write `<tag>text</tag>` only if the value is `Some`.
fn write_optional_text<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: Option<&str>,
) -> io::Result<()> {
    if let Some(v) = value {
        write_text_element(writer, tag, v)?;
    }
    Ok(())
}

fn write_events<W: Write>(writer: &mut Writer<W>, events: &[String]) -> io::Result<()> {
    for event in events {
        write_text_element(writer, "Event", event)?;
    }
    Ok(())
}

impl XmlSerialize for FilterRule {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("FilterRule")
            .write_inner_content(|w| {
                write_text_element(w, "Name", &self.name)?;
                write_text_element(w, "Value", &self.value)?;
                Ok(())
            })?;
        Ok(())
    }
}

impl XmlSerialize for S3KeyFilter {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("S3Key").write_inner_content(|w| {
            for rule in &self.filter_rules {
                rule.serialize_xml(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl XmlSerialize for NotificationFilter {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Filter").write_inner_content(|w| {
            if let Some(ref key) = self.key {
                key.serialize_xml(w)?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl XmlSerialize for TopicConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("TopicConfiguration")
            .write_inner_content(|w| {
                write_optional_text(w, "Id", self.id.as_deref())?;
                write_text_element(w, "Topic", &self.topic_arn)?;
                write_events(w, &self.events)?;
                if let Some(ref filter) = self.filter {
                    filter.serialize_xml(w)?;
                }
                Ok(())
            })?;
        Ok(())
    }
}

impl XmlSerialize for QueueConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("QueueConfiguration")
            .write_inner_content(|w| {
                write_optional_text(w, "Id", self.id.as_deref())?;
                write_text_element(w, "Queue", &self.queue_arn)?;
                write_events(w, &self.events)?;
                if let Some(ref filter) = self.filter {
                    filter.serialize_xml(w)?;
                }
                Ok(())
            })?;
        Ok(())
    }
}

impl XmlSerialize for NotificationConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for tc in &self.topic_configurations {
            tc.serialize_xml(writer)?;
        }
        for qc in &self.queue_configurations {
            qc.serialize_xml(writer)?;
        }
        Ok(())
    }
}
