//! XML deserialization of the notification configuration request body.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use notistack_notify_model::notification::{
    FilterRule, NotificationConfiguration, NotificationFilter, QueueConfiguration, S3KeyFilter,
    TopicConfiguration,
};

use crate::error::XmlError;

/// Types parsed from the children of an already-opened element.
pub trait XmlDeserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// The reader is positioned just after the opening tag of this element;
    /// the implementation returns once the matching end tag is consumed.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Parse a document whose root element deserializes into `T`.
///
/// A self-closing root yields `T::default()`.
///
/// # Errors
///
/// Returns `XmlError` if the XML is malformed or has no root element.
pub fn from_xml<T: XmlDeserialize + Default>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(_) => return T::deserialize_xml(&mut reader),
            Event::Empty(_) => return Ok(T::default()),
            Event::Eof => return Err(XmlError::MissingElement("root element".to_owned())),
            _ => {}
        }
    }
}

fn tag_name(e: &BytesStart<'_>) -> Result<String, XmlError> {
    let name = e.local_name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_owned)
        .map_err(|e| XmlError::ParseError(e.to_string()))
}

/// Read the text content of the current element and consume its end tag.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let entity = format!("&{name};");
                let unescaped = quick_xml::escape::unescape(&entity)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                text.push_str(
                    std::str::from_utf8(&raw).map_err(|err| XmlError::ParseError(err.to_string()))?,
                );
            }
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Walk the children of the current element, handing each opened child to
/// `on_child`. Self-closing children are ignored.
fn read_children<F>(reader: &mut Reader<&[u8]>, context: &str, mut on_child: F) -> Result<(), XmlError>
where
    F: FnMut(&str, &mut Reader<&[u8]>) -> Result<(), XmlError>,
{
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = tag_name(&e)?;
                on_child(&name, reader)?;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(format!(
                    "unexpected EOF in {context}"
                )));
            }
            _ => {}
        }
    }
}

impl XmlDeserialize for FilterRule {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut rule = FilterRule::default();
        read_children(reader, "FilterRule", |name, r| {
            match name {
                "Name" => rule.name = read_text_content(r)?,
                "Value" => rule.value = read_text_content(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(rule)
    }
}

impl XmlDeserialize for S3KeyFilter {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut filter_rules = Vec::new();
        read_children(reader, "S3Key", |name, r| {
            match name {
                "FilterRule" => filter_rules.push(FilterRule::deserialize_xml(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(S3KeyFilter { filter_rules })
    }
}

impl XmlDeserialize for NotificationFilter {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut key = None;
        read_children(reader, "Filter", |name, r| {
            match name {
                "S3Key" => key = Some(S3KeyFilter::deserialize_xml(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(NotificationFilter { key })
    }
}

/// Fields shared by queue and topic bindings; `target` names the ARN element.
struct BindingFields {
    id: Option<String>,
    arn: String,
    events: Vec<String>,
    filter: Option<NotificationFilter>,
}

fn read_binding(
    reader: &mut Reader<&[u8]>,
    context: &str,
    target: &str,
) -> Result<BindingFields, XmlError> {
    let mut fields = BindingFields {
        id: None,
        arn: String::new(),
        events: Vec::new(),
        filter: None,
    };
    read_children(reader, context, |name, r| {
        match name {
            "Id" => fields.id = Some(read_text_content(r)?),
            "Event" => fields.events.push(read_text_content(r)?),
            "Filter" => fields.filter = Some(NotificationFilter::deserialize_xml(r)?),
            n if n == target => fields.arn = read_text_content(r)?,
            _ => skip_element(r)?,
        }
        Ok(())
    })?;
    Ok(fields)
}

impl XmlDeserialize for QueueConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let f = read_binding(reader, "QueueConfiguration", "Queue")?;
        Ok(QueueConfiguration {
            id: f.id,
            queue_arn: f.arn,
            events: f.events,
            filter: f.filter,
        })
    }
}

impl XmlDeserialize for TopicConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let f = read_binding(reader, "TopicConfiguration", "Topic")?;
        Ok(TopicConfiguration {
            id: f.id,
            topic_arn: f.arn,
            events: f.events,
            filter: f.filter,
        })
    }
}

impl XmlDeserialize for NotificationConfiguration {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut config = NotificationConfiguration::default();
        read_children(reader, "NotificationConfiguration", |name, r| {
            match name {
                "QueueConfiguration" => config
                    .queue_configurations
                    .push(QueueConfiguration::deserialize_xml(r)?),
                "TopicConfiguration" => config
                    .topic_configurations
                    .push(TopicConfiguration::deserialize_xml(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(config)
    }
}
