//! awsQuery response documents for the queue and topic control plane.
//!
//! Every response has the shape
//! `<{Action}Response><{Action}Result>..</{Action}Result><ResponseMetadata><RequestId>..`.
//! Operations without result fields omit the `Result` element.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};

use notistack_notify_model::output::{
    CreateQueueOutput, CreateTopicOutput, EmptyOutput, ListQueuesOutput, ListSubscriptionsOutput,
    ListTopicsOutput, Message, ReceiveMessageOutput, SubscribeOutput, SubscriptionSummary,
};

use crate::error::XmlError;
use crate::serialize::{XmlSerialize, write_text_element};

/// Namespace of queue responses.
pub const SQS_NAMESPACE: &str = "http://queue.amazonaws.com/doc/2012-11-05/";
/// Namespace of topic responses.
pub const SNS_NAMESPACE: &str = "http://sns.amazonaws.com/doc/2010-03-31/";

/// Outputs that know whether they render a `{Action}Result` element.
pub trait QueryResult: XmlSerialize {
    /// `false` for outputs with no fields.
    fn has_result(&self) -> bool {
        true
    }
}

/// Render an `{action}Response` document.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_query_response<T: QueryResult>(
    action: &str,
    namespace: &str,
    result: &T,
    request_id: &str,
) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element(format!("{action}Response"))
        .with_attribute(("xmlns", namespace))
        .write_inner_content(|w| {
            if result.has_result() {
                w.create_element(format!("{action}Result"))
                    .write_inner_content(|w| result.serialize_xml(w))?;
            }
            w.create_element("ResponseMetadata")
                .write_inner_content(|w| write_text_element(w, "RequestId", request_id))?;
            Ok(())
        })?;

    Ok(buf)
}

impl XmlSerialize for EmptyOutput {
    fn serialize_xml<W: Write>(&self, _writer: &mut Writer<W>) -> io::Result<()> {
        Ok(())
    }
}

impl QueryResult for EmptyOutput {
    fn has_result(&self) -> bool {
        false
    }
}

impl XmlSerialize for CreateQueueOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "QueueUrl", &self.queue_url)
    }
}

impl QueryResult for CreateQueueOutput {}

impl XmlSerialize for ListQueuesOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for url in &self.queue_urls {
            write_text_element(writer, "QueueUrl", url)?;
        }
        Ok(())
    }
}

impl QueryResult for ListQueuesOutput {}

impl XmlSerialize for Message {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Message").write_inner_content(|w| {
            write_text_element(w, "MessageId", &self.message_id)?;
            write_text_element(w, "ReceiptHandle", &self.receipt_handle)?;
            write_text_element(w, "MD5OfBody", &self.md5_of_body)?;
            write_text_element(w, "Body", &self.body)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl XmlSerialize for ReceiveMessageOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for message in &self.messages {
            message.serialize_xml(writer)?;
        }
        Ok(())
    }
}

impl QueryResult for ReceiveMessageOutput {}

impl XmlSerialize for CreateTopicOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "TopicArn", &self.topic_arn)
    }
}

impl QueryResult for CreateTopicOutput {}

impl XmlSerialize for ListTopicsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("Topics").write_inner_content(|w| {
            for arn in &self.topic_arns {
                w.create_element("member")
                    .write_inner_content(|w| write_text_element(w, "TopicArn", arn))?;
            }
            Ok(())
        })?;
        Ok(())
    }
}

impl QueryResult for ListTopicsOutput {}

impl XmlSerialize for SubscribeOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "SubscriptionArn", &self.subscription_arn)
    }
}

impl QueryResult for SubscribeOutput {}

impl XmlSerialize for SubscriptionSummary {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("member").write_inner_content(|w| {
            write_text_element(w, "TopicArn", &self.topic_arn)?;
            write_text_element(w, "Protocol", &self.protocol)?;
            write_text_element(w, "SubscriptionArn", &self.subscription_arn)?;
            write_text_element(w, "Owner", &self.owner)?;
            write_text_element(w, "Endpoint", &self.endpoint)?;
            Ok(())
        })?;
        Ok(())
    }
}

impl XmlSerialize for ListSubscriptionsOutput {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer
            .create_element("Subscriptions")
            .write_inner_content(|w| {
                for sub in &self.subscriptions {
                    sub.serialize_xml(w)?;
                }
                Ok(())
            })?;
        Ok(())
    }
}

impl QueryResult for ListSubscriptionsOutput {}
