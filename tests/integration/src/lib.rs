//! Integration tests for the Notistack server.
//!
//! These tests require a running server at `localhost:8003` in front of an
//! S3-compatible gateway, using the dummy auth backend. They are marked
//! `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p notistack-integration -- --ignored
//! ```

use std::sync::Once;
use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("NOTISTACK_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8003".to_owned())
}

/// Account the dummy backend assigns to every caller.
#[must_use]
pub fn account() -> String {
    std::env::var("NOTISTACK_ACCOUNT").unwrap_or_else(|_| "tester".to_owned())
}

fn credentials() -> Credentials {
    Credentials::new("test", "test", None, None, "integration-test")
}

/// Create a configured S3 client pointing at the proxy.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    init_tracing();

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials())
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Create a configured SNS client pointing at the proxy.
#[must_use]
pub fn sns_client() -> aws_sdk_sns::Client {
    init_tracing();

    let config = aws_sdk_sns::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(aws_sdk_sns::config::Region::new("us-east-1"))
        .credentials_provider(credentials())
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_sns::Client::from_conf(config)
}

/// Generate a unique resource name for a test.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// ARN of a queue owned by the test account.
#[must_use]
pub fn queue_arn(name: &str) -> String {
    format!("arn:aws:sqs:us-east-1:{}:{name}", account())
}

/// URL of a queue owned by the test account.
#[must_use]
pub fn queue_url(name: &str) -> String {
    format!("{}/{}/{name}", endpoint_url(), account())
}

/// Send a query-protocol action as a form POST and return status and body.
pub async fn query_action(params: &[(&str, &str)]) -> (reqwest::StatusCode, String) {
    init_tracing();

    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let resp = reqwest::Client::new()
        .post(format!("{}/", endpoint_url()))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .unwrap_or_else(|e| panic!("query action failed: {e}"));
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    (status, body)
}

/// Create a queue owned by the test account and return its name.
pub async fn create_test_queue(prefix: &str) -> String {
    let name = unique_name(prefix);
    let (status, body) =
        query_action(&[("Action", "CreateQueue"), ("QueueName", name.as_str())]).await;
    assert!(status.is_success(), "create queue {name} failed: {body}");
    name
}

/// Receive up to `max` messages from a queue.
pub async fn receive_messages(queue: &str, max: u32) -> String {
    let url = queue_url(queue);
    let max = max.to_string();
    let (status, body) = query_action(&[
        ("Action", "ReceiveMessage"),
        ("QueueUrl", url.as_str()),
        ("MaxNumberOfMessages", max.as_str()),
    ])
    .await;
    assert!(status.is_success(), "receive from {queue} failed: {body}");
    body
}

/// Poll a queue until it returns a non-empty batch or the deadline passes.
pub async fn wait_for_messages(queue: &str) -> Option<String> {
    for _ in 0..20 {
        let body = receive_messages(queue, 10).await;
        if body.contains("<Message>") {
            return Some(body);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    None
}

/// Delete a queue, ignoring failures.
pub async fn delete_test_queue(queue: &str) {
    let url = queue_url(queue);
    let _ = query_action(&[("Action", "DeleteQueue"), ("QueueUrl", url.as_str())]).await;
}

/// Create a bucket through the proxy and return its name.
pub async fn create_test_bucket(client: &aws_sdk_s3::Client, prefix: &str) -> String {
    let name = unique_name(prefix);
    client
        .create_bucket()
        .bucket(&name)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create bucket {name}: {e}"));
    name
}

/// Delete all objects in a bucket, then delete the bucket.
pub async fn cleanup_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
    let Ok(resp) = client.list_objects_v2().bucket(bucket).send().await else {
        return;
    };
    for obj in resp.contents() {
        if let Some(key) = obj.key() {
            let _ = client.delete_object().bucket(bucket).key(key).send().await;
        }
    }
    let _ = client.delete_bucket().bucket(bucket).send().await;
}

mod test_notification;
mod test_queue;
mod test_topic;
