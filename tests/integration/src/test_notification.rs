//! End-to-end notification tests: configure a bucket, write through the
//! proxy, read the event record back from a queue.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::{
        Event, FilterRule, FilterRuleName, NotificationConfiguration,
        NotificationConfigurationFilter, QueueConfiguration, S3KeyFilter,
    };

    use crate::{
        cleanup_bucket, create_test_bucket, create_test_queue, delete_test_queue, queue_arn,
        receive_messages, s3_client, wait_for_messages,
    };

    fn queue_config(queue: &str, prefix: &str) -> NotificationConfiguration {
        let filter = NotificationConfigurationFilter::builder()
            .key(
                S3KeyFilter::builder()
                    .filter_rules(
                        FilterRule::builder()
                            .name(FilterRuleName::Prefix)
                            .value(prefix)
                            .build(),
                    )
                    .build(),
            )
            .build();

        NotificationConfiguration::builder()
            .queue_configurations(
                QueueConfiguration::builder()
                    .id("reports")
                    .queue_arn(queue_arn(queue))
                    .events(Event::S3ObjectCreatedPut)
                    .filter(filter)
                    .build()
                    .expect("queue configuration"),
            )
            .build()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_store_and_return_configuration() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "cfg").await;
        let queue = create_test_queue("cfg").await;

        client
            .put_bucket_notification_configuration()
            .bucket(&bucket)
            .notification_configuration(queue_config(&queue, "reports/"))
            .send()
            .await
            .expect("put notification");

        let resp = client
            .get_bucket_notification_configuration()
            .bucket(&bucket)
            .send()
            .await
            .expect("get notification");
        let queues = resp.queue_configurations();
        assert_eq!(queues.len(), 1);
        assert_eq!(queues[0].id(), Some("reports"));
        assert_eq!(queues[0].queue_arn(), queue_arn(&queue));

        delete_test_queue(&queue).await;
        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_configuration_for_unknown_queue() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "unknown").await;

        let result = client
            .put_bucket_notification_configuration()
            .bucket(&bucket)
            .notification_configuration(queue_config("never-created", ""))
            .send()
            .await;
        assert!(result.is_err(), "unknown destination should be rejected");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_deliver_matching_put_to_queue() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "put").await;
        let queue = create_test_queue("put").await;

        client
            .put_bucket_notification_configuration()
            .bucket(&bucket)
            .notification_configuration(queue_config(&queue, "reports/"))
            .send()
            .await
            .expect("put notification");

        client
            .put_object()
            .bucket(&bucket)
            .key("other/skip.txt")
            .body(ByteStream::from_static(b"skip"))
            .send()
            .await
            .expect("put unmatched object");
        client
            .put_object()
            .bucket(&bucket)
            .key("reports/q3.csv")
            .body(ByteStream::from_static(b"a,b,c"))
            .send()
            .await
            .expect("put matched object");

        let body = wait_for_messages(&queue).await.expect("event delivered");
        assert!(body.contains("reports/q3.csv"), "{body}");
        assert!(body.contains("ObjectCreated:Put"), "{body}");
        assert!(!body.contains("other/skip.txt"), "{body}");

        // Received messages are removed from the queue.
        let again = receive_messages(&queue, 10).await;
        assert!(!again.contains("<Message>"), "{again}");

        delete_test_queue(&queue).await;
        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_clear_configuration_with_empty_document() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "clear").await;
        let queue = create_test_queue("clear").await;

        client
            .put_bucket_notification_configuration()
            .bucket(&bucket)
            .notification_configuration(queue_config(&queue, ""))
            .send()
            .await
            .expect("put notification");
        client
            .put_bucket_notification_configuration()
            .bucket(&bucket)
            .notification_configuration(NotificationConfiguration::builder().build())
            .send()
            .await
            .expect("clear notification");

        let resp = client
            .get_bucket_notification_configuration()
            .bucket(&bucket)
            .send()
            .await
            .expect("get notification");
        assert!(resp.queue_configurations().is_empty());

        delete_test_queue(&queue).await;
        cleanup_bucket(&client, &bucket).await;
    }
}
