//! Virtual queue integration tests.

#[cfg(test)]
mod tests {
    use crate::{
        account, create_test_queue, delete_test_queue, endpoint_url, query_action, queue_url,
        receive_messages,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_and_list_queue() {
        let queue = create_test_queue("list").await;

        let (status, body) = query_action(&[("Action", "ListQueues")]).await;
        assert!(status.is_success(), "{body}");
        let url = format!("/{}/{queue}", account());
        assert!(body.contains(&url), "list should contain {url}: {body}");

        delete_test_queue(&queue).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_duplicate_queue() {
        let queue = create_test_queue("dup").await;

        let (status, body) = query_action(&[("Action", "CreateQueue"), ("QueueName", queue.as_str())]).await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
        assert!(body.contains("QueueAlreadyExists"), "{body}");

        delete_test_queue(&queue).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_receive_empty_batch_from_fresh_queue() {
        let queue = create_test_queue("empty").await;

        let body = receive_messages(&queue, 5).await;
        assert!(body.contains("ReceiveMessageResult"), "{body}");
        assert!(!body.contains("<Message>"), "{body}");

        delete_test_queue(&queue).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_deny_receive_from_foreign_queue() {
        let url = format!("{}/someone-else/private", endpoint_url());
        let (status, body) =
            query_action(&[("Action", "ReceiveMessage"), ("QueueUrl", url.as_str())]).await;
        assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
        assert!(body.contains("AccessDenied"), "{body}");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_queue_idempotently() {
        let queue = create_test_queue("delete").await;
        let url = queue_url(&queue);

        for _ in 0..2 {
            let (status, body) =
                query_action(&[("Action", "DeleteQueue"), ("QueueUrl", url.as_str())]).await;
            assert!(status.is_success(), "{body}");
        }
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_action() {
        let (status, body) = query_action(&[("Action", "PurgeQueue")]).await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
        assert!(body.contains("InvalidAction"), "{body}");
    }
}
