//! Topic and subscription integration tests, driven by the SNS SDK.

#[cfg(test)]
mod tests {
    use crate::{account, sns_client, unique_name};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_topic_idempotently() {
        let client = sns_client();
        let name = unique_name("topic");

        let first = client.create_topic().name(&name).send().await.expect("create_topic");
        let second = client.create_topic().name(&name).send().await.expect("create_topic again");

        let arn = first.topic_arn().expect("topic arn");
        assert_eq!(arn, format!("arn:aws:sns:us-east-1:{}:{name}", account()));
        assert_eq!(second.topic_arn(), Some(arn));

        let listed = client.list_topics().send().await.expect("list_topics");
        assert!(listed.topics().iter().any(|t| t.topic_arn() == Some(arn)));

        client.delete_topic().topic_arn(arn).send().await.expect("delete_topic");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_invalid_topic_name() {
        let client = sns_client();
        let result = client.create_topic().name("bad name!").send().await;
        assert!(result.is_err(), "invalid topic name should fail");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_subscribe_list_and_unsubscribe() {
        let client = sns_client();
        let name = unique_name("subs");
        let topic_arn = client
            .create_topic()
            .name(&name)
            .send()
            .await
            .expect("create_topic")
            .topic_arn()
            .expect("topic arn")
            .to_owned();

        let sub = client
            .subscribe()
            .topic_arn(&topic_arn)
            .protocol("http")
            .endpoint("http://127.0.0.1:9/hook")
            .send()
            .await
            .expect("subscribe");
        let sub_arn = sub.subscription_arn().expect("subscription arn").to_owned();
        assert!(sub_arn.starts_with(&format!("{topic_arn}:")), "{sub_arn}");

        let listed = client.list_subscriptions().send().await.expect("list_subscriptions");
        let found = listed
            .subscriptions()
            .iter()
            .find(|s| s.subscription_arn() == Some(sub_arn.as_str()))
            .expect("subscription listed");
        assert_eq!(found.endpoint(), Some("http://127.0.0.1:9/hook"));
        assert_eq!(found.owner(), Some(account().as_str()));

        client
            .unsubscribe()
            .subscription_arn(&sub_arn)
            .send()
            .await
            .expect("unsubscribe");

        let listed = client.list_subscriptions().send().await.expect("list_subscriptions");
        assert!(
            !listed
                .subscriptions()
                .iter()
                .any(|s| s.subscription_arn() == Some(sub_arn.as_str()))
        );

        client.delete_topic().topic_arn(&topic_arn).send().await.expect("delete_topic");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_subscribe_to_missing_topic() {
        let client = sns_client();
        let arn = format!("arn:aws:sns:us-east-1:{}:{}", account(), unique_name("missing"));
        let result = client
            .subscribe()
            .topic_arn(arn)
            .protocol("http")
            .endpoint("http://127.0.0.1:9/hook")
            .send()
            .await;
        assert!(result.is_err(), "subscribe to missing topic should fail");
    }
}
