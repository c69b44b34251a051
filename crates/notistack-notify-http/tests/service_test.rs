//! In-process tests of routing, the control-plane envelope and the proxy.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use notistack_notify_http::response::query_response;
use notistack_notify_http::{
    FromNotifyRequest, NotifyHandler, NotifyHttpConfig, NotifyHttpService, NotifyRequest,
    NotifyResponseBody, ProxiedExchange,
};
use notistack_notify_model::error::NotifyError;
use notistack_notify_model::input::CreateQueueInput;
use notistack_notify_model::operations::NotifyOperation;
use notistack_notify_model::output::CreateQueueOutput;
use notistack_notify_xml::SQS_NAMESPACE;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Debug)]
struct RecordingHandler {
    exchanges: mpsc::UnboundedSender<ProxiedExchange>,
}

impl NotifyHandler for RecordingHandler {
    fn handle_operation(
        &self,
        op: NotifyOperation,
        req: NotifyRequest,
        request_id: String,
    ) -> Pin<
        Box<
            dyn Future<Output = Result<http::Response<NotifyResponseBody>, NotifyError>> + Send,
        >,
    > {
        Box::pin(async move {
            match op {
                NotifyOperation::CreateQueue => {
                    let input = CreateQueueInput::from_notify_request(&req)?;
                    let output = CreateQueueOutput {
                        queue_url: format!(
                            "http://localhost:8003/{}/{}",
                            req.account_id, input.queue_name
                        ),
                    };
                    query_response("CreateQueue", SQS_NAMESPACE, &output, &request_id)
                }
                other => Err(NotifyError::invalid_action(other.as_str())),
            }
        })
    }

    fn observe_exchange(&self, exchange: ProxiedExchange) {
        let _ = self.exchanges.send(exchange);
    }
}

async fn upstream(
    req: http::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let response = match *req.method() {
        http::Method::PUT => http::Response::builder()
            .status(200)
            .header("etag", "\"etag-1\"")
            .header("x-amz-request-id", "upstream-req")
            .body(Full::new(Bytes::from_static(b"stored"))),
        http::Method::DELETE => http::Response::builder()
            .status(204)
            .body(Full::new(Bytes::new())),
        _ => http::Response::builder()
            .status(404)
            .body(Full::new(Bytes::from_static(b"missing"))),
    };
    Ok(response.unwrap())
}

async fn spawn_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service_fn(upstream))
                    .await;
            });
        }
    });
    addr
}

async fn spawn_service(
    upstream_endpoint: String,
) -> (SocketAddr, mpsc::UnboundedReceiver<ProxiedExchange>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let config = NotifyHttpConfig {
        upstream_endpoint,
        upstream_timeout: Duration::from_secs(5),
        ..NotifyHttpConfig::default()
    };
    let svc =
        NotifyHttpService::new(Arc::new(RecordingHandler { exchanges: tx }), config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((stream, peer)) = listener.accept().await else {
                break;
            };
            let svc = svc.with_peer(peer);
            tokio::spawn(async move {
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), svc)
                    .await;
            });
        }
    });
    (addr, rx)
}

#[tokio::test]
async fn test_should_proxy_put_and_report_exchange() {
    let upstream = spawn_upstream().await;
    let (addr, mut rx) = spawn_service(format!("http://{upstream}")).await;

    let resp = reqwest::Client::new()
        .put(format!("http://{addr}/data/reports/q1.csv"))
        .body("a,b,c")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("etag").unwrap(), "\"etag-1\"");
    assert!(resp.headers().get("access-control-allow-origin").is_none());
    assert_eq!(resp.text().await.unwrap(), "stored");

    let exchange = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exchange.method, http::Method::PUT);
    assert_eq!(exchange.status, http::StatusCode::OK);
    assert_eq!(exchange.content_length(), 5);
    assert_eq!(exchange.response_header("etag"), Some("\"etag-1\""));
    let location = exchange.location.unwrap();
    assert_eq!(location.bucket, "data");
    assert_eq!(location.key, "reports/q1.csv");
    assert!(exchange.peer.is_some());
}

#[tokio::test]
async fn test_should_return_bad_gateway_without_reporting() {
    let (addr, mut rx) = spawn_service("http://127.0.0.1:1".to_owned()).await;

    let resp = reqwest::Client::new()
        .delete(format!("http://{addr}/data/key"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_should_answer_control_plane_locally() {
    let upstream = spawn_upstream().await;
    let (addr, mut rx) = spawn_service(format!("http://{upstream}")).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("Action=CreateQueue&QueueName=alerts")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
    assert!(resp.headers().get("x-amz-request-id").is_some());
    let body = resp.text().await.unwrap();
    assert!(body.contains("<QueueUrl>http://localhost:8003/tester/alerts</QueueUrl>"));

    let resp = client
        .get(format!("http://{addr}/?Action=SendMessage"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body = resp.text().await.unwrap();
    assert!(body.contains("<Code>InvalidAction</Code>"));
    assert!(body.contains("<Type>Sender</Type>"));

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_should_answer_notification_preflight() {
    let upstream = spawn_upstream().await;
    let (addr, _rx) = spawn_service(format!("http://{upstream}")).await;

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/data?notification"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
    assert_eq!(
        resp.headers().get("access-control-allow-headers").unwrap(),
        "content-type,x-amz-content-sha256,x-amz-date,authorization,host,x-amz-user-agent"
    );
}
