//! Notistack Server - S3 notification proxy.
//!
//! Sits in front of an S3-compatible gateway. Object traffic is proxied
//! upstream and successful writes and deletes are turned into event records.
//! Virtual SQS queues, SNS topics and bucket `?notification` configuration
//! are served locally.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:8003 UPSTREAM_ENDPOINT=http://127.0.0.1:7480 notistack-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:8003` | Bind address |
//! | `UPSTREAM_ENDPOINT` | `http://127.0.0.1:7480` | Backing S3 gateway |
//! | `PUBLIC_HOST` | `localhost:8003` | Host used in queue URLs |
//! | `AUTH_BACKEND` | `dummy` | `dummy`, `access-key` or `sigv4` |
//! | `DUMMY_ACCOUNT` | `tester` | Account for the dummy backend |
//! | `CREDENTIALS` | *(unset)* | `ak:sk:account,...` for key-based backends |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//!
//! See `NotifyConfig::from_env` for the dispatch and webhook settings.

mod gateway;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use notistack_auth::{StaticCredentialProvider, build_backend};
use notistack_core::{LogFormat, NotistackConfig};
use notistack_notify_core::{NotifyConfig, NotistackNotify, NotistackNotifyHandler};
use notistack_notify_http::dispatch::NotifyHandler;
use notistack_notify_http::service::{NotifyHttpConfig, NotifyHttpService};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::gateway::GatewayService;

/// Server version reported in health check responses.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }

    Ok(())
}

/// Build the [`NotifyHttpConfig`] from the process and service configuration.
fn build_http_config(global: &NotistackConfig, config: &NotifyConfig) -> Result<NotifyHttpConfig> {
    let credentials =
        StaticCredentialProvider::from_env().context("invalid CREDENTIALS value")?;
    if !credentials.is_empty() {
        info!(keys = credentials.len(), "loaded static credentials");
    }

    Ok(NotifyHttpConfig {
        public_host: config.public_host.clone(),
        virtual_hosting: config.virtual_hosting,
        upstream_endpoint: config.upstream_endpoint.clone(),
        upstream_timeout: config.upstream_timeout(),
        auth: build_backend(
            global.auth_backend,
            global.dummy_account.clone(),
            Arc::new(credentials),
        ),
    })
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve<H: NotifyHandler>(listener: TcpListener, service: GatewayService<H>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.with_peer(peer_addr);
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained");

    Ok(())
}

/// Perform a health check by connecting to the gateway and requesting the health endpoint.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /_health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let config = NotistackConfig::from_env();
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let global = NotistackConfig::from_env();
    init_tracing(&global.log_level, global.log_format)?;

    let config = NotifyConfig::from_env();

    info!(
        gateway_listen = %global.gateway_listen,
        upstream = %config.upstream_endpoint,
        public_host = %config.public_host,
        auth_backend = ?global.auth_backend,
        bucket_ownership = ?config.bucket_ownership,
        version = VERSION,
        "starting Notistack Server",
    );

    let http_config = build_http_config(&global, &config)?;
    let provider = Arc::new(
        NotistackNotify::new(config).context("failed to start event dispatch")?,
    );
    let handler = Arc::new(NotistackNotifyHandler::new(Arc::clone(&provider)));
    let notify = NotifyHttpService::new(handler, http_config)
        .context("failed to build upstream proxy")?;
    let service = GatewayService::new(notify, VERSION);

    let addr: SocketAddr = global
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", global.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await?;

    // Drain events observed before shutdown into their queues.
    provider.dispatcher().flush().await;
    info!("event dispatch drained, exiting");

    Ok(())
}
