#![doc = include_str!("../README.md")]

mod server;

use checklist_tonic_core::{
    checklist::Store,
    proto::{
        FILE_DESCRIPTOR_SET, checklist::checklist_server::ChecklistServer,
        helloworld::greeter_server::GreeterServer,
    },
};
use clap::Parser;
use futures::Stream;
use server::config::{CliArgs, ServerConfig};
use server::service::{greeter::GreeterService, handler::ChecklistService};
use server::telemetry::{TelemetryProviders, init_telemetry};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const COMPRESSION: [CompressionEncoding; 3] = [
    CompressionEncoding::Zstd,
    CompressionEncoding::Gzip,
    CompressionEncoding::Deflate,
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let config = ServerConfig::try_from(CliArgs::parse())?;
    let providers = init_telemetry()?;

    #[cfg(feature = "tracing")]
    tracing::info!(
        addr = %config.server_addr,
        uds = config.uds,
        max_text_len = config.limits.max_text_len,
        "Starting checklist service"
    );

    if !config.uds {
        let tcp = TcpListener::bind(&config.server_addr).await?;
        return serve(providers, TcpListenerStream::new(tcp), config).await;
    }

    #[cfg(unix)]
    {
        use tokio::net::UnixListener;
        use tokio_stream::wrappers::UnixListenerStream;

        let path = config.server_addr.clone();
        let uds = UnixListener::bind(&path)?;
        let res = serve(providers, UnixListenerStream::new(uds), config).await;
        // Left behind if the server panics.
        let _ = std::fs::remove_file(&path);
        res
    }
    #[cfg(not(unix))]
    {
        anyhow::bail!("Unix domain sockets are not supported on this platform");
    }
}

/// Serves both gRPC services on `incoming` until a shutdown signal arrives.
async fn serve<I, IO, IE>(
    providers: TelemetryProviders,
    incoming: I,
    config: ServerConfig,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    set_health(&health_reporter, true).await;

    let checklist = ChecklistService::new(Arc::new(Store::with_limits(config.limits)));

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let checklist_server = COMPRESSION.into_iter().fold(
        ChecklistServer::new(checklist.clone()),
        |server, encoding| {
            server
                .send_compressed(encoding)
                .accept_compressed(encoding)
        },
    );
    let greeter_server = COMPRESSION.into_iter().fold(
        GreeterServer::new(GreeterService),
        |server, encoding| {
            server
                .send_compressed(encoding)
                .accept_compressed(encoding)
        },
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(ServiceBuilder::new().layer(cors).layer(GrpcWebLayer::new()))
        .add_service(health_service)
        .add_service(reflection)
        .add_service(checklist_server)
        .add_service(greeter_server)
        .serve_with_incoming_shutdown(incoming, async move {
            wait_for_signal().await;
            set_health(&health_reporter, false).await;
            checklist.shutdown();
            providers.shutdown();
        })
        .await?;

    #[cfg(feature = "tracing")]
    tracing::info!("Service shut down successfully");
    Ok(())
}

async fn set_health(reporter: &HealthReporter, serving: bool) {
    if serving {
        reporter
            .set_serving::<ChecklistServer<ChecklistService>>()
            .await;
        reporter.set_serving::<GreeterServer<GreeterService>>().await;
    } else {
        reporter
            .set_not_serving::<ChecklistServer<ChecklistService>>()
            .await;
        reporter
            .set_not_serving::<GreeterServer<GreeterService>>()
            .await;
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn wait_for_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let _signal = tokio::select! {
        res = signal::ctrl_c() => {
            res.expect("failed to install Ctrl+C handler");
            "SIGINT"
        }
        () = terminate => "SIGTERM",
    };

    #[cfg(feature = "tracing")]
    tracing::info!(signal = _signal, "Shutdown signal received, draining in-flight requests");
}
