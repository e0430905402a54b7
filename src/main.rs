use std::sync::Arc;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::Dispatch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensor_service::common::AppState;
use sensor_service::config::{Config, LogFormat};
use sensor_service::routes;
use sensor_service::sensors::PostgresSensorManager;
use sensor_service::transport::GrpcServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (fail-fast)
    let config = Config::from_env()?;

    // Initialize tracing
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,sensor_service=debug".into()),
    );
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!(
        deployment = ?config.deployment,
        host = %config.api_host,
        port = config.api_port,
        grpc_port = ?config.grpc_port,
        "Configuration loaded"
    );

    // Connect to database (fail-fast)
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Migrations completed");

    let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
    let sensors = Arc::new(PostgresSensorManager::new(db, dispatch));

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_shutdown_signal(shutdown.clone()));

    // gRPC health endpoint, built before anything is served so bad TLS
    // material stops startup.
    let grpc_task = match config.grpc_bind_address() {
        Some(addr) => {
            let (health_reporter, health_service) = tonic_health::server::health_reporter();
            let server = GrpcServer::new(&config.grpc_tls, health_service)?;
            let listener = TcpListener::bind(&addr).await?;
            let signal = shutdown.clone().cancelled_owned();
            Some(tokio::spawn(async move {
                let _health_reporter = health_reporter;
                server.serve_with_shutdown(listener, signal).await
            }))
        }
        None => None,
    };

    let state = AppState::new(sensors, config.clone());
    let app = routes::build_router(state);

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting HTTP server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    // HTTP stopping for any reason also stops gRPC.
    shutdown.cancel();
    if let Some(task) = grpc_task {
        task.await??;
    }

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn watch_shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
        () = shutdown.cancelled() => return,
    }

    shutdown.cancel();
}
