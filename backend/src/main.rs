// Admin server for live reconfiguration of the dart machine.

use std::sync::Arc;

use tracing::{info, warn};

use dart_machine_server::app::AppState;
use dart_machine_server::config::ServerConfig;
use dart_machine_server::connector::MachineConnector;
use dart_machine_server::coordinator::Coordinator;
use dart_machine_server::http;
use dart_machine_server::store::{JsonFileBackend, SettingsStore, UpdateDomain};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let addr = config.bind_addr().expect("invalid INT or HTTP_PORT");

    let backend = Arc::new(JsonFileBackend::new(config.settings_path()));
    info!(path = %backend.path().display(), "loading settings");
    let store = Arc::new(SettingsStore::open(backend).expect("failed to load settings"));

    let settings = store.current().await;
    let connector = Arc::new(
        MachineConnector::new(&settings, config.serial_baud)
            .expect("failed to build live connector"),
    );
    let startup = connector.start(&settings).await;
    if !startup.machine.is_empty() || !startup.scoreboard.is_empty() {
        warn!("machine started without all live connections");
    }
    store.set_warnings(UpdateDomain::Machine, startup.machine).await;
    store
        .set_warnings(UpdateDomain::Scoreboard, startup.scoreboard)
        .await;

    let coordinator = Arc::new(Coordinator::new(store, connector.clone()));
    let app = http::router(AppState::new(coordinator, config.device_dir.clone()));

    info!("navigate to http://{} to configure your darts machine", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    connector.shutdown().await;
    info!("webserver stopped");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(?err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
