use std::net::SocketAddr;
use std::sync::Arc;

use careers_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    middleware::careers_cors,
    notifications::EmailNotifier,
    repositories::PgApplicationRepository,
    routes,
    services::{application_service::ApplicationService, background::BackgroundQueue},
    storage::LocalStorage,
    AppState,
};
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.server.json_logs);

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;
    info!("Database ready");

    let files = Arc::new(
        LocalStorage::new(&config.storage.upload_dir, &config.application.base_url).await?,
    );
    info!(upload_dir = %config.storage.upload_dir, "Serving resumes from local storage");

    let notifier = Arc::new(EmailNotifier::new(config.email.clone()));
    let (queue, _worker) = BackgroundQueue::start();

    let application_service = ApplicationService::new(
        Arc::new(PgApplicationRepository::new(pool)),
        files.clone(),
        notifier,
        queue,
    );
    let app_state = AppState::new(application_service, files, config.storage.max_file_size);

    let app = routes::router(app_state)
        .layer(TimeoutLayer::new(config.server.request_timeout))
        .layer(CompressionLayer::new())
        .layer(careers_cors(&config.application))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server.address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
