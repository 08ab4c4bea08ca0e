mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::map_token::{routes as map_token_routes, HttpTokenSource, TokenSource};
use crate::features::sessions::{routes as sessions_routes, SessionService, SessionSweeper};
use crate::features::territories::models::SurfaceKind;
use crate::features::territories::{
    routes as territories_routes, CoordinateProjector, GeoDataRepository, TerritoryService,
};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Catalogue and coordinate table are validated up front; any integrity
    // violation aborts startup
    let repo = Arc::new(
        GeoDataRepository::load_embedded()
            .map_err(|e| anyhow::anyhow!("Invalid territory catalogue: {}", e))?,
    );
    let projector = Arc::new(
        CoordinateProjector::load_embedded(&repo)
            .map_err(|e| anyhow::anyhow!("Invalid coordinate table: {}", e))?,
    );
    tracing::info!(
        "Territory catalogue loaded: {} provinces, {} departments",
        repo.provinces().len(),
        repo.department_count()
    );

    for surface in [SurfaceKind::Canvas, SurfaceKind::Geographic] {
        let gaps = projector.coverage_gaps(&repo, surface);
        if !gaps.is_empty() {
            let ids: Vec<String> = gaps
                .iter()
                .map(|(kind, id)| format!("{} {}", kind, id))
                .collect();
            tracing::warn!(
                "{} entities have no {:?} position and will not be drawn there: {}",
                gaps.len(),
                surface,
                ids.join(", ")
            );
        }
    }

    // Initialize Territory Service
    let territory_service = Arc::new(TerritoryService::new(
        Arc::clone(&repo),
        Arc::clone(&projector),
    ));
    tracing::info!("Territory service initialized");

    // Initialize map token client
    if config.map.access_token.is_none() {
        tracing::warn!("MAP_ACCESS_TOKEN is not set: /api/map/token will answer 503");
    }
    let token_source: Arc<dyn TokenSource> = Arc::new(
        HttpTokenSource::from_config(&config.map)
            .map_err(|e| anyhow::anyhow!("Failed to build map token client: {}", e))?,
    );
    tracing::info!("Map token client initialized ({})", config.map.token_url);

    // Initialize Session Service
    let session_service = Arc::new(SessionService::new(
        Arc::clone(&repo),
        Arc::clone(&projector),
        token_source,
        config.map.clone(),
        config.sessions.clone(),
    ));
    tracing::info!(
        "Session service initialized (max {} sessions)",
        config.sessions.max_sessions
    );

    // Spawn idle session sweeper
    let sweeper = SessionSweeper::new(Arc::clone(&session_service));
    tokio::spawn(async move {
        sweeper.run().await;
    });
    tracing::info!("Session sweeper worker spawned");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let api_routes = Router::new()
        .merge(territories_routes::routes(territory_service))
        .merge(map_token_routes::routes(Arc::new(config.map.clone())))
        .merge(sessions_routes::routes(session_service));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
