mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, LocationProvider};
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::reports::{
    routes as reports_routes, GeocodingService, ReportApiClient, ReportFormService,
};
use crate::features::village_data::{routes as village_data_routes, VillageDataService};
use crate::modules::camera::V4l2FfmpegDevice;
use crate::modules::location::{FixedPositionSource, GpsdPositionSource, LocationAcquirer};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // One form, one camera: everything runs on a single thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!("Configuration loaded successfully (pid={})", std::process::id());

    // Camera
    let camera_device = Arc::new(V4l2FfmpegDevice::new(config.camera.clone()));
    tracing::info!(
        "Camera backend: {} via {} ({}x{})",
        config.camera.environment_device,
        config.camera.ffmpeg_bin,
        config.camera.width,
        config.camera.height
    );

    // Location
    let location = match &config.location.provider {
        LocationProvider::Gpsd { address } => {
            tracing::info!("Location provider: gpsd at {}", address);
            LocationAcquirer::new(Arc::new(GpsdPositionSource::new(address.clone())))
        }
        LocationProvider::Fixed {
            latitude,
            longitude,
        } => {
            tracing::info!("Location provider: fixed at {}, {}", latitude, longitude);
            LocationAcquirer::new(Arc::new(FixedPositionSource::new(*latitude, *longitude)))
        }
        LocationProvider::None => {
            tracing::warn!("Location provider disabled; reports are sent without location");
            LocationAcquirer::unsupported()
        }
    };

    // Remote services
    let geocoding_service = Arc::new(
        GeocodingService::new(&config.geocoding)
            .map_err(|e| anyhow::anyhow!("Failed to create geocoding client: {}", e))?,
    );
    let report_api_client = Arc::new(
        ReportApiClient::new(&config.backend)
            .map_err(|e| anyhow::anyhow!("Failed to create backend client: {}", e))?,
    );
    tracing::info!(
        "Backend: {}, geocoder: {}",
        config.backend.base_url,
        config.geocoding.base_url
    );

    let report_form_service = Arc::new(ReportFormService::new(
        camera_device,
        config.camera.jpeg_quality,
        location,
        config.location.timeout,
        geocoding_service,
        report_api_client,
    ));
    tracing::info!("Report form service initialized");

    let village_data_service = Arc::new(
        VillageDataService::new(&config.backend)
            .map_err(|e| anyhow::anyhow!("Failed to create village data client: {}", e))?,
    );
    let initial = village_data_service.refresh().await;
    if let Some(error) = initial.error {
        tracing::warn!("Initial village data fetch failed: {}", error);
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

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

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(reports_routes::routes(Arc::clone(&report_form_service)))
        .merge(village_data_routes::routes(village_data_service))
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                // Propagate X-Request-Id to response headers
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(128)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    report_form_service.shutdown().await;
    tracing::info!("Camera released, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
