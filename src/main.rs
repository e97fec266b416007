//! Biblioteca Server - library management REST API

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblioteca_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("biblioteca_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Biblioteca Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Documentos (catalog)
        .route("/documentos", post(api::documents::crear_documento))
        .route("/documentos", get(api::documents::listar_documentos))
        .route("/documentos/buscar", get(api::documents::buscar_documentos))
        .route(
            "/documentos/buscar-por-isbn/:isbn",
            get(api::documents::buscar_documento_por_isbn),
        )
        .route("/documentos/:id", get(api::documents::obtener_documento))
        .route("/documentos/:id", patch(api::documents::actualizar_documento))
        .route("/documentos/:id", delete(api::documents::eliminar_documento))
        // Prestamos (loans)
        .route(
            "/prestamos/registrar-desde-rut-isbn",
            post(api::loans::crear_prestamo_desde_rut_isbn),
        )
        .route("/prestamos/registrar", post(api::loans::crear_prestamo))
        .route(
            "/prestamos/buscar-por-isbn/:isbn",
            get(api::loans::buscar_prestamo_por_isbn),
        )
        .route("/prestamos/activos", get(api::loans::listar_prestamos_activos))
        .route("/prestamos/vencidos", get(api::loans::listar_prestamos_vencidos))
        .route(
            "/prestamos/sala-vencidos",
            get(api::loans::listar_prestamos_sala_vencidos),
        )
        .route(
            "/prestamos/notificar-vencidos",
            post(api::loans::notificar_vencidos),
        )
        .route("/prestamos/estadisticas", get(api::loans::estadisticas_prestamos))
        .route("/prestamos/:id/notificado", patch(api::loans::marcar_notificado))
        .route("/prestamos/:id/devolver", post(api::loans::devolver_prestamo))
        .route(
            "/prestamos/:id/ejemplares",
            get(api::loans::ejemplares_de_prestamo),
        )
        .route(
            "/prestamos/usuarios/:id/historial",
            get(api::loans::historial_usuario),
        )
        // Dashboard
        .route("/dashboard/stats", get(api::dashboard::dashboard_stats))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .merge(api_routes)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
