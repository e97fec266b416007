//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{dashboard, documents, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "1.0.0",
        description = "Sistema de gestión de biblioteca - REST API",
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Documentos
        documents::crear_documento,
        documents::listar_documentos,
        documents::buscar_documentos,
        documents::buscar_documento_por_isbn,
        documents::obtener_documento,
        documents::actualizar_documento,
        documents::eliminar_documento,
        // Prestamos
        loans::crear_prestamo_desde_rut_isbn,
        loans::crear_prestamo,
        loans::buscar_prestamo_por_isbn,
        loans::listar_prestamos_activos,
        loans::listar_prestamos_vencidos,
        loans::listar_prestamos_sala_vencidos,
        loans::marcar_notificado,
        loans::notificar_vencidos,
        loans::devolver_prestamo,
        loans::historial_usuario,
        loans::ejemplares_de_prestamo,
        loans::estadisticas_prestamos,
        // Dashboard
        dashboard::dashboard_stats,
    ),
    components(
        schemas(
            // Documentos
            crate::models::Documento,
            crate::models::document::CreateDocumento,
            crate::models::document::UpdateDocumento,
            crate::models::document::ListaDocumentos,
            documents::Mensaje,
            // Prestamos
            crate::models::Prestamo,
            crate::models::DetallePrestamo,
            crate::models::Ejemplar,
            crate::models::Biblioteca,
            crate::models::Usuario,
            crate::models::loan::PrestamoStats,
            loans::PrestamoSimpleCreate,
            loans::PrestamoCreate,
            loans::PrestamoSimpleResponse,
            loans::PrestamoResponse,
            loans::PrestamoPorIsbnResponse,
            loans::ActualizacionVencidosResponse,
            loans::UsuarioResumen,
            loans::DocumentoResumen,
            loans::EjemplarResumen,
            loans::BibliotecaResumen,
            // Dashboard
            crate::services::stats::DashboardStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "documentos", description = "Gestión del catálogo de documentos"),
        (name = "prestamos", description = "Gestión de préstamos"),
        (name = "dashboard", description = "Indicadores del panel de administración")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
