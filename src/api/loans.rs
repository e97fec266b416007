//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{CreateLoan, CreateLoanFromRutIsbn, PrestamoStats},
        user::formatear_rut,
        Documento, Ejemplar, LoanStatus, LoanType, Prestamo, Usuario,
    },
    AppState,
};

fn parse_tipo_prestamo(raw: &str) -> AppResult<LoanType> {
    raw.parse().map_err(|_| {
        AppError::Validation(format!(
            "tipo_prestamo inválido: {} (se espera domicilio o sala)",
            raw
        ))
    })
}

/// Quick-loan request from the circulation counter
#[derive(Deserialize, ToSchema)]
pub struct PrestamoSimpleCreate {
    /// Borrower RUT, with or without dots and dash
    pub rut: String,
    /// ISBN of the document to lend
    pub isbn: String,
    /// "domicilio" (default) or "sala"
    pub tipo_prestamo: Option<String>,
    /// Library branch; the first active one is used when omitted
    pub biblioteca_id: Option<i32>,
}

/// Full loan request over explicit copies
#[derive(Deserialize, ToSchema)]
pub struct PrestamoCreate {
    pub usuario_id: i32,
    pub ejemplar_ids: Vec<i32>,
    /// "domicilio" or "sala"
    pub tipo_prestamo: String,
    pub bibliotecario_id: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct UsuarioResumen {
    pub id: i32,
    pub rut: String,
    pub nombres: String,
    pub apellidos: String,
    pub email: Option<String>,
    pub rol: String,
    pub sancionado: bool,
}

impl From<&Usuario> for UsuarioResumen {
    fn from(u: &Usuario) -> Self {
        Self {
            id: u.id,
            rut: u.rut.clone(),
            nombres: u.nombres.clone(),
            apellidos: u.apellidos.clone(),
            email: u.email.clone(),
            rol: u.rol.clone(),
            sancionado: u.esta_sancionado(),
        }
    }
}

/// Document fields clients need when handling a loan; `edicion` is the ISBN
#[derive(Serialize, ToSchema)]
pub struct DocumentoResumen {
    pub id: i32,
    pub titulo: String,
    pub autor: Option<String>,
    pub anio: Option<i32>,
    pub edicion: Option<String>,
    pub categoria: Option<String>,
}

impl From<&Documento> for DocumentoResumen {
    fn from(d: &Documento) -> Self {
        Self {
            id: d.id,
            titulo: d.titulo.clone(),
            autor: d.autor.clone(),
            anio: d.anio,
            edicion: d.edicion.clone(),
            categoria: d.categoria.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct EjemplarResumen {
    pub id: i32,
    pub codigo: String,
}

#[derive(Serialize, ToSchema)]
pub struct BibliotecaResumen {
    pub id: i32,
    pub nombre: String,
}

/// Response for the quick-loan path
#[derive(Serialize, ToSchema)]
pub struct PrestamoSimpleResponse {
    pub mensaje: String,
    pub prestamo: Prestamo,
    pub usuario: UsuarioResumen,
    pub documento: DocumentoResumen,
    pub ejemplar: EjemplarResumen,
    pub biblioteca: BibliotecaResumen,
}

/// Response for the full-loan path
#[derive(Serialize, ToSchema)]
pub struct PrestamoResponse {
    pub mensaje: String,
    pub prestamo: Prestamo,
}

/// Open loan found through an ISBN lookup
#[derive(Serialize, ToSchema)]
pub struct PrestamoPorIsbnResponse {
    pub prestamo: Prestamo,
    /// Overdue as observed at request time
    pub vencido: bool,
    pub usuario: UsuarioResumen,
    pub documento: DocumentoResumen,
}

#[derive(Serialize, ToSchema)]
pub struct ActualizacionVencidosResponse {
    pub mensaje: String,
    pub actualizados: usize,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PrestamoActivosQuery {
    pub usuario_id: Option<i32>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistorialQuery {
    /// Filter by status (activo, vencido, devuelto)
    pub estado: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Create a loan from a RUT and an ISBN
#[utoipa::path(
    post,
    path = "/prestamos/registrar-desde-rut-isbn",
    tag = "prestamos",
    request_body = PrestamoSimpleCreate,
    responses(
        (status = 201, description = "Loan created", body = PrestamoSimpleResponse),
        (status = 400, description = "Invalid RUT, type or ineligible user"),
        (status = 404, description = "User or document not found"),
        (status = 409, description = "No copy available")
    )
)]
pub async fn crear_prestamo_desde_rut_isbn(
    State(state): State<AppState>,
    Json(request): Json<PrestamoSimpleCreate>,
) -> AppResult<(StatusCode, Json<PrestamoSimpleResponse>)> {
    let rut = formatear_rut(&request.rut)?;
    let tipo = match request.tipo_prestamo.as_deref() {
        Some(raw) => parse_tipo_prestamo(raw)?,
        None => LoanType::Domicilio,
    };

    let data = CreateLoanFromRutIsbn {
        rut,
        isbn: request.isbn,
        tipo,
        biblioteca_id: request.biblioteca_id,
    };

    let (prestamo, usuario, documento, ejemplar, biblioteca) =
        state.services.loans.create_from_rut_isbn(data).await?;

    Ok((
        StatusCode::CREATED,
        Json(PrestamoSimpleResponse {
            mensaje: "Préstamo registrado exitosamente".to_string(),
            usuario: UsuarioResumen::from(&usuario),
            documento: DocumentoResumen::from(&documento),
            ejemplar: EjemplarResumen {
                id: ejemplar.id,
                codigo: ejemplar.codigo,
            },
            biblioteca: BibliotecaResumen {
                id: biblioteca.id,
                nombre: biblioteca.nombre,
            },
            prestamo,
        }),
    ))
}

/// Create a loan over an explicit set of copies
#[utoipa::path(
    post,
    path = "/prestamos/registrar",
    tag = "prestamos",
    request_body = PrestamoCreate,
    responses(
        (status = 201, description = "Loan created", body = PrestamoResponse),
        (status = 400, description = "Invalid type, empty copy list or ineligible user"),
        (status = 404, description = "User or copies not found"),
        (status = 409, description = "A copy stopped being available")
    )
)]
pub async fn crear_prestamo(
    State(state): State<AppState>,
    Json(request): Json<PrestamoCreate>,
) -> AppResult<(StatusCode, Json<PrestamoResponse>)> {
    let tipo = parse_tipo_prestamo(&request.tipo_prestamo)?;

    let data = CreateLoan {
        usuario_id: request.usuario_id,
        ejemplar_ids: request.ejemplar_ids,
        tipo,
        bibliotecario_id: request.bibliotecario_id,
    };

    let prestamo = state.services.loans.create(data).await?;

    Ok((
        StatusCode::CREATED,
        Json(PrestamoResponse {
            mensaje: "Préstamo registrado exitosamente".to_string(),
            prestamo,
        }),
    ))
}

/// Look up the most recent open loan for a document by ISBN
#[utoipa::path(
    get,
    path = "/prestamos/buscar-por-isbn/{isbn}",
    tag = "prestamos",
    params(
        ("isbn" = String, Path, description = "Document ISBN")
    ),
    responses(
        (status = 200, description = "Open loan found", body = PrestamoPorIsbnResponse),
        (status = 404, description = "Document or open loan not found")
    )
)]
pub async fn buscar_prestamo_por_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<PrestamoPorIsbnResponse>> {
    let (prestamo, usuario, documento) = state.services.loans.lookup_active_by_isbn(&isbn).await?;

    let vencido = prestamo.vencido_a(Utc::now());
    Ok(Json(PrestamoPorIsbnResponse {
        vencido,
        usuario: UsuarioResumen::from(&usuario),
        documento: DocumentoResumen::from(&documento),
        prestamo,
    }))
}

/// List active loans
#[utoipa::path(
    get,
    path = "/prestamos/activos",
    tag = "prestamos",
    params(PrestamoActivosQuery),
    responses(
        (status = 200, description = "Active loans", body = Vec<Prestamo>)
    )
)]
pub async fn listar_prestamos_activos(
    State(state): State<AppState>,
    Query(query): Query<PrestamoActivosQuery>,
) -> AppResult<Json<Vec<Prestamo>>> {
    let loans = state
        .services
        .loans
        .list_active(query.usuario_id, query.page, query.size)
        .await?;
    Ok(Json(loans))
}

/// Home loans newly flipped to vencido by this request
#[utoipa::path(
    get,
    path = "/prestamos/vencidos",
    tag = "prestamos",
    responses(
        (status = 200, description = "Newly overdue home loans", body = Vec<Prestamo>)
    )
)]
pub async fn listar_prestamos_vencidos(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Prestamo>>> {
    let loans = state
        .services
        .loans
        .sweep_overdue(Some(LoanType::Domicilio))
        .await?;
    Ok(Json(loans))
}

/// In-room loans newly flipped to vencido by this request
#[utoipa::path(
    get,
    path = "/prestamos/sala-vencidos",
    tag = "prestamos",
    responses(
        (status = 200, description = "Newly overdue in-room loans", body = Vec<Prestamo>)
    )
)]
pub async fn listar_prestamos_sala_vencidos(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Prestamo>>> {
    let loans = state.services.loans.sweep_overdue(Some(LoanType::Sala)).await?;
    Ok(Json(loans))
}

/// Mark one overdue loan as notified
#[utoipa::path(
    patch,
    path = "/prestamos/{id}/notificado",
    tag = "prestamos",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan marked as notified", body = PrestamoResponse),
        (status = 400, description = "Loan is not overdue"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn marcar_notificado(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PrestamoResponse>> {
    let prestamo = state.services.loans.mark_notified(id).await?;
    Ok(Json(PrestamoResponse {
        mensaje: "Préstamo marcado como notificado".to_string(),
        prestamo,
    }))
}

/// Sweep every past-due active loan to vencido
#[utoipa::path(
    post,
    path = "/prestamos/notificar-vencidos",
    tag = "prestamos",
    responses(
        (status = 200, description = "Sweep result", body = ActualizacionVencidosResponse)
    )
)]
pub async fn notificar_vencidos(
    State(state): State<AppState>,
) -> AppResult<Json<ActualizacionVencidosResponse>> {
    let swept = state.services.loans.sweep_all_overdue().await?;
    Ok(Json(ActualizacionVencidosResponse {
        mensaje: format!("Se actualizaron {} préstamos a vencido", swept.len()),
        actualizados: swept.len(),
    }))
}

/// Return a loan, freeing its copies
#[utoipa::path(
    post,
    path = "/prestamos/{id}/devolver",
    tag = "prestamos",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan returned", body = PrestamoResponse),
        (status = 400, description = "Loan already returned"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn devolver_prestamo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PrestamoResponse>> {
    let prestamo = state.services.loans.return_loan(id).await?;
    Ok(Json(PrestamoResponse {
        mensaje: "Préstamo devuelto exitosamente".to_string(),
        prestamo,
    }))
}

/// Loan history for a user
#[utoipa::path(
    get,
    path = "/prestamos/usuarios/{id}/historial",
    tag = "prestamos",
    params(
        ("id" = i32, Path, description = "User ID"),
        HistorialQuery
    ),
    responses(
        (status = 200, description = "Loan history", body = Vec<Prestamo>),
        (status = 400, description = "Invalid status filter"),
        (status = 404, description = "User not found or empty history")
    )
)]
pub async fn historial_usuario(
    State(state): State<AppState>,
    Path(usuario_id): Path<i32>,
    Query(query): Query<HistorialQuery>,
) -> AppResult<Json<Vec<Prestamo>>> {
    let estado = match query.estado.as_deref() {
        Some(raw) => Some(raw.parse::<LoanStatus>().map_err(|_| {
            AppError::Validation(format!(
                "estado inválido: {} (se espera activo, vencido o devuelto)",
                raw
            ))
        })?),
        None => None,
    };

    let loans = state
        .services
        .loans
        .history(usuario_id, estado, query.page, query.size)
        .await?;
    Ok(Json(loans))
}

/// Copies attached to a loan
#[utoipa::path(
    get,
    path = "/prestamos/{id}/ejemplares",
    tag = "prestamos",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Copies of the loan", body = Vec<Ejemplar>),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn ejemplares_de_prestamo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Ejemplar>>> {
    // Every loan carries at least one copy, so an empty set means no loan.
    let copies = state.services.loans.get_copies(id).await?;
    if copies.is_empty() {
        return Err(AppError::NotFound("Préstamo no encontrado".to_string()));
    }
    Ok(Json(copies))
}

/// Aggregate loan statistics
#[utoipa::path(
    get,
    path = "/prestamos/estadisticas",
    tag = "prestamos",
    responses(
        (status = 200, description = "Loan statistics", body = PrestamoStats)
    )
)]
pub async fn estadisticas_prestamos(
    State(state): State<AppState>,
) -> AppResult<Json<PrestamoStats>> {
    let stats = state.services.loans.stats().await?;
    Ok(Json(stats))
}
