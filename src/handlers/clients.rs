// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        analytics::{ClientBookingsQuery, ClientDirectory, ClientDirectoryQuery},
        auth::AdminSession,
        booking::BookingDetail,
        period::{today, ReportPeriod},
    },
};

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(ClientDirectoryQuery),
    responses(
        (status = 200, description = "Todos os clientes, cadastrados ou não", body = ClientDirectory)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<ClientDirectoryQuery>,
) -> Result<Json<ClientDirectory>, AppError> {
    let directory = app_state
        .report_service
        .client_directory(query.filter.unwrap_or_default(), query.q.as_deref())
        .await?;
    Ok(Json(directory))
}

#[utoipa::path(
    get,
    path = "/api/clients/bookings",
    tag = "Clients",
    params(ClientBookingsQuery),
    responses(
        (status = 200, description = "Registros do cliente no período, mais recentes primeiro", body = Vec<BookingDetail>),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client_bookings(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<ClientBookingsQuery>,
) -> Result<Json<Vec<BookingDetail>>, AppError> {
    let period = ReportPeriod::from_query(&query.period_query(), today())?;
    let history = app_state
        .report_service
        .client_bookings(&query.name, &query.phone, period)
        .await?;
    Ok(Json(history))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/bookings",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do usuário cadastrado")),
    responses(
        (status = 200, description = "Histórico completo do usuário", body = Vec<BookingDetail>),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user_bookings(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BookingDetail>>, AppError> {
    Ok(Json(app_state.report_service.user_bookings(id).await?))
}
