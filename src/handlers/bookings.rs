// src/handlers/bookings.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        auth::AdminSession,
        booking::BookingStatusRow,
        calendar::{CalendarQuery, DayDetails, MonthCalendar},
        period::today,
    },
};

// =============================================================================
//  CALENDÁRIO
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/calendar",
    tag = "Calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Grade do mês (segunda a domingo)", body = MonthCalendar),
        (status = 400, description = "Mês ou ano inválido"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_calendar(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<MonthCalendar>, AppError> {
    let today = today();
    let calendar = app_state
        .booking_service
        .month_calendar(
            query.year.unwrap_or(today.year()),
            query.month.unwrap_or(today.month()),
            today,
        )
        .await?;
    Ok(Json(calendar))
}

#[utoipa::path(
    get,
    path = "/api/calendar/days/{date}",
    tag = "Calendar",
    params(("date" = String, Path, description = "Data no formato AAAA-MM-DD")),
    responses(
        (status = 200, description = "Registros do dia, ordenados por horário", body = DayDetails),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_day(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DayDetails>, AppError> {
    Ok(Json(app_state.booking_service.day(date).await?))
}

// =============================================================================
//  MUTAÇÕES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/complete",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Registro concluído", body = BookingStatusRow),
        (status = 409, description = "Nenhuma linha atualizada (id inexistente ou status terminal)")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_booking(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingStatusRow>, AppError> {
    Ok(Json(app_state.booking_service.complete(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/cancel",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Registro cancelado (continua no banco)", body = BookingStatusRow),
        (status = 409, description = "Nenhuma linha atualizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_booking(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingStatusRow>, AppError> {
    Ok(Json(app_state.booking_service.cancel(id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Registro removido definitivamente", body = BookingStatusRow),
        (status = 409, description = "Nenhuma linha removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_booking(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingStatusRow>, AppError> {
    Ok(Json(app_state.booking_service.purge(id).await?))
}
