// src/handlers/coupons.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        auth::AdminSession,
        coupon::{Coupon, CouponUsageReset, CreateCouponPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/coupons",
    tag = "Coupons",
    responses(
        (status = 200, description = "Todos os cupons, inclusive removidos", body = Vec<Coupon>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_coupons(
    State(app_state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Coupon>>, AppError> {
    Ok(Json(app_state.coupon_service.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/api/coupons/active",
    tag = "Coupons",
    responses(
        (status = 200, description = "Cupom ativo ou null", body = Option<Coupon>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_active_coupon(
    State(app_state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Option<Coupon>>, AppError> {
    Ok(Json(app_state.coupon_service.active().await?))
}

#[utoipa::path(
    post,
    path = "/api/coupons",
    tag = "Coupons",
    request_body = CreateCouponPayload,
    responses(
        (status = 201, description = "Cupom criado", body = Coupon),
        (status = 400, description = "Nome vazio ou desconto fora de 1-100"),
        (status = 409, description = "Já existe um cupom ativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_coupon(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Json(payload): Json<CreateCouponPayload>,
) -> Result<impl IntoResponse, AppError> {
    let coupon = app_state.coupon_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

#[utoipa::path(
    delete,
    path = "/api/coupons/{id}",
    tag = "Coupons",
    params(("id" = Uuid, Path, description = "ID do cupom")),
    responses(
        (status = 200, description = "Cupom marcado como removido", body = Coupon),
        (status = 409, description = "Nenhuma linha atualizada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_coupon(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<Json<Coupon>, AppError> {
    Ok(Json(app_state.coupon_service.delete(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/coupons/reset-usage",
    tag = "Coupons",
    responses(
        (status = 200, description = "Usuários que voltaram para 'not_used'", body = CouponUsageReset)
    ),
    security(("api_jwt" = []))
)]
pub async fn reset_coupon_usage(
    State(app_state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<CouponUsageReset>, AppError> {
    Ok(Json(app_state.coupon_service.reset_usage().await?))
}
