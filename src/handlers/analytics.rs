// src/handlers/analytics.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        analytics::{CouponReport, CouponReportQuery, OverviewReport, RevenueReport},
        auth::AdminSession,
        period::{today, PeriodQuery, ReportPeriod},
    },
};

#[utoipa::path(
    get,
    path = "/api/analytics/overview",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Clientes, produtos e cupons do período", body = OverviewReport),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<OverviewReport>, AppError> {
    let period = ReportPeriod::from_query(&query, today())?;
    Ok(Json(app_state.report_service.overview(period).await?))
}

#[utoipa::path(
    get,
    path = "/api/analytics/revenue",
    tag = "Analytics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Receita detalhada com comparação ao período anterior", body = RevenueReport),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_revenue(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<RevenueReport>, AppError> {
    let period = ReportPeriod::from_query(&query, today())?;
    Ok(Json(app_state.report_service.revenue(period).await?))
}

#[utoipa::path(
    get,
    path = "/api/analytics/coupons",
    tag = "Analytics",
    params(CouponReportQuery),
    responses(
        (status = 200, description = "Efetividade dos cupons no período", body = CouponReport),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_coupon_report(
    State(app_state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<CouponReportQuery>,
) -> Result<Json<CouponReport>, AppError> {
    let period = ReportPeriod::from_query(&query.period_query(), today())?;
    let report = app_state
        .report_service
        .coupons(period, query.coupon_filter())
        .await?;
    Ok(Json(report))
}
