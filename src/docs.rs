// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::session,

        // --- Calendar / Bookings ---
        handlers::bookings::get_calendar,
        handlers::bookings::get_day,
        handlers::bookings::complete_booking,
        handlers::bookings::cancel_booking,
        handlers::bookings::delete_booking,

        // --- Coupons ---
        handlers::coupons::list_coupons,
        handlers::coupons::get_active_coupon,
        handlers::coupons::create_coupon,
        handlers::coupons::delete_coupon,
        handlers::coupons::reset_coupon_usage,

        // --- Analytics ---
        handlers::analytics::get_overview,
        handlers::analytics::get_revenue,
        handlers::analytics::get_coupon_report,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::get_client_bookings,
        handlers::clients::get_user_bookings,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_notification_read,

        // --- Events ---
        handlers::events::events,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::AdminSession,

            // --- Bookings ---
            models::booking::BookingStatus,
            models::booking::BookingStatusRow,
            models::booking::ResolvedService,
            models::booking::BookingDetail,
            models::calendar::BookingPreview,
            models::calendar::CalendarDay,
            models::calendar::MonthCalendar,
            models::calendar::DayDetails,

            // --- Coupons ---
            models::coupon::Coupon,
            models::coupon::CreateCouponPayload,
            models::coupon::CouponUsageReset,

            // --- Analytics ---
            models::period::PeriodKind,
            models::period::PeriodInfo,
            models::analytics::ClientTotal,
            models::analytics::ProductStat,
            models::analytics::ProductTable,
            models::analytics::CouponSplit,
            models::analytics::ClientSegments,
            models::analytics::DailyBucket,
            models::analytics::WeekdayBucket,
            models::analytics::UnregisteredClient,
            models::analytics::OverviewReport,
            models::analytics::RevenueReport,
            models::analytics::CouponReport,
            models::analytics::DirectoryFilter,
            models::analytics::DirectoryEntry,
            models::analytics::ClientDirectory,
            models::user::RegisteredUser,

            // --- Notifications ---
            models::notification::Notification,
            models::notification::UnreadCount,

            // --- Events ---
            services::invalidation::Collection,
            services::invalidation::ChangeOp,
            services::invalidation::ChangeSource,
            services::invalidation::ChangeEvent,
        )
    ),
    tags(
        (name = "Auth", description = "Login do administrador e sessão"),
        (name = "Calendar", description = "Grade mensal e detalhes do dia"),
        (name = "Bookings", description = "Concluir, cancelar e remover registros"),
        (name = "Coupons", description = "Gestão de cupons (no máximo um ativo)"),
        (name = "Analytics", description = "Relatórios de receita, clientes e cupons"),
        (name = "Clients", description = "Diretório de clientes e históricos"),
        (name = "Notifications", description = "Notificações do sino"),
        (name = "Events", description = "Invalidação em tempo real (SSE)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
