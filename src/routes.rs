// src/routes.rs

use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

/// Monta o app completo: rotas públicas, rotas protegidas pelo `auth_guard`,
/// Swagger e as camadas do tower-http.
pub fn app(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Tudo abaixo exige Bearer
    let protected_routes = Router::new()
        .route("/auth/session", get(handlers::auth::session))
        // Calendário
        .route("/calendar", get(handlers::bookings::get_calendar))
        .route("/calendar/days/{date}", get(handlers::bookings::get_day))
        // Registros
        .route("/bookings/{id}", delete(handlers::bookings::delete_booking))
        .route("/bookings/{id}/complete", post(handlers::bookings::complete_booking))
        .route("/bookings/{id}/cancel", post(handlers::bookings::cancel_booking))
        // Cupons
        .route(
            "/coupons",
            get(handlers::coupons::list_coupons).post(handlers::coupons::create_coupon),
        )
        .route("/coupons/active", get(handlers::coupons::get_active_coupon))
        .route("/coupons/reset-usage", post(handlers::coupons::reset_coupon_usage))
        .route("/coupons/{id}", delete(handlers::coupons::delete_coupon))
        // Relatórios
        .route("/analytics/overview", get(handlers::analytics::get_overview))
        .route("/analytics/revenue", get(handlers::analytics::get_revenue))
        .route("/analytics/coupons", get(handlers::analytics::get_coupon_report))
        // Clientes
        .route("/clients", get(handlers::clients::list_clients))
        .route("/clients/bookings", get(handlers::clients::get_client_bookings))
        .route("/users/{id}/bookings", get(handlers::clients::get_user_bookings))
        // Notificações
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/unread-count", get(handlers::notifications::unread_count))
        .route("/notifications/{id}/read", post(handlers::notifications::mark_notification_read))
        // Invalidação (SSE)
        .route("/events", get(handlers::events::events))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = cors_layer(app_state.settings.cors_origin.as_deref());

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Settings,
        services::{auth::fixtures, catalog::ServiceCatalog},
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use std::collections::HashMap;
    use tower::ServiceExt;

    // Pool preguiçoso: nenhuma das rotas testadas aqui chega a tocar o banco
    fn test_app() -> Router {
        let vars: HashMap<String, String> = [
            ("DATABASE_URL", "postgres://localhost/unused"),
            ("ADMIN_LOGIN", fixtures::LOGIN),
            ("ADMIN_PASSWORD", fixtures::PASSWORD),
            ("JWT_SECRET", "test-secret"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let settings = Settings::from_map(&vars).unwrap();
        let pool = PgPoolOptions::new()
            .connect_lazy(&settings.database_url)
            .unwrap();
        let state = AppState::from_parts(pool, settings, ServiceCatalog::default(), fixtures::auth_service());
        app(state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router) -> String {
        let request = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "login": fixtures::LOGIN, "password": fixtures::PASSWORD }).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = test_app();
        for uri in ["/api/calendar", "/api/analytics/revenue", "/api/coupons", "/api/events"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }

        let response = app
            .oneshot(
                Request::get("/api/auth/session")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_login_is_401_and_empty_login_is_400() {
        let app = test_app();
        let wrong = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "login": "admin", "password": "nope" }).to_string()))
            .unwrap();
        assert_eq!(app.clone().oneshot(wrong).await.unwrap().status(), StatusCode::UNAUTHORIZED);

        let empty = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "login": "", "password": "" }).to_string()))
            .unwrap();
        let response = app.oneshot(empty).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["details"]["login"].is_array());
    }

    #[tokio::test]
    async fn session_round_trip() {
        let app = test_app();
        let token = login(&app).await;

        let response = app
            .oneshot(
                Request::get("/api/auth/session")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["login"], fixtures::LOGIN);
    }

    #[tokio::test]
    async fn invalid_period_is_rejected_before_the_database() {
        let app = test_app();
        let token = login(&app).await;

        for uri in ["/api/calendar?year=2025&month=13", "/api/analytics/revenue?period=month&month=0"] {
            let response = app
                .clone()
                .oneshot(
                    Request::get(uri)
                        .header(header::AUTHORIZATION, format!("Bearer {}", token))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn unknown_event_collection_is_400() {
        let app = test_app();
        let token = login(&app).await;
        let response = app
            .oneshot(
                Request::get("/api/events?collections=orders")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = test_app()
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc = body_json(response).await;
        assert!(doc["paths"]["/api/analytics/revenue"].is_object());
    }
}
