// src/config.rs

use std::{collections::HashMap, env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{BookingRepository, CouponRepository, NotificationRepository, UserRepository},
    services::{
        auth::AuthService, booking_service::BookingService, catalog::ServiceCatalog,
        coupon_service::CouponService, invalidation::InvalidationHub,
        notification_service::NotificationService, report_service::ReportService,
    },
};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

// Configuração lida do ambiente (.env carregado pelo dotenvy)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub admin_login: String,
    pub admin_password: String,
    pub jwt_secret: String,
    pub server_addr: SocketAddr,
    pub run_migrations: bool,
    pub service_catalog_path: Option<PathBuf>,
    pub cors_origin: Option<String>,
    pub token_ttl_hours: i64,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_map(&vars)
    }

    /// Separado de `from_env` para poder testar sem mexer no ambiente do processo.
    pub fn from_map(vars: &HashMap<String, String>) -> anyhow::Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key)
                .map(str::to_string)
                .with_context(|| format!("{} deve ser definida", key))
        };

        let admin_password = vars.get("ADMIN_PASSWORD").cloned().unwrap_or_default();
        if admin_password.is_empty() {
            bail!("ADMIN_PASSWORD deve ser definida e não pode ser vazia");
        }

        let server_addr = get("SERVER_ADDR")
            .unwrap_or(DEFAULT_ADDR)
            .parse::<SocketAddr>()
            .context("SERVER_ADDR inválido")?;

        let run_migrations = match get("RUN_MIGRATIONS") {
            None => false,
            Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
        };

        let token_ttl_hours = match get("TOKEN_TTL_HOURS") {
            None => DEFAULT_TOKEN_TTL_HOURS,
            Some(v) => {
                let hours: i64 = v.parse().context("TOKEN_TTL_HOURS deve ser um número")?;
                if hours <= 0 {
                    bail!("TOKEN_TTL_HOURS deve ser positivo");
                }
                hours
            }
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            admin_login: required("ADMIN_LOGIN")?,
            admin_password,
            jwt_secret: required("JWT_SECRET")?,
            server_addr,
            run_migrations,
            service_catalog_path: get("SERVICE_CATALOG_PATH").map(PathBuf::from),
            cors_origin: get("CORS_ORIGIN").map(str::to_string),
            token_ttl_hours,
        })
    }

    pub fn load_catalog(&self) -> anyhow::Result<ServiceCatalog> {
        match &self.service_catalog_path {
            Some(path) => {
                let catalog = ServiceCatalog::from_json_file(path)?;
                tracing::info!("📋 Catálogo de serviços carregado ({} itens)", catalog.len());
                Ok(catalog)
            }
            None => Ok(ServiceCatalog::default()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub hub: InvalidationHub,
    pub auth_service: AuthService,
    pub booking_service: BookingService,
    pub coupon_service: CouponService,
    pub notification_service: NotificationService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let catalog = settings.load_catalog()?;
        let auth_service = AuthService::new(
            &settings.admin_login,
            &settings.admin_password,
            settings.jwt_secret.clone(),
            settings.token_ttl_hours,
        )?;

        Ok(Self::from_parts(db_pool, settings, catalog, auth_service))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        db_pool: PgPool,
        settings: Settings,
        catalog: ServiceCatalog,
        auth_service: AuthService,
    ) -> Self {
        let hub = InvalidationHub::new();
        let catalog = Arc::new(catalog);

        let booking_repo = BookingRepository::new(db_pool.clone(), catalog);
        let user_repo = UserRepository::new(db_pool.clone());
        let coupon_repo = CouponRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let booking_service = BookingService::new(booking_repo.clone(), db_pool.clone(), hub.clone());
        let coupon_service =
            CouponService::new(coupon_repo.clone(), user_repo.clone(), db_pool.clone(), hub.clone());
        let notification_service =
            NotificationService::new(notification_repo, db_pool.clone(), hub.clone());
        let report_service = ReportService::new(booking_repo, user_repo, coupon_repo);

        Self {
            db_pool,
            settings: Arc::new(settings),
            hub,
            auth_service,
            booking_service,
            coupon_service,
            notification_service,
            report_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> HashMap<String, String> {
        [
            ("DATABASE_URL", "postgres://localhost/clinic"),
            ("ADMIN_LOGIN", "admin"),
            ("ADMIN_PASSWORD", "secret"),
            ("JWT_SECRET", "jwt"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn defaults_are_applied() {
        let s = Settings::from_map(&base()).unwrap();
        assert_eq!(s.server_addr.to_string(), "0.0.0.0:3000");
        assert!(!s.run_migrations);
        assert_eq!(s.token_ttl_hours, 12);
        assert!(s.service_catalog_path.is_none());
        assert!(s.cors_origin.is_none());
    }

    #[test]
    fn credentials_must_not_be_empty() {
        let mut vars = base();
        vars.insert("ADMIN_PASSWORD".into(), "".into());
        assert!(Settings::from_map(&vars).is_err());

        let mut vars = base();
        vars.insert("ADMIN_LOGIN".into(), "   ".into());
        assert!(Settings::from_map(&vars).is_err());

        let mut vars = base();
        vars.remove("JWT_SECRET");
        assert!(Settings::from_map(&vars).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = base();
        vars.insert("SERVER_ADDR".into(), "127.0.0.1:8080".into());
        vars.insert("RUN_MIGRATIONS".into(), "true".into());
        vars.insert("TOKEN_TTL_HOURS".into(), "2".into());
        vars.insert("CORS_ORIGIN".into(), "http://localhost:5173".into());
        let s = Settings::from_map(&vars).unwrap();
        assert_eq!(s.server_addr.port(), 8080);
        assert!(s.run_migrations);
        assert_eq!(s.token_ttl_hours, 2);
        assert_eq!(s.cors_origin.as_deref(), Some("http://localhost:5173"));

        vars.insert("TOKEN_TTL_HOURS".into(), "0".into());
        assert!(Settings::from_map(&vars).is_err());
    }
}
