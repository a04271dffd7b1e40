//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

// Importações principais
use crate::config::{AppState, Settings};

const DEFAULT_LOG_FILTER: &str = "clinic_admin=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger; RUST_LOG sobrescreve o filtro padrão
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env().context("Falha ao ler a configuração")?;
    let addr = settings.server_addr;
    let run_migrations = settings.run_migrations;

    let app_state = AppState::new(settings)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    // O schema é mantido fora daqui; migração só sob demanda (RUN_MIGRATIONS=true)
    if run_migrations {
        sqlx::migrate!()
            .run(&app_state.db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados.")?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    // Repassa os pg_notify do banco para o hub (mudanças feitas por outros sistemas)
    tokio::spawn(app_state.hub.clone().run_pg_relay(app_state.db_pool.clone()));

    let app = routes::app(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(addr)
        .await
        .context("Falha ao iniciar o listener TCP")?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Swagger em http://{}/swagger-ui", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
