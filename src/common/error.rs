use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Tipo de erro único da aplicação. Cada handler devolve Result<_, AppError>
// e nada sobe além disso.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Período inválido: {0}")]
    InvalidPeriod(String),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("{0} não encontrado")]
    NotFound(String),

    #[error("Já existe um cupom ativo")]
    CouponAlreadyActive,

    // Mutação direcionada que não afetou exatamente uma linha.
    // Diferente de um erro de transporte: a query rodou, mas o resultado não bate.
    #[error(
        "Expected exactly 1 row {action} in \"{table}\", got {affected}. \
         Check permissions for table \"{table}\" or that the id exists."
    )]
    RowCountMismatch {
        action: &'static str,
        table: &'static str,
        affected: usize,
    },

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPeriod(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CouponAlreadyActive | AppError::RowCountMismatch { .. } => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match &self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidCredentials => "Login ou senha inválidos.".to_string(),
            AppError::InvalidToken => "Token de autenticação inválido ou ausente.".to_string(),
            AppError::CouponAlreadyActive => {
                "Só pode existir um cupom ativo. Remova o atual antes de criar outro.".to_string()
            }
            AppError::RowCountMismatch { .. } => {
                tracing::warn!("⚠️ {}", self);
                self.to_string()
            }
            AppError::InvalidPeriod(_) | AppError::BadRequest(_) | AppError::NotFound(_) => {
                self.to_string()
            }

            // Falha de query/rede: o operador vê a mensagem do próprio banco
            AppError::DatabaseError(e) => {
                tracing::error!("Erro de banco de dados: {:?}", e);
                e.as_database_error()
                    .map(|db| db.message().to_string())
                    .unwrap_or_else(|| e.to_string())
            }

            // Todo o resto (JWT, bcrypt, anyhow) vira 500.
            // A mensagem detalhada fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
