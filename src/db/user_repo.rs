// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::user::RegisteredUser};

const USER_COLUMNS: &str =
    "id, username, login, name, last_name, middle_name, number, age, created_at, cupon_status";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Cadastrados em [start, end)
    pub async fn find_registered_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RegisteredUser>, AppError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE created_at >= $1 AND created_at < $2 ORDER BY created_at"
        );
        let users = sqlx::query_as::<_, RegisteredUser>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<RegisteredUser>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        let users = sqlx::query_as::<_, RegisteredUser>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn find_all(&self) -> Result<Vec<RegisteredUser>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        let users = sqlx::query_as::<_, RegisteredUser>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<RegisteredUser>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, RegisteredUser>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Volta todos para 'not_used'. Operação em massa: devolve quantas linhas mudaram.
    pub async fn reset_coupon_status<'e, E>(&self, executor: E) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE users SET cupon_status = 'not_used' \
             WHERE cupon_status IS DISTINCT FROM 'not_used'",
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
