// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::expect_single_row, error::AppError},
    models::notification::Notification,
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Não lidas, mais recentes primeiro
    pub async fn list_unread(&self, limit: i64) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT id, message, is_read, created_at FROM notifications \
             WHERE is_read = false ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn count_unread(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM notifications WHERE is_read = false")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn mark_read<'e, E>(&self, executor: E, id: Uuid) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = true WHERE id = $1 \
             RETURNING id, message, is_read, created_at",
        )
        .bind(id)
        .fetch_all(executor)
        .await?;
        expect_single_row(rows, "updated", "notifications")
    }
}
