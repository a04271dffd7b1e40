// src/db/coupon_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::expect_single_row, error::AppError},
    models::coupon::{Coupon, COUPON_DELETED, COUPON_WORKING},
};

const COUPON_COLUMNS: &str = "id, cupon_name, discount_percent, status, created_at, deleted_at";

#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Todos os cupons, inclusive removidos, do mais novo para o mais antigo.
    pub async fn list_all(&self) -> Result<Vec<Coupon>, AppError> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM cupons ORDER BY created_at DESC");
        let coupons = sqlx::query_as::<_, Coupon>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(coupons)
    }

    pub async fn find_working<'e, E>(&self, executor: E) -> Result<Option<Coupon>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM cupons WHERE status = $1 \
             ORDER BY created_at DESC LIMIT 1"
        );
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(COUPON_WORKING)
            .fetch_optional(executor)
            .await?;
        Ok(coupon)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        cupon_name: &str,
        discount_percent: i32,
    ) -> Result<Coupon, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO cupons (cupon_name, discount_percent, status) \
             VALUES ($1, $2, $3) RETURNING {COUPON_COLUMNS}"
        );
        sqlx::query_as::<_, Coupon>(&sql)
            .bind(cupon_name)
            .bind(discount_percent)
            .bind(COUPON_WORKING)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                // Índice parcial `cupons_single_working_idx`: outro cupom ativo
                // foi criado entre a checagem e o insert
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return AppError::CouponAlreadyActive;
                    }
                }
                e.into()
            })
    }

    /// Remoção lógica: status 'deleted' + deleted_at.
    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<Coupon, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE cupons SET status = $2, deleted_at = now() \
             WHERE id = $1 AND status <> $2 RETURNING {COUPON_COLUMNS}"
        );
        let rows = sqlx::query_as::<_, Coupon>(&sql)
            .bind(id)
            .bind(COUPON_DELETED)
            .fetch_all(executor)
            .await?;
        expect_single_row(rows, "updated", "cupons")
    }
}
