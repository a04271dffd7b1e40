// src/db/booking_repo.rs

use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{expect_single_row, ACTIVE_BOOKING_FILTER},
        error::AppError,
    },
    models::booking::{Booking, BookingRow, BookingStatusRow, ClientKey, RawServices},
    services::catalog::ServiceCatalog,
};

const BOOKING_COLUMNS: &str =
    "id, name, phone, date, time, services, total, status, cabinet_id, cupon_name";

// Só sai de 'new' (ou NULL / desconhecido); succeeded e canceled são terminais
const OPEN_STATUS_FILTER: &str =
    "lower(coalesce(status, 'new')) NOT IN ('succeeded', 'canceled', 'cancelled')";

// Repositório da tabela `bookings`. Converte cada linha em `Booking` na saída,
// resolvendo os serviços contra o catálogo; nenhum chamador vê `BookingRow`.
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
    catalog: Arc<ServiceCatalog>,
}

impl BookingRepository {
    pub fn new(pool: PgPool, catalog: Arc<ServiceCatalog>) -> Self {
        Self { pool, catalog }
    }

    fn normalize(&self, rows: Vec<BookingRow>) -> Vec<Booking> {
        rows.into_iter()
            .map(|mut row| {
                let raw = RawServices::from_value(row.services.take());
                let services = self.catalog.resolve_all(&raw);
                Booking::from_row(row, services)
            })
            .collect()
    }

    // =========================================================================
    //  LEITURAS (sempre sem cancelados)
    // =========================================================================

    /// Registros com `start <= date <= end`.
    pub async fn find_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE date >= $1 AND date <= $2 AND {ACTIVE_BOOKING_FILTER} \
             ORDER BY date, time"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(self.normalize(rows))
    }

    pub async fn find_on_date(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError> {
        self.find_in_range(date, date).await
    }

    /// Pares (nome, telefone) com algum registro antes de `start`.
    /// Base para separar clientes novos de recorrentes.
    pub async fn find_client_keys_before(&self, start: NaiveDate) -> Result<HashSet<ClientKey>, AppError> {
        let sql = format!(
            "SELECT DISTINCT coalesce(name, '') AS name, coalesce(phone, '') AS phone \
             FROM bookings WHERE date < $1 AND {ACTIVE_BOOKING_FILTER}"
        );
        let keys = sqlx::query_as::<_, (String, String)>(&sql)
            .bind(start)
            .fetch_all(&self.pool)
            .await?;
        Ok(keys.into_iter().map(|(name, phone)| ClientKey::new(name, phone)).collect())
    }

    /// Registros de um cliente não registrado dentro do período.
    pub async fn find_for_client(
        &self,
        name: &str,
        phone: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Booking>, AppError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE coalesce(name, '') = $1 AND coalesce(phone, '') = $2 \
               AND date >= $3 AND date <= $4 AND {ACTIVE_BOOKING_FILTER} \
             ORDER BY date DESC, time DESC"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(name)
            .bind(phone)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(self.normalize(rows))
    }

    /// Histórico de um usuário cadastrado: pelo `cabinet_id` ou pelo telefone
    /// do perfil (registros feitos antes do cadastro). Uma única query, então
    /// nenhum id aparece duas vezes.
    pub async fn find_for_user(&self, user_id: Uuid, phone: Option<&str>) -> Result<Vec<Booking>, AppError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE (cabinet_id = $1 OR ($2::text IS NOT NULL AND phone = $2)) \
               AND {ACTIVE_BOOKING_FILTER} \
             ORDER BY date DESC, time DESC"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(user_id)
            .bind(phone)
            .fetch_all(&self.pool)
            .await?;
        Ok(self.normalize(rows))
    }

    /// Todo o histórico, do mais recente para o mais antigo.
    pub async fn find_all_active(&self) -> Result<Vec<Booking>, AppError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {ACTIVE_BOOKING_FILTER} \
             ORDER BY date DESC, time DESC"
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(self.normalize(rows))
    }

    // =========================================================================
    //  MUTAÇÕES (uma linha por id, dentro da transação do chamador)
    // =========================================================================

    pub async fn mark_succeeded<'e, E>(&self, executor: E, id: Uuid) -> Result<BookingStatusRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE bookings SET status = 'succeeded' \
             WHERE id = $1 AND {OPEN_STATUS_FILTER} RETURNING id, status"
        );
        let rows = sqlx::query_as::<_, BookingStatusRow>(&sql)
            .bind(id)
            .fetch_all(executor)
            .await?;
        expect_single_row(rows, "updated", "bookings")
    }

    /// Cancelamento lógico: o registro fica no banco com status 'canceled'.
    pub async fn mark_canceled<'e, E>(&self, executor: E, id: Uuid) -> Result<BookingStatusRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE bookings SET status = 'canceled' \
             WHERE id = $1 AND {OPEN_STATUS_FILTER} RETURNING id, status"
        );
        let rows = sqlx::query_as::<_, BookingStatusRow>(&sql)
            .bind(id)
            .fetch_all(executor)
            .await?;
        expect_single_row(rows, "updated", "bookings")
    }

    /// Remoção definitiva.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<BookingStatusRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, BookingStatusRow>(
            "DELETE FROM bookings WHERE id = $1 RETURNING id, status",
        )
        .bind(id)
        .fetch_all(executor)
        .await?;
        expect_single_row(rows, "deleted", "bookings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::BookingStatus;
    use axum::{http::StatusCode, response::IntoResponse};

    // Todo status terminal precisa estar fora do filtro de "aberto";
    // concluir ou cancelar um registro terminal então não casa nenhuma linha.
    #[test]
    fn terminal_statuses_are_outside_the_open_filter() {
        for raw in ["succeeded", "canceled", "cancelled"] {
            assert_ne!(BookingStatus::from_db(Some(raw)), BookingStatus::New, "{}", raw);
            assert!(OPEN_STATUS_FILTER.contains(&format!("'{raw}'")), "{}", raw);
        }
        assert!(OPEN_STATUS_FILTER.starts_with("lower(coalesce(status, 'new'))"));
    }

    #[test]
    fn finishing_a_terminal_booking_is_a_409() {
        let err = expect_single_row(Vec::<BookingStatusRow>::new(), "updated", "bookings").unwrap_err();
        assert!(matches!(err, AppError::RowCountMismatch { affected: 0, .. }));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
