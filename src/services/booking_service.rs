// src/services/booking_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BookingRepository,
    models::{
        booking::BookingStatusRow,
        calendar::{DayDetails, MonthCalendar},
    },
    services::{
        calendar::{build_month_grid, day_details, grid_bounds},
        invalidation::{ChangeOp, ChangeSource, Collection, InvalidationHub},
    },
};

#[derive(Clone)]
pub struct BookingService {
    repo: BookingRepository,
    pool: PgPool,
    hub: InvalidationHub,
}

impl BookingService {
    pub fn new(repo: BookingRepository, pool: PgPool, hub: InvalidationHub) -> Self {
        Self { repo, pool, hub }
    }

    /// Grade do mês; busca a grade inteira, não só o mês.
    pub async fn month_calendar(&self, year: i32, month: u32, today: NaiveDate) -> Result<MonthCalendar, AppError> {
        let (start, end) = grid_bounds(year, month)?;
        let bookings = self.repo.find_in_range(start, end).await?;
        build_month_grid(year, month, &bookings, today)
    }

    pub async fn day(&self, date: NaiveDate) -> Result<DayDetails, AppError> {
        let bookings = self.repo.find_on_date(date).await?;
        Ok(day_details(date, &bookings))
    }

    pub async fn complete(&self, id: Uuid) -> Result<BookingStatusRow, AppError> {
        let mut tx = self.pool.begin().await?;
        // Se não afetar exatamente uma linha, o tx sofre rollback ao sair do escopo
        let row = self.repo.mark_succeeded(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("✅ Registro {} concluído", id);
        self.hub.publish(Collection::Bookings, ChangeOp::Update, ChangeSource::Local);
        Ok(row)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<BookingStatusRow, AppError> {
        let mut tx = self.pool.begin().await?;
        let row = self.repo.mark_canceled(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🚫 Registro {} cancelado", id);
        self.hub.publish(Collection::Bookings, ChangeOp::Update, ChangeSource::Local);
        Ok(row)
    }

    /// Remoção definitiva, separada do cancelamento.
    pub async fn purge(&self, id: Uuid) -> Result<BookingStatusRow, AppError> {
        let mut tx = self.pool.begin().await?;
        let row = self.repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Registro {} removido", id);
        self.hub.publish(Collection::Bookings, ChangeOp::Delete, ChangeSource::Local);
        Ok(row)
    }
}
