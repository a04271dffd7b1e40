// src/services/report_service.rs

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, CouponRepository, UserRepository},
    models::{
        analytics::{ClientDirectory, CouponReport, DirectoryFilter, OverviewReport, RevenueReport},
        booking::BookingDetail,
        period::ReportPeriod,
    },
    services::reports,
};

// Cada relatório é independente: busca tudo que precisa em paralelo
// (try_join!) e a primeira falha aborta só aquele relatório.
#[derive(Clone)]
pub struct ReportService {
    bookings: BookingRepository,
    users: UserRepository,
    coupons: CouponRepository,
}

impl ReportService {
    pub fn new(bookings: BookingRepository, users: UserRepository, coupons: CouponRepository) -> Self {
        Self { bookings, users, coupons }
    }

    pub async fn overview(&self, period: ReportPeriod) -> Result<OverviewReport, AppError> {
        let (ts_start, ts_end) = period.timestamp_bounds();
        let (bookings, registered) = tokio::try_join!(
            self.bookings.find_in_range(period.start(), period.end()),
            self.users.find_registered_between(ts_start, ts_end),
        )?;

        let mut seen = HashSet::new();
        let purchaser_ids: Vec<Uuid> = bookings
            .iter()
            .filter_map(|b| b.cabinet_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let purchasers = self.users.find_by_ids(&purchaser_ids).await?;

        Ok(reports::build_overview(period, &bookings, registered, purchasers))
    }

    pub async fn revenue(&self, period: ReportPeriod) -> Result<RevenueReport, AppError> {
        let previous = period.previous();
        let (current, previous_bookings, existing_before) = tokio::try_join!(
            self.bookings.find_in_range(period.start(), period.end()),
            self.bookings.find_in_range(previous.start(), previous.end()),
            self.bookings.find_client_keys_before(period.start()),
        )?;

        Ok(reports::build_revenue_report(
            period,
            &current,
            &previous_bookings,
            &existing_before,
        ))
    }

    pub async fn coupons(&self, period: ReportPeriod, coupon_filter: Option<&str>) -> Result<CouponReport, AppError> {
        let (bookings, all_coupons, existing_before) = tokio::try_join!(
            self.bookings.find_in_range(period.start(), period.end()),
            self.coupons.list_all(),
            self.bookings.find_client_keys_before(period.start()),
        )?;

        Ok(reports::build_coupon_report(
            period,
            &bookings,
            coupon_filter,
            all_coupons,
            &existing_before,
        ))
    }

    pub async fn client_directory(
        &self,
        filter: DirectoryFilter,
        query: Option<&str>,
    ) -> Result<ClientDirectory, AppError> {
        let (bookings, users) = tokio::try_join!(self.bookings.find_all_active(), self.users.find_all())?;
        Ok(reports::build_client_directory(&bookings, &users, filter, query))
    }

    pub async fn client_bookings(
        &self,
        name: &str,
        phone: &str,
        period: ReportPeriod,
    ) -> Result<Vec<BookingDetail>, AppError> {
        let bookings = self
            .bookings
            .find_for_client(name, phone, period.start(), period.end())
            .await?;
        Ok(reports::booking_history(&bookings))
    }

    pub async fn user_bookings(&self, user_id: Uuid) -> Result<Vec<BookingDetail>, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Usuário {}", user_id)))?;

        let phone = user.number.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let bookings = self.bookings.find_for_user(user.id, phone).await?;
        Ok(reports::booking_history(&bookings))
    }
}
