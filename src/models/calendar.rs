// src/models/calendar.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::booking::BookingDetail;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// Ano; padrão é o ano corrente
    pub year: Option<i32>,
    /// Mês 1-12; padrão é o mês corrente
    pub month: Option<u32>,
}

// Prévia mostrada dentro da célula (até 3 por dia)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingPreview {
    pub id: Uuid,
    pub time: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub count: usize,
    pub total: Decimal,
    pub preview: Vec<BookingPreview>,
    /// Quantos registros não couberam na prévia
    pub more: usize,
    pub bookings: Vec<BookingDetail>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    /// Sempre uma segunda-feira
    pub grid_start: NaiveDate,
    /// Sempre um domingo
    pub grid_end: NaiveDate,
    pub booking_count: usize,
    pub month_total: Decimal,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayDetails {
    pub date: NaiveDate,
    pub total: Decimal,
    pub bookings: Vec<BookingDetail>,
}
