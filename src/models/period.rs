// src/models/period.rs

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    #[default]
    Month,
    Year,
}

// Query string comum a todos os relatórios: ?period=month&year=2025&month=3
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// `month` (padrão) ou `year`
    pub period: Option<PeriodKind>,
    /// Ano; padrão é o ano corrente
    pub year: Option<i32>,
    /// Mês 1-12; padrão é o mês corrente (ignorado em `year`)
    pub month: Option<u32>,
}

/// "Hoje" no fuso do servidor: padrão de ano/mês e destaque do calendário.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Janela de um relatório: um mês ou um ano de calendário.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl ReportPeriod {
    pub fn month(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidPeriod(format!("mês {} fora de 1-12", month)));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::InvalidPeriod(format!("ano {} fora do intervalo", year)))?;
        Ok(ReportPeriod::Month { year, month })
    }

    pub fn year(year: i32) -> Result<Self, AppError> {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| AppError::InvalidPeriod(format!("ano {} fora do intervalo", year)))?;
        Ok(ReportPeriod::Year { year })
    }

    pub fn from_query(query: &PeriodQuery, today: NaiveDate) -> Result<Self, AppError> {
        let year = query.year.unwrap_or(today.year());
        match query.period.unwrap_or_default() {
            PeriodKind::Month => Self::month(year, query.month.unwrap_or(today.month())),
            PeriodKind::Year => Self::year(year),
        }
    }

    pub fn kind(&self) -> PeriodKind {
        match self {
            ReportPeriod::Month { .. } => PeriodKind::Month,
            ReportPeriod::Year { .. } => PeriodKind::Year,
        }
    }

    // Os construtores já validaram as datas; os fallbacks abaixo nunca disparam.
    pub fn start(&self) -> NaiveDate {
        match *self {
            ReportPeriod::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            ReportPeriod::Year { year } => NaiveDate::from_ymd_opt(year, 1, 1),
        }
        .unwrap_or(NaiveDate::MIN)
    }

    /// Primeiro dia depois do período (limite exclusivo).
    pub fn end_exclusive(&self) -> NaiveDate {
        match *self {
            ReportPeriod::Month { year: y, month: 12 } => NaiveDate::from_ymd_opt(y + 1, 1, 1),
            ReportPeriod::Month { year, month } => NaiveDate::from_ymd_opt(year, month + 1, 1),
            ReportPeriod::Year { year } => NaiveDate::from_ymd_opt(year + 1, 1, 1),
        }
        .unwrap_or(NaiveDate::MAX)
    }

    /// Último dia do período (limite inclusivo, usado nas queries por `date`).
    pub fn end(&self) -> NaiveDate {
        self.end_exclusive()
            .checked_sub_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Período anterior: mês anterior (janeiro -> dezembro do ano anterior) ou ano anterior.
    pub fn previous(&self) -> Self {
        match *self {
            ReportPeriod::Month { year, month: 1 } => ReportPeriod::Month { year: year - 1, month: 12 },
            ReportPeriod::Month { year, month } => ReportPeriod::Month { year, month: month - 1 },
            ReportPeriod::Year { year } => ReportPeriod::Year { year: year - 1 },
        }
    }

    /// Limites [início, fim) em UTC para filtrar colunas timestamptz (ex.: users.created_at).
    pub fn timestamp_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start().and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let end = self.end_exclusive().and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        (start, end)
    }

    pub fn label(&self) -> String {
        match *self {
            ReportPeriod::Month { year, month } => format!("{:04}-{:02}", year, month),
            ReportPeriod::Year { year } => format!("{:04}", year),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub kind: PeriodKind,
    #[schema(example = "2025-03")]
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl From<ReportPeriod> for PeriodInfo {
    fn from(p: ReportPeriod) -> Self {
        Self {
            kind: p.kind(),
            label: p.label(),
            start: p.start(),
            end: p.end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn month_bounds_handle_february_and_december() {
        let feb = ReportPeriod::month(2024, 2).unwrap();
        assert_eq!(feb.start(), date("2024-02-01"));
        assert_eq!(feb.end(), date("2024-02-29"));

        let dec = ReportPeriod::month(2025, 12).unwrap();
        assert_eq!(dec.end(), date("2025-12-31"));
        assert_eq!(dec.end_exclusive(), date("2026-01-01"));
    }

    #[test]
    fn previous_period_wraps_january() {
        let jan = ReportPeriod::month(2025, 1).unwrap();
        assert_eq!(jan.previous(), ReportPeriod::Month { year: 2024, month: 12 });
        let year = ReportPeriod::year(2025).unwrap();
        assert_eq!(year.previous(), ReportPeriod::Year { year: 2024 });
    }

    #[test]
    fn query_defaults_to_current_month() {
        let today = date("2025-06-15");
        let p = ReportPeriod::from_query(&PeriodQuery::default(), today).unwrap();
        assert_eq!(p, ReportPeriod::Month { year: 2025, month: 6 });

        let q = PeriodQuery { period: Some(PeriodKind::Year), year: Some(2023), month: Some(4) };
        let p = ReportPeriod::from_query(&q, today).unwrap();
        assert_eq!(p, ReportPeriod::Year { year: 2023 });
        assert_eq!(p.end(), date("2023-12-31"));
        assert_eq!(p.label(), "2023");
    }

    #[test]
    fn invalid_month_is_rejected() {
        let q = PeriodQuery { period: None, year: Some(2025), month: Some(13) };
        assert!(matches!(
            ReportPeriod::from_query(&q, date("2025-01-01")),
            Err(AppError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn timestamp_bounds_cover_the_whole_last_day() {
        let p = ReportPeriod::month(2025, 3).unwrap();
        let (start, end) = p.timestamp_bounds();
        assert_eq!(start.to_rfc3339(), "2025-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-04-01T00:00:00+00:00");
        assert_eq!(p.end(), date("2025-03-31"));
    }
}
