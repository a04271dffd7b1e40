// src/models/booking.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- LINHA CRUA (como vem do banco) ---

// Espelha a tabela `bookings`. O campo `services` chega em formato livre
// (JSONB com lista, string com JSON codificado ou NULL) e é resolvido uma
// única vez no repositório; nada depois dele enxerga esta struct.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub services: Option<Value>,
    pub total: Option<Decimal>,
    pub status: Option<String>,
    pub cabinet_id: Option<Uuid>,
    pub cupon_name: Option<String>,
}

// Resposta das mutações (RETURNING id, status)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusRow {
    pub id: Uuid,
    pub status: Option<String>,
}

// --- FORMATO DOS SERVIÇOS ---

/// União explícita dos formatos que o campo `services` pode ter.
#[derive(Debug, Clone, PartialEq)]
pub enum RawServices {
    Absent,
    /// JSON codificado dentro de uma string (colunas TEXT antigas)
    Encoded(String),
    List(Vec<ServiceRef>),
}

/// Um item da lista de serviços: só o id do catálogo, ou o objeto inline.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRef {
    Id(String),
    Inline {
        id: Option<String>,
        name: Option<String>,
        price: Option<Decimal>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedService {
    #[schema(example = "Cleaning")]
    pub name: String,
    #[schema(example = 1000)]
    pub price: Decimal,
}

// --- STATUS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    New,
    Succeeded,
    Canceled,
}

impl BookingStatus {
    // NULL e valores desconhecidos contam como 'new'. Aceita as duas grafias de cancelado.
    pub fn from_db(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("succeeded") => BookingStatus::Succeeded,
            Some("canceled") | Some("cancelled") => BookingStatus::Canceled,
            _ => BookingStatus::New,
        }
    }
}

// --- IDENTIDADE DO CLIENTE ---

/// Cliente não registrado é identificado só pelo par (nome, telefone),
/// comparação exata e sensível a maiúsculas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientKey {
    pub name: String,
    pub phone: String,
}

impl ClientKey {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

// --- REGISTRO NORMALIZADO ---

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub services: Vec<ResolvedService>,
    pub total: Decimal,
    pub status: BookingStatus,
    pub cabinet_id: Option<Uuid>,
    pub cupon_name: Option<String>,
}

impl Booking {
    /// Monta o registro a partir da linha crua e dos serviços já resolvidos.
    /// `total` NULL cai para a soma dos preços; um 0 explícito é mantido.
    pub fn from_row(row: BookingRow, services: Vec<ResolvedService>) -> Self {
        let original: Decimal = services.iter().map(|s| s.price).sum();
        Self {
            id: row.id,
            name: row.name.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            date: row.date,
            time: row.time,
            total: row.total.unwrap_or(original),
            status: BookingStatus::from_db(row.status.as_deref()),
            cabinet_id: row.cabinet_id,
            cupon_name: row.cupon_name.filter(|c| !c.trim().is_empty()),
            services,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.status == BookingStatus::Canceled
    }

    /// Soma dos preços resolvidos, antes de qualquer desconto.
    pub fn original_total(&self) -> Decimal {
        self.services.iter().map(|s| s.price).sum()
    }

    /// Desconto do cupom. Só existe quando a soma dos serviços é positiva;
    /// total acima da soma não gera desconto negativo.
    pub fn discount(&self) -> Decimal {
        let original = self.original_total();
        if original > Decimal::ZERO && self.total < original {
            original - self.total
        } else {
            Decimal::ZERO
        }
    }

    /// Sinal canônico de cupom: nome de cupom gravado OU total abaixo da soma.
    pub fn has_coupon(&self) -> bool {
        self.cupon_name.is_some() || self.discount() > Decimal::ZERO
    }

    pub fn is_registered(&self) -> bool {
        self.cabinet_id.is_some()
    }

    pub fn units(&self) -> u32 {
        self.services.len() as u32
    }

    pub fn client_key(&self) -> ClientKey {
        ClientKey::new(self.name.clone(), self.phone.clone())
    }

    pub fn time_key(&self) -> &str {
        self.time.as_deref().unwrap_or("")
    }
}

// --- VISÃO SERIALIZADA ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    pub id: Uuid,
    #[schema(example = "Ivan")]
    pub name: String,
    #[schema(example = "+79001234567")]
    pub phone: String,
    pub date: NaiveDate,
    #[schema(example = "10:30")]
    pub time: Option<String>,
    pub services: Vec<ResolvedService>,
    pub original_total: Decimal,
    pub total: Decimal,
    pub discount: Decimal,
    pub has_coupon: bool,
    pub cupon_name: Option<String>,
    pub status: BookingStatus,
    pub is_registered: bool,
}

impl From<&Booking> for BookingDetail {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            name: b.name.clone(),
            phone: b.phone.clone(),
            date: b.date,
            time: b.time.clone(),
            services: b.services.clone(),
            original_total: b.original_total(),
            total: b.total,
            discount: b.discount(),
            has_coupon: b.has_coupon(),
            cupon_name: b.cupon_name.clone(),
            status: b.status,
            is_registered: b.is_registered(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Registro de teste com serviços inline já resolvidos.
    pub fn booking(name: &str, phone: &str, date: &str, total: i64, services: &[(&str, i64)]) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: Some("10:00".to_string()),
            services: services
                .iter()
                .map(|(n, p)| ResolvedService {
                    name: n.to_string(),
                    price: Decimal::from(*p),
                })
                .collect(),
            total: Decimal::from(total),
            status: BookingStatus::New,
            cabinet_id: None,
            cupon_name: None,
        }
    }
}
