// src/models/coupon.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const COUPON_WORKING: &str = "working";
pub const COUPON_DELETED: &str = "deleted";

// Tabela `cupons`. A remoção é lógica: status 'deleted' + deleted_at,
// para manter a atribuição histórica dos registros antigos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    #[schema(example = "SPRING10")]
    pub cupon_name: String,
    #[schema(example = 10)]
    pub discount_percent: i32,
    #[schema(example = "working")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn is_working(&self) -> bool {
        self.status.eq_ignore_ascii_case(COUPON_WORKING)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponPayload {
    #[validate(length(min = 1, max = 64, message = "O nome do cupom é obrigatório."))]
    #[schema(example = "SPRING10")]
    pub cupon_name: String,

    #[validate(range(min = 1, max = 100, message = "O desconto deve estar entre 1 e 100%."))]
    #[schema(example = 10)]
    pub discount_percent: i32,
}

impl CreateCouponPayload {
    // O nome é gravado sem espaços nas pontas; valida depois de aparar.
    pub fn normalized(self) -> Self {
        Self {
            cupon_name: self.cupon_name.trim().to_string(),
            discount_percent: self.discount_percent,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponUsageReset {
    pub users_reset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, pct: i32) -> CreateCouponPayload {
        CreateCouponPayload { cupon_name: name.to_string(), discount_percent: pct }.normalized()
    }

    #[test]
    fn accepts_a_regular_coupon() {
        let p = payload("  SPRING10 ", 10);
        assert_eq!(p.cupon_name, "SPRING10");
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_blank_name_and_out_of_range_discount() {
        assert!(payload("   ", 10).validate().is_err());
        assert!(payload("X", 0).validate().is_err());
        assert!(payload("X", 101).validate().is_err());
        assert!(payload("X", 100).validate().is_ok());
    }
}
