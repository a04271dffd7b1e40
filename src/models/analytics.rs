// src/models/analytics.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{
    coupon::Coupon,
    period::{PeriodInfo, PeriodKind, PeriodQuery},
    user::RegisteredUser,
};

// =============================================================================
//  BLOCOS REUTILIZADOS PELOS RELATÓRIOS
// =============================================================================

// Total por cliente (agrupado pelo par nome + telefone)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientTotal {
    pub name: String,
    pub phone: String,
    pub total: Decimal,
    pub order_count: u32,
    pub units: u32,
    pub is_registered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStat {
    #[schema(example = "Cleaning")]
    pub name: String,
    /// Quantas vezes o serviço foi vendido
    pub count: u32,
    pub revenue: Decimal,
    /// Registros distintos que contêm o serviço
    pub orders: u32,
    pub with_coupon: u32,
    pub without_coupon: u32,
    /// count / total de serviços vendidos * 100
    pub share: Decimal,
    /// revenue / receita total * 100
    pub revenue_share: Decimal,
    pub average_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductTable {
    /// Ordenada por `count` decrescente; empates na ordem de aparição
    pub products: Vec<ProductStat>,
    pub total_products_sold: u32,
    pub most_popular: Option<ProductStat>,
    pub least_popular: Option<ProductStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponSplit {
    pub orders_with_coupon: u32,
    pub orders_without_coupon: u32,
    pub revenue_with_coupon: Decimal,
    pub revenue_without_coupon: Decimal,
    pub units_with_coupon: u32,
    pub units_without_coupon: u32,
    pub total_discount: Decimal,
    pub original_revenue_with_coupon: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSegments {
    pub unique: u32,
    /// Sem nenhum registro antes do início do período
    pub new: u32,
    /// Dois ou mais registros dentro do conjunto examinado
    pub repeat: u32,
    pub registered: u32,
    pub guest: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub orders: u32,
    pub revenue: Decimal,
    pub discount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayBucket {
    /// 0 = segunda ... 6 = domingo (chave independente de locale)
    pub weekday_index: u32,
    #[schema(example = "Monday")]
    pub weekday: String,
    pub orders: u32,
    pub revenue: Decimal,
}

// =============================================================================
//  VISÃO GERAL (tela principal de análise)
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnregisteredClient {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewReport {
    pub period: PeriodInfo,
    pub total_clients: u32,
    pub registered_clients: u32,
    pub non_registered_clients: u32,
    /// Cadastrados no período OU com registro no período
    pub registered_users: Vec<RegisteredUser>,
    pub unregistered_users: Vec<UnregisteredClient>,
    /// Ranking por valor pago, decrescente
    pub clients: Vec<ClientTotal>,
    pub products: ProductTable,
    pub purchases_with_coupon: u32,
    pub purchases_without_coupon: u32,
    pub products_sold_with_coupon: u32,
    pub products_sold_without_coupon: u32,
    pub total_revenue: Decimal,
}

// =============================================================================
//  RECEITA DETALHADA
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub period: PeriodInfo,
    pub previous_period: PeriodInfo,

    // Vendas
    pub total_revenue: Decimal,
    pub previous_revenue: Decimal,
    /// Heurística de exibição: 100 quando o período anterior é zero
    pub revenue_growth_rate: Decimal,
    pub total_units_sold: u32,
    pub total_orders: u32,
    pub average_order_value: Decimal,
    pub average_selling_price: Decimal,
    pub avg_items_per_order: Decimal,

    // Produtos
    pub products: ProductTable,
    pub avg_units_per_customer: Decimal,

    // Cupons
    pub coupons: CouponSplit,
    pub avg_discount_amount: Decimal,

    // Clientes
    pub customers: ClientSegments,
    pub revenue_per_customer: Decimal,
    pub registered_percentage: Decimal,
    /// Ranking completo por valor pago
    pub clients: Vec<ClientTotal>,

    // Séries temporais
    pub daily: Vec<DailyBucket>,
    pub weekly: Vec<WeekdayBucket>,
}

// =============================================================================
//  CUPONS
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponReport {
    pub period: PeriodInfo,
    /// Cupom filtrado (quando informado) ou o cupom ativo
    pub active_coupon: Option<Coupon>,
    pub selected_coupon_name: Option<String>,
    pub discount_percent: i32,

    // Financeiro
    pub total_revenue_with_coupon: Decimal,
    pub orders_with_coupon: u32,
    pub total_discount_amount: Decimal,
    pub original_revenue_with_coupon: Decimal,
    pub average_order_value_with_coupon: Decimal,
    pub average_order_value_without_coupon: Decimal,

    // Comparação (só sem filtro de cupom)
    pub total_revenue: Decimal,
    pub total_orders: u32,
    pub orders_without_coupon: u32,
    pub revenue_without_coupon: Decimal,
    pub coupon_share_of_sales: Decimal,

    // Clientes
    pub customers: ClientSegments,
    pub average_revenue_per_client: Decimal,
    pub registered_percentage: Decimal,
    pub clients: Vec<ClientTotal>,

    // Produtos
    pub products: ProductTable,
    pub top_products: Vec<ProductStat>,
    pub total_items_with_coupon: u32,
    pub average_discount_per_item: Decimal,

    // Séries temporais
    pub daily: Vec<DailyBucket>,
    pub weekly: Vec<WeekdayBucket>,
    pub peak_weekday: Option<WeekdayBucket>,

    /// Todos os cupons (inclusive removidos) para o seletor
    pub all_coupons: Vec<Coupon>,
}

// =============================================================================
//  DIRETÓRIO DE CLIENTES (todo o histórico)
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub phone: String,
    pub display_name: String,
    pub total: Decimal,
    pub order_count: u32,
    pub is_registered: bool,
    pub user_id: Option<Uuid>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub username: Option<String>,
    pub phone_number: String,
    pub registration_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDirectory {
    pub total: u32,
    pub registered: u32,
    pub unregistered: u32,
    pub clients: Vec<DirectoryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryFilter {
    #[default]
    All,
    Registered,
    Unregistered,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientDirectoryQuery {
    /// `all` (padrão), `registered` ou `unregistered`
    pub filter: Option<DirectoryFilter>,
    /// Busca sem diferenciar maiúsculas em nome e telefone
    pub q: Option<String>,
}

// Drill-down de um cliente não registrado dentro de um período
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientBookingsQuery {
    pub name: String,
    pub phone: String,
    pub period: Option<PeriodKind>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl ClientBookingsQuery {
    pub fn period_query(&self) -> PeriodQuery {
        PeriodQuery {
            period: self.period,
            year: self.year,
            month: self.month,
        }
    }
}

// Query do relatório de cupons: período + filtro opcional por nome
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct CouponReportQuery {
    pub period: Option<PeriodKind>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Nome exato do cupom; vazio = todos os registros com cupom
    pub coupon_name: Option<String>,
}

impl CouponReportQuery {
    pub fn period_query(&self) -> PeriodQuery {
        PeriodQuery {
            period: self.period,
            year: self.year,
            month: self.month,
        }
    }

    pub fn coupon_filter(&self) -> Option<&str> {
        self.coupon_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
