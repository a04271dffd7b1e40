// src/services/catalog.rs

use std::{collections::HashMap, path::Path};

use anyhow::Context;
use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::models::booking::{RawServices, ResolvedService, ServiceRef};

/// Nome usado quando nem o registro nem o catálogo dizem qual é o serviço.
pub const DEFAULT_SERVICE_NAME: &str = "Service";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
}

/// Catálogo de fallback: id do serviço -> nome/preço.
/// Só é consultado quando o item gravado no registro não traz nome ou preço.
#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        let entries = [
            ("serv-ortho", "Orthodontics"),
            ("serv-thera", "Therapy"),
            ("serv-plasti", "Plastic surgery"),
        ]
        .into_iter()
        .map(|(id, name)| {
            (
                id.to_string(),
                CatalogEntry {
                    name: name.to_string(),
                    price: Decimal::ZERO,
                },
            )
        })
        .collect();

        Self { entries }
    }
}

impl ServiceCatalog {
    pub fn new(entries: HashMap<String, CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Lê um objeto JSON `{ "id": { "name": ..., "price": ... } }`.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Falha ao ler o catálogo em {}", path.display()))?;
        let entries: HashMap<String, CatalogEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("Catálogo inválido em {}", path.display()))?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Resolve um item: nome/preço explícitos vencem, depois o catálogo,
    /// depois o padrão ("Service", 0).
    pub fn resolve(&self, service: &ServiceRef) -> ResolvedService {
        let (id, name, price) = match service {
            ServiceRef::Id(id) => (Some(id.as_str()), None, None),
            ServiceRef::Inline { id, name, price } => (id.as_deref(), name.as_deref(), *price),
        };
        let by_id = id.and_then(|id| self.get(id));

        ResolvedService {
            name: name
                .map(str::to_string)
                .or_else(|| by_id.map(|e| e.name.clone()))
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
            price: price
                .or_else(|| by_id.map(|e| e.price))
                .unwrap_or(Decimal::ZERO),
        }
    }

    /// Normaliza a lista inteira. Payload malformado vira lista vazia, sem erro.
    pub fn resolve_all(&self, raw: &RawServices) -> Vec<ResolvedService> {
        match raw {
            RawServices::Absent => Vec::new(),
            RawServices::List(items) => items.iter().map(|s| self.resolve(s)).collect(),
            RawServices::Encoded(text) => match serde_json::from_str::<Value>(text) {
                Ok(value @ Value::Array(_)) => self.resolve_all(&RawServices::from_value(Some(value))),
                _ => Vec::new(),
            },
        }
    }
}

impl RawServices {
    /// Converte o valor da coluna para a união explícita.
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawServices::Absent,
            Some(Value::String(text)) if text.trim().is_empty() => RawServices::Absent,
            Some(Value::String(text)) => RawServices::Encoded(text),
            Some(Value::Array(items)) => {
                RawServices::List(items.into_iter().filter_map(ServiceRef::from_value).collect())
            }
            // Objeto solto ou número: não é uma lista de serviços
            Some(_) => RawServices::List(Vec::new()),
        }
    }
}

impl ServiceRef {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(id) => Some(ServiceRef::Id(id)),
            Value::Number(n) => Some(ServiceRef::Id(n.to_string())),
            Value::Object(map) => {
                let id = map.get("id").and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                });
                // `name` vence `title`; string vazia conta como ausente
                let name = ["name", "title"]
                    .iter()
                    .filter_map(|k| map.get(*k).and_then(Value::as_str))
                    .find(|s| !s.is_empty())
                    .map(str::to_string);
                // Só preço numérico conta; "1000" em string cai para o catálogo
                let price = match map.get("price") {
                    Some(Value::Number(n)) => number_to_decimal(n),
                    _ => None,
                };
                Some(ServiceRef::Inline { id, name, price })
            }
            _ => None,
        }
    }
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    n.to_string()
        .parse::<Decimal>()
        .ok()
        .or_else(|| n.as_f64().and_then(Decimal::from_f64))
}
