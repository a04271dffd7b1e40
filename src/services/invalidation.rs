// src/services/invalidation.rs

//! Hub de invalidação por coleção.
//!
//! ```text
//! mutação local (após commit) ──┐
//!                               ├──> InvalidationHub ──> broadcast por coleção ──> /api/events (SSE)
//! pg_notify 'clinic_changes' ───┘
//! ```
//!
//! Cada evento leva uma `revision` crescente: o cliente descarta respostas
//! mais velhas que o último evento que já viu.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgListener, PgPool};
use tokio::sync::broadcast;
use utoipa::ToSchema;

/// Canal do `pg_notify` criado pela migração.
pub const PG_CHANNEL: &str = "clinic_changes";

const BROADCAST_CAPACITY: usize = 256;
const RELAY_RETRY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Bookings,
    Users,
    Cupons,
    Notifications,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Bookings,
        Collection::Users,
        Collection::Cupons,
        Collection::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Bookings => "bookings",
            Collection::Users => "users",
            Collection::Cupons => "cupons",
            Collection::Notifications => "notifications",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bookings" => Ok(Collection::Bookings),
            "users" => Ok(Collection::Users),
            // aceita a grafia em inglês também
            "cupons" | "coupons" => Ok(Collection::Cupons),
            "notifications" => Ok(Collection::Notifications),
            other => Err(format!("coleção desconhecida: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

impl FromStr for ChangeOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INSERT" => Ok(ChangeOp::Insert),
            "UPDATE" => Ok(ChangeOp::Update),
            "DELETE" => Ok(ChangeOp::Delete),
            other => Err(format!("operação desconhecida: {}", other)),
        }
    }
}

/// De onde veio o evento: mutação feita por este serviço ou trigger do banco.
/// A mesma mudança pode chegar pelas duas vias; o consumidor só re-consulta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSource {
    Local,
    Database,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub collection: Collection,
    pub op: ChangeOp,
    pub source: ChangeSource,
    pub revision: u64,
    pub at: DateTime<Utc>,
}

// Payload do trigger: {"table": "bookings", "op": "UPDATE"}
#[derive(Debug, Deserialize)]
struct PgPayload {
    table: String,
    op: String,
}

struct HubInner {
    channels: HashMap<Collection, broadcast::Sender<ChangeEvent>>,
    revision: AtomicU64,
}

#[derive(Clone)]
pub struct InvalidationHub {
    inner: Arc<HubInner>,
}

impl Default for InvalidationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationHub {
    pub fn new() -> Self {
        let channels = Collection::ALL
            .into_iter()
            .map(|c| (c, broadcast::channel(BROADCAST_CAPACITY).0))
            .collect();
        Self {
            inner: Arc::new(HubInner {
                channels,
                revision: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self, collection: Collection) -> broadcast::Receiver<ChangeEvent> {
        match self.inner.channels.get(&collection) {
            Some(tx) => tx.subscribe(),
            // todas as coleções são criadas em `new`
            None => broadcast::channel(1).1,
        }
    }

    pub fn publish(&self, collection: Collection, op: ChangeOp, source: ChangeSource) -> ChangeEvent {
        let event = ChangeEvent {
            collection,
            op,
            source,
            revision: self.inner.revision.fetch_add(1, Ordering::SeqCst) + 1,
            at: Utc::now(),
        };


        // Sem assinantes o send devolve Err; pode ignorar
        if let Some(tx) = self.inner.channels.get(&collection) {
            let _ = tx.send(event.clone());
        }

        tracing::debug!(
            "🔔 {} {:?} ({:?}) rev {}",
            collection,
            op,
            source,
            event.revision
        );
        event
    }

    /// Converte o payload do `pg_notify` e publica. Payload inválido é ignorado.
    pub fn publish_db_payload(&self, payload: &str) -> Option<ChangeEvent> {
        let parsed: PgPayload = match serde_json::from_str(payload) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("⚠️ Payload de notificação inválido ({}): {}", e, payload);
                return None;
            }
        };
        let collection = parsed.table.parse::<Collection>().ok()?;
        let op = parsed.op.parse::<ChangeOp>().ok()?;
        Some(self.publish(collection, op, ChangeSource::Database))
    }

    /// Escuta `clinic_changes` e repassa para o hub. Reconecta sozinho se a
    /// conexão cair; só termina quando o processo termina.
    pub async fn run_pg_relay(self, pool: PgPool) {
        loop {
            match self.relay_once(&pool).await {
                Ok(()) => tracing::warn!("⚠️ Listener '{}' encerrado, reconectando", PG_CHANNEL),
                Err(e) => tracing::warn!("⚠️ Listener '{}' falhou: {}. Nova tentativa em {:?}", PG_CHANNEL, e, RELAY_RETRY),
            }
            tokio::time::sleep(RELAY_RETRY).await;
        }
    }

    async fn relay_once(&self, pool: &PgPool) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(PG_CHANNEL).await?;
        tracing::info!("🔗 Escutando o canal '{}'", PG_CHANNEL);

        loop {
            let notification = listener.recv().await?;
            self.publish_db_payload(notification.payload());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_only_see_their_collection() {
        let hub = InvalidationHub::new();
        let mut bookings = hub.subscribe(Collection::Bookings);
        let mut cupons = hub.subscribe(Collection::Cupons);

        hub.publish(Collection::Bookings, ChangeOp::Update, ChangeSource::Local);

        let event = bookings.recv().await.unwrap();
        assert_eq!(event.collection, Collection::Bookings);
        assert_eq!(event.revision, 1);
        assert!(cupons.try_recv().is_err());
    }

    #[test]
    fn revisions_increase_across_collections() {
        let hub = InvalidationHub::new();
        let a = hub.publish(Collection::Bookings, ChangeOp::Insert, ChangeSource::Local);
        let b = hub.publish(Collection::Users, ChangeOp::Update, ChangeSource::Database);
        assert!(b.revision > a.revision);
        assert_eq!(b.revision, 2);
    }

    #[test]
    fn db_payloads_are_parsed() {
        let hub = InvalidationHub::new();
        let event = hub
            .publish_db_payload(r#"{"table":"cupons","op":"DELETE"}"#)
            .unwrap();
        assert_eq!(event.collection, Collection::Cupons);
        assert_eq!(event.op, ChangeOp::Delete);
        assert_eq!(event.source, ChangeSource::Database);

        assert!(hub.publish_db_payload("not json").is_none());
        assert!(hub.publish_db_payload(r#"{"table":"other","op":"INSERT"}"#).is_none());
    }

    #[test]
    fn collection_names_parse() {
        assert_eq!("coupons".parse::<Collection>().unwrap(), Collection::Cupons);
        assert_eq!(" Bookings ".parse::<Collection>().unwrap(), Collection::Bookings);
        assert!("orders".parse::<Collection>().is_err());
    }
}
