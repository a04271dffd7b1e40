// src/handlers/events.rs

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Deserialize;
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    Stream, StreamExt, StreamMap,
};
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::AdminSession,
    services::invalidation::{ChangeEvent, Collection},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Lista separada por vírgula (`bookings,cupons`); vazio = todas
    pub collections: Option<String>,
}

impl EventsQuery {
    pub fn parse(&self) -> Result<Vec<Collection>, AppError> {
        let raw = self.collections.as_deref().unwrap_or("");
        let mut out: Vec<Collection> = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let collection = part.parse::<Collection>().map_err(AppError::BadRequest)?;
            if !out.contains(&collection) {
                out.push(collection);
            }
        }
        if out.is_empty() {
            out = Collection::ALL.to_vec();
        }
        Ok(out)
    }
}

fn to_sse(collection: Collection, item: Result<ChangeEvent, BroadcastStreamRecvError>) -> Option<Event> {
    match item {
        Ok(event) => Event::default()
            .event(collection.as_str())
            .id(event.revision.to_string())
            .json_data(&event)
            .ok(),
        // O cliente perdeu eventos: manda re-consultar tudo da coleção
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            tracing::warn!("⚠️ Assinante de '{}' atrasado, {} eventos perdidos", collection, missed);
            Some(Event::default().event("resync").data(collection.as_str()))
        }
    }
}

/// Stream SSE de invalidação. Cada evento diz qual coleção mudou e a revisão;
/// o console re-consulta só a tela afetada.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    params(EventsQuery),
    responses(
        (status = 200, description = "text/event-stream com ChangeEvent em JSON", body = ChangeEvent),
        (status = 400, description = "Coleção desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn events(
    State(app_state): State<AppState>,
    session: AdminSession,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let collections = query.parse()?;

    let mut streams = StreamMap::new();
    for collection in &collections {
        streams.insert(*collection, BroadcastStream::new(app_state.hub.subscribe(*collection)));
    }
    tracing::info!("📡 '{}' assinou {:?}", session.login, collections);

    let stream = streams
        .filter_map(|(collection, item)| to_sse(collection, item))
        .map(Ok::<Event, Infallible>);

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: Option<&str>) -> EventsQuery {
        EventsQuery { collections: raw.map(str::to_string) }
    }

    #[test]
    fn empty_means_every_collection() {
        assert_eq!(query(None).parse().unwrap().len(), 4);
        assert_eq!(query(Some(" , ")).parse().unwrap().len(), 4);
    }

    #[test]
    fn duplicates_collapse_and_unknown_fails() {
        let parsed = query(Some("bookings,cupons,bookings")).parse().unwrap();
        assert_eq!(parsed, vec![Collection::Bookings, Collection::Cupons]);
        assert!(matches!(query(Some("bookings,orders")).parse(), Err(AppError::BadRequest(_))));
    }
}
