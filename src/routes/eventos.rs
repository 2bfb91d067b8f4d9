//! Event catalog endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use ecoeventos_core::{Criteria, Event, EventChanges, NewEvent, StoreError};

use crate::routes::AppError;
use crate::routes::payload::JsonOrForm;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/eventos",
            get(list_events).post(create_event).delete(delete_event),
        )
        .route("/eventos/listado", get(list_summary))
        .route("/eventos/filtrar", get(filter_events))
        .route("/eventos/editar", post(update_event).patch(update_event))
        .route("/eventos/{id}", get(get_event))
}

/// `?id=` query parameter
#[derive(Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    fn id(&self) -> Option<String> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
    }
}

/// Catalog with a count, for clients that want more than the bare array
#[derive(Serialize)]
pub struct EventSummary {
    pub mensaje: &'static str,
    pub total: usize,
    pub eventos: Vec<Event>,
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub mensaje: &'static str,
    pub evento: Event,
}

#[derive(Serialize)]
pub struct UpdatedResponse {
    pub actualizado: bool,
    pub evento: Event,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
}

/// Request body for editing an event. Only `id` is required.
#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub id: Option<String>,
    pub titulo: Option<String>,
    pub categoria: Option<String>,
    pub fecha: Option<String>,
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub lugar: Option<String>,
    pub descripcion: Option<String>,
}

impl UpdateEventRequest {
    fn into_parts(self) -> (IdQuery, EventChanges) {
        let changes = EventChanges {
            titulo: self.titulo,
            categoria: self.categoria,
            fecha: self.fecha,
            hora_inicio: self.hora_inicio,
            hora_fin: self.hora_fin,
            lugar: self.lugar,
            descripcion: self.descripcion,
        };
        (IdQuery { id: self.id }, changes)
    }
}

async fn find_event(state: &AppState, id: String) -> Result<Json<Event>, AppError> {
    let event = state
        .run(move |store| store.get_by_id(&id).ok_or(StoreError::NotFound(id)))
        .await??;
    Ok(Json(event))
}

/// GET /eventos - List all events, or one event with `?id=`
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, AppError> {
    if let Some(id) = query.id() {
        return Ok(find_event(&state, id).await?.into_response());
    }

    let events = state.run(|store| store.list_all()).await?;
    Ok(Json(events).into_response())
}

/// GET /eventos/{id} - One event
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    find_event(&state, id).await
}

/// GET /eventos/listado - All events with a total
async fn list_summary(State(state): State<AppState>) -> Result<Json<EventSummary>, AppError> {
    let eventos = state.run(|store| store.list_all()).await?;

    Ok(Json(EventSummary {
        mensaje: "Lista de eventos obtenida correctamente",
        total: eventos.len(),
        eventos,
    }))
}

/// GET /eventos/filtrar - Events matching `categoria`, `desde`, `hasta`, `q`
async fn filter_events(
    State(state): State<AppState>,
    Query(criteria): Query<Criteria>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = state.run(move |store| store.filter(&criteria)).await?;
    Ok(Json(events))
}

/// POST /eventos - Create a new event
async fn create_event(
    State(state): State<AppState>,
    JsonOrForm(fields): JsonOrForm<NewEvent>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let evento = state.run(move |store| store.create(fields)).await??;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            mensaje: "Evento creado correctamente",
            evento,
        }),
    ))
}

/// POST|PATCH /eventos/editar - Edit the event named by `id` in the body
async fn update_event(
    State(state): State<AppState>,
    JsonOrForm(req): JsonOrForm<UpdateEventRequest>,
) -> Result<Json<UpdatedResponse>, AppError> {
    let (query, changes) = req.into_parts();
    let id = query
        .id()
        .ok_or_else(|| AppError::bad_request("The id field is required"))?;

    let evento = state
        .run(move |store| store.update_by_id(&id, changes))
        .await??;

    Ok(Json(UpdatedResponse {
        actualizado: true,
        evento,
    }))
}

/// DELETE /eventos?id= - Delete an event
async fn delete_event(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = query
        .id()
        .ok_or_else(|| AppError::bad_request("The id query parameter is required"))?;

    let ok = state.run(move |store| store.delete_by_id(&id)).await??;
    Ok(Json(DeletedResponse { ok }))
}
