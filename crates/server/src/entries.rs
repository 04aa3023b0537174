//! Entries API endpoints

use api_types::entry::{EntryDelete, EntryList, EntryNew, EntrySearch, EntryUpdate, EntryView};
use axum::{Json, extract::State, http::StatusCode};
use engine::{Entry, Query, SortKey};

use crate::{ServerError, server::ServerState, validate};

fn entry_view(entry: Entry) -> EntryView {
    EntryView {
        id: entry.id,
        description: entry.description,
        amount: entry.amount,
        date: entry.date,
        create_time: entry.create_time,
    }
}

/// Handle requests for creating a new entry
pub async fn entry_new(
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .create_entry(&payload.description, payload.amount, &payload.date)
        .await?;

    Ok(StatusCode::CREATED)
}

/// Handle filtered, paginated searches. The response carries the page plus
/// totals over every match.
pub async fn entry_list(
    State(state): State<ServerState>,
    Json(payload): Json<EntrySearch>,
) -> Result<Json<EntryList>, ServerError> {
    let page = validate::page(payload.start, payload.limit)?;
    let filters = engine::parse_filters(&payload.filter)?;
    let query = Query::compile(&filters)?;

    let result = state
        .engine
        .search(&query, page, SortKey::from_wire(&payload.sort))
        .await?;

    Ok(Json(EntryList {
        entries: result.entries.into_iter().map(entry_view).collect(),
        positive_amount: result.totals.positive_total,
        negative_amount: result.totals.negative_total,
        count: result.totals.count,
    }))
}

pub async fn entry_update(
    State(state): State<ServerState>,
    Json(payload): Json<EntryUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .update_entry(
            &payload.id,
            &payload.description,
            payload.amount,
            &payload.date,
        )
        .await?;

    Ok(StatusCode::OK)
}

pub async fn entry_delete(
    State(state): State<ServerState>,
    Json(payload): Json<EntryDelete>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_entry(&payload.id).await?;

    Ok(StatusCode::OK)
}
