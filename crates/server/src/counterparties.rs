//! Counterparty directory API endpoints

use api_types::counterparty::{
    BalancesParams, CounterpartyCreated, CounterpartyKind as KindDto, CounterpartyListParams,
    CounterpartyNew, CounterpartyUpdate,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    BalancesRequest, Counterparty, CounterpartyBalance, CounterpartyKind, CounterpartyPatch,
    CounterpartyRequest, EngineError, NewCounterparty, Page,
};

use crate::{
    ServerError,
    params::{lenient_number, optional_id},
    server::ServerState,
    user,
};

fn kind(dto: KindDto) -> CounterpartyKind {
    match dto {
        KindDto::Client => CounterpartyKind::Client,
        KindDto::Supplier => CounterpartyKind::Supplier,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CounterpartyNew>,
) -> Result<(StatusCode, Json<CounterpartyCreated>), ServerError> {
    let counterparty = state
        .engine
        .create_counterparty(
            &user.username,
            NewCounterparty {
                name: payload.name,
                kind: kind(payload.kind),
                email: payload.email,
                phone: payload.phone,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CounterpartyCreated {
            id: counterparty.id,
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<CounterpartyListParams>,
) -> Result<Json<Page<Counterparty>>, ServerError> {
    let request = CounterpartyRequest {
        owner_id: user.username,
        id: optional_id("id", params.id.as_deref())?,
        name: params.name,
        kind: params.kind,
        email: params.email,
        phone: params.phone,
        search_term: params.search_term,
        page: lenient_number(params.page.as_deref()),
        page_size: lenient_number(params.page_size.as_deref()),
        sort_column: params.sort_column,
        sort_direction: params.sort_direction,
    };

    Ok(Json(state.engine.list_counterparties(&request).await?))
}

/// Every counterparty with the totals of all its entries, by name.
pub async fn balances(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<BalancesParams>,
) -> Result<Json<Page<CounterpartyBalance>>, ServerError> {
    let request = BalancesRequest {
        owner_id: user.username,
        kind: params.kind,
        search_term: params.search_term,
        page: lenient_number(params.page.as_deref()),
        page_size: lenient_number(params.page_size.as_deref()),
    };

    Ok(Json(state.engine.counterparty_balances(&request).await?))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Counterparty>, ServerError> {
    let counterparty = state
        .engine
        .counterparty(id, &user.username)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("counterparty not exists".to_string()))?;
    Ok(Json(counterparty))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CounterpartyUpdate>,
) -> Result<StatusCode, ServerError> {
    let patch = CounterpartyPatch {
        name: payload.name,
        kind: payload.kind.map(kind),
        email: payload.email.map(Some),
        phone: payload.phone.map(Some),
    };

    if !state
        .engine
        .update_counterparty(&user.username, id, patch)
        .await?
    {
        return Err(EngineError::KeyNotFound("counterparty not exists".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes the counterparty and every entry recorded against it.
pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    if !state.engine.delete_counterparty(&user.username, id).await? {
        return Err(EngineError::KeyNotFound("counterparty not exists".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
