//! Entry API endpoints

use api_types::entry::{
    BalanceReportParams, EntryCreated, EntryNew, EntryUpdate, LedgerParams, RecentParams,
    StatementParams, SummaryParams,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    BalanceReport, DateRange, EngineError, EntryPage, EntryPatch, EntryRow, KindStats,
    LedgerRequest, LedgerView, Money, NewEntry, RecentRequest, StatementRequest, Summary,
    parse_date,
};

use crate::{
    ServerError,
    params::{lenient_number, optional_id},
    server::ServerState,
    user,
};

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryCreated>), ServerError> {
    let entry = state
        .engine
        .create_entry(
            &user.username,
            NewEntry {
                counterparty_id: payload.counterparty_id,
                entry_date: parse_date("entry_date", &payload.entry_date)?,
                label: payload.label,
                debit: Money::new(payload.debit),
                credit: Money::new(payload.credit),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(EntryCreated { id: entry.id })))
}

/// Scoped ledger view of one counterparty over a date range.
pub async fn ledger(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<LedgerParams>,
) -> Result<Json<LedgerView>, ServerError> {
    let request = LedgerRequest {
        owner_id: user.username,
        counterparty_id: optional_id("counterparty_id", params.counterparty_id.as_deref())?,
        date_start: params.date_start,
        date_end: params.date_end,
        entry_id: optional_id("entry_id", params.entry_id.as_deref())?,
        label: params.label,
        search_term: params.search_term,
        sort_column: params.sort_column,
        sort_direction: params.sort_direction,
    };

    Ok(Json(state.engine.ledger(&request).await?))
}

/// Paginated chronological statement of one counterparty.
pub async fn statement(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(counterparty_id): Path<i64>,
    Query(params): Query<StatementParams>,
) -> Result<Json<LedgerView>, ServerError> {
    let request = StatementRequest {
        owner_id: user.username,
        counterparty_id: Some(counterparty_id),
        date_start: params.date_start,
        date_end: params.date_end,
        page: lenient_number(params.page.as_deref()),
        page_size: lenient_number(params.page_size.as_deref()),
    };

    Ok(Json(state.engine.counterparty_statement(&request).await?))
}

pub async fn recent(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<RecentParams>,
) -> Result<Json<EntryPage>, ServerError> {
    let request = RecentRequest {
        owner_id: user.username,
        date_start: params.date_start,
        date_end: params.date_end,
        page: lenient_number(params.page.as_deref()),
        page_size: lenient_number(params.page_size.as_deref()),
        sort_column: params.sort_column,
        sort_direction: params.sort_direction,
    };

    Ok(Json(state.engine.recent_entries(&request).await?))
}

pub async fn summary(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Summary>, ServerError> {
    let range =
        DateRange::parse_optional(params.date_start.as_deref(), params.date_end.as_deref())?;
    Ok(Json(state.engine.summary(&user.username, range).await?))
}

/// Today's figures (UTC), split into clients and suppliers.
pub async fn today_stats(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<KindStats>, ServerError> {
    let today = Utc::now().date_naive();
    Ok(Json(
        state.engine.daily_stats_by_kind(&user.username, today).await?,
    ))
}

pub async fn balance_report(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<BalanceReportParams>,
) -> Result<Json<BalanceReport>, ServerError> {
    let range = DateRange::parse(params.date_start.as_deref(), params.date_end.as_deref())?;
    let counterparty_id = optional_id("counterparty_id", params.counterparty_id.as_deref())?;

    Ok(Json(
        state
            .engine
            .balance_report(&user.username, range, counterparty_id)
            .await?,
    ))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<EntryRow>, ServerError> {
    let row = state
        .engine
        .entry(id, &user.username)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("entry not exists".to_string()))?;
    Ok(Json(row))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<EntryUpdate>,
) -> Result<StatusCode, ServerError> {
    let patch = EntryPatch {
        counterparty_id: payload.counterparty_id,
        entry_date: payload
            .entry_date
            .as_deref()
            .map(|d| parse_date("entry_date", d))
            .transpose()?,
        label: payload.label,
        debit: payload.debit.map(Money::new),
        credit: payload.credit.map(Money::new),
    };

    if !state.engine.update_entry(&user.username, id, patch).await? {
        return Err(EngineError::KeyNotFound("entry not exists".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    if !state.engine.delete_entry(&user.username, id).await? {
        return Err(EngineError::KeyNotFound("entry not exists".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
