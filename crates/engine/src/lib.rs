//! Ledger engine for entries recorded against counterparties (clients and
//! suppliers).
//!
//! The [`Engine`] is a stateless service over a `sea-orm` connection: it
//! stores entries and counterparties, lists them with deterministic ordering
//! and pagination, and derives balance reports and running balances over
//! date windows.

pub use balance::{
    BalanceReport, CumulativeAggregate, PeriodAggregate, ProjectedRow, Totals,
    project_running_balance,
};
pub use counterparties::{
    Counterparty, CounterpartyBalance, CounterpartyKind, CounterpartyPatch, NewCounterparty,
};
pub use entries::{Entry, EntryPatch, EntryRow, NewEntry};
pub use error::EngineError;
pub use money::Money;
pub use ops::{DailyStats, Engine, EngineBuilder, EntryPage, KindStats, LedgerView, Summary};
pub use query::{
    BalancesRequest, CounterpartyRequest, DateRange, EntryFilter, EntryOrder, EntryQuery,
    LedgerRequest, Page, PageRequest, Pagination, RecentRequest, SortColumn, SortDirection,
    StatementRequest, parse_date,
};

pub mod counterparties;
pub mod entries;
pub mod query;

mod balance;
mod error;
mod money;
mod ops;

type ResultEngine<T> = Result<T, EngineError>;
