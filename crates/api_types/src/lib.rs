//! Wire types of the HTTP API.
//!
//! Query-string parameters are kept as strings: the server decides how to
//! interpret missing or malformed values (most of them reset to a default).
//! Amounts are integer minor units.

use serde::{Deserialize, Serialize};

pub mod entry {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryNew {
        pub counterparty_id: i64,
        /// Calendar date, `YYYY-MM-DD`.
        pub entry_date: String,
        pub label: String,
        #[serde(default)]
        pub debit: i64,
        #[serde(default)]
        pub credit: i64,
    }

    /// Partial update; absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryUpdate {
        pub counterparty_id: Option<i64>,
        pub entry_date: Option<String>,
        pub label: Option<String>,
        pub debit: Option<i64>,
        pub credit: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryCreated {
        pub id: i64,
    }

    /// Scoped ledger view of one counterparty.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LedgerParams {
        pub counterparty_id: Option<String>,
        pub date_start: Option<String>,
        pub date_end: Option<String>,
        pub entry_id: Option<String>,
        pub label: Option<String>,
        pub search_term: Option<String>,
        pub sort_column: Option<String>,
        pub sort_direction: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StatementParams {
        pub date_start: Option<String>,
        pub date_end: Option<String>,
        pub page: Option<String>,
        pub page_size: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecentParams {
        pub date_start: Option<String>,
        pub date_end: Option<String>,
        pub page: Option<String>,
        pub page_size: Option<String>,
        pub sort_column: Option<String>,
        pub sort_direction: Option<String>,
    }

    /// Both bounds or none.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryParams {
        pub date_start: Option<String>,
        pub date_end: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BalanceReportParams {
        pub date_start: Option<String>,
        pub date_end: Option<String>,
        pub counterparty_id: Option<String>,
    }
}

pub mod counterparty {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CounterpartyKind {
        Client,
        Supplier,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CounterpartyNew {
        pub name: String,
        pub kind: CounterpartyKind,
        pub email: Option<String>,
        pub phone: Option<String>,
    }

    /// Partial update; an empty `email`/`phone` clears the field.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CounterpartyUpdate {
        pub name: Option<String>,
        pub kind: Option<CounterpartyKind>,
        pub email: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CounterpartyCreated {
        pub id: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CounterpartyListParams {
        pub id: Option<String>,
        pub name: Option<String>,
        pub kind: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub search_term: Option<String>,
        pub page: Option<String>,
        pub page_size: Option<String>,
        pub sort_column: Option<String>,
        pub sort_direction: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BalancesParams {
        pub kind: Option<String>,
        pub search_term: Option<String>,
        pub page: Option<String>,
        pub page_size: Option<String>,
    }
}
