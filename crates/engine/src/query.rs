//! Query builder for entries and counterparties.
//!
//! Callers hand in loosely typed request objects (strings and options coming
//! straight from a query string); this module validates and normalizes them
//! into structured specifications made of tagged filters, an ordering and an
//! optional page. The store translates a specification with
//! [`EntryFilter::condition`] and [`EntryOrder::apply`], so user supplied
//! values only ever reach the database as bound parameters.

use chrono::NaiveDate;
use sea_orm::{Condition, Order, QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{CounterpartyKind, EngineError, ResultEngine, counterparties, entries};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar date range (`start <= end`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ResultEngine<Self> {
        if start > end {
            return Err(EngineError::InvalidInput(
                "date_start must be before or equal to date_end".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from two `YYYY-MM-DD` strings, both required.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> ResultEngine<Self> {
        let (Some(start), Some(end)) = (non_blank(start), non_blank(end)) else {
            return Err(EngineError::InvalidInput(
                "date range is required: provide both date_start and date_end".to_string(),
            ));
        };
        Self::new(parse_date("date_start", start)?, parse_date("date_end", end)?)
    }

    /// Like [`DateRange::parse`] but both bounds may be omitted together.
    pub fn parse_optional(start: Option<&str>, end: Option<&str>) -> ResultEngine<Option<Self>> {
        match (non_blank(start), non_blank(end)) {
            (None, None) => Ok(None),
            (Some(_), Some(_)) => Self::parse(start, end).map(Some),
            _ => Err(EngineError::InvalidInput(
                "date_start and date_end must be provided together".to_string(),
            )),
        }
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, value: &str) -> ResultEngine<NaiveDate> {
    let invalid = || {
        EngineError::InvalidInput(format!(
            "invalid {field}: use YYYY-MM-DD format, got \"{value}\""
        ))
    };
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn require_owner(owner_id: &str) -> ResultEngine<String> {
    let owner = owner_id.trim();
    if owner.is_empty() {
        return Err(EngineError::InvalidInput("owner id is required".to_string()));
    }
    Ok(owner.to_string())
}

fn require_counterparty(counterparty_id: Option<i64>) -> ResultEngine<i64> {
    counterparty_id.ok_or_else(|| {
        EngineError::InvalidInput("counterparty id is required".to_string())
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive `ASC`/`DESC`; anything else yields `default`.
    pub fn from_param(value: Option<&str>, default: SortDirection) -> Self {
        match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
            Some("ASC") => Self::Asc,
            Some("DESC") => Self::Desc,
            _ => default,
        }
    }

    pub(crate) fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// Whitelisted entry sort columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Id,
    #[default]
    EntryDate,
    Label,
    Debit,
    Credit,
    CreatedAt,
}

impl SortColumn {
    /// Unknown or missing columns fall back to `entry_date`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("id") => Self::Id,
            Some("entry_date") => Self::EntryDate,
            Some("label") => Self::Label,
            Some("debit") => Self::Debit,
            Some("credit") => Self::Credit,
            Some("created_at") => Self::CreatedAt,
            _ => Self::EntryDate,
        }
    }

    fn column(self) -> entries::Column {
        match self {
            Self::Id => entries::Column::Id,
            Self::EntryDate => entries::Column::EntryDate,
            Self::Label => entries::Column::Label,
            Self::Debit => entries::Column::Debit,
            Self::Credit => entries::Column::Credit,
            Self::CreatedAt => entries::Column::CreatedAt,
        }
    }
}

/// Page request after normalization: `page >= 1`, `1 <= page_size <= 100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Out-of-range values reset to the defaults, they are not clamped.
    pub fn normalize(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p as u64,
            _ => DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(s) if (1..=MAX_PAGE_SIZE as i64).contains(&s) => s as u64,
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    /// Rows to skip before this page, or `None` when the page lies beyond
    /// anything the store can address (such a page is always empty).
    pub fn offset(self) -> Option<u64> {
        (self.page - 1)
            .checked_mul(self.page_size)
            .filter(|offset| i64::try_from(*offset).is_ok())
    }
}

/// Pagination metadata returned with every list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn compute(total: u64, request: PageRequest) -> Self {
        let total_pages = total.div_ceil(request.page_size);
        Self {
            total,
            total_pages,
            current_page: request.page,
            page_size: request.page_size,
            has_next: request.page < total_pages,
            has_previous: request.page > 1,
        }
    }

    /// Metadata for a list returned whole, as a single page. `page_size`
    /// stays within the usual bounds even though no row is cut off.
    pub fn single_page(total: u64) -> Self {
        Self {
            total,
            total_pages: u64::from(total > 0),
            current_page: 1,
            page_size: total.clamp(1, MAX_PAGE_SIZE),
            has_next: false,
            has_previous: false,
        }
    }
}

/// One page of a list together with its pagination metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub pagination: Pagination,
}

/// One filter over the `entries` table (left-joined with `counterparties`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryFilter {
    Owner(String),
    Counterparty(i64),
    EntryId(i64),
    LabelContains(String),
    /// Matches the label or the counterparty name.
    Search(String),
    DateBetween(DateRange),
    DateBefore(NaiveDate),
    OnDate(NaiveDate),
    CounterpartyKind(CounterpartyKind),
}

impl EntryFilter {
    pub(crate) fn condition(&self) -> Condition {
        match self {
            Self::Owner(owner) => Condition::all().add(entries::Column::OwnerId.eq(owner.as_str())),
            Self::Counterparty(id) => Condition::all().add(entries::Column::CounterpartyId.eq(*id)),
            Self::EntryId(id) => Condition::all().add(entries::Column::Id.eq(*id)),
            Self::LabelContains(label) => {
                Condition::all().add(entries::Column::Label.contains(label.as_str()))
            }
            Self::Search(term) => Condition::any()
                .add(entries::Column::Label.contains(term.as_str()))
                .add(counterparties::Column::Name.contains(term.as_str())),
            Self::DateBetween(range) => Condition::all()
                .add(entries::Column::EntryDate.gte(range.start))
                .add(entries::Column::EntryDate.lte(range.end)),
            Self::DateBefore(date) => Condition::all().add(entries::Column::EntryDate.lt(*date)),
            Self::OnDate(date) => Condition::all().add(entries::Column::EntryDate.eq(*date)),
            Self::CounterpartyKind(kind) => {
                Condition::all().add(counterparties::Column::Kind.eq(kind.as_str()))
            }
        }
    }
}

/// Conjunction of every filter.
pub(crate) fn entry_condition(filters: &[EntryFilter]) -> Condition {
    filters
        .iter()
        .fold(Condition::all(), |cond, filter| cond.add(filter.condition()))
}

/// Row ordering for entry lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOrder {
    /// Display order; `id` in the same direction breaks ties.
    By(SortColumn, SortDirection),
    /// `entry_date ASC, created_at ASC, id ASC`: the only order a running
    /// balance may be computed in.
    Chronological,
}

impl EntryOrder {
    pub(crate) fn apply<Q: QueryOrder>(self, query: Q) -> Q {
        match self {
            Self::By(column, direction) => {
                let query = query.order_by(column.column(), direction.order());
                if column == SortColumn::Id {
                    query
                } else {
                    query.order_by(entries::Column::Id, direction.order())
                }
            }
            Self::Chronological => query
                .order_by_asc(entries::Column::EntryDate)
                .order_by_asc(entries::Column::CreatedAt)
                .order_by_asc(entries::Column::Id),
        }
    }
}

/// A validated entry query: what to match, in which order, which page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryQuery {
    pub filters: Vec<EntryFilter>,
    pub order: EntryOrder,
    pub page: Option<PageRequest>,
}

/// Scoped ledger view request: per-counterparty statement over a date range,
/// with a balance report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerRequest {
    pub owner_id: String,
    pub counterparty_id: Option<i64>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub entry_id: Option<i64>,
    pub label: Option<String>,
    pub search_term: Option<String>,
    pub sort_column: Option<String>,
    pub sort_direction: Option<String>,
}

/// Validated scoped ledger view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSpec {
    pub owner_id: String,
    pub counterparty_id: i64,
    pub range: DateRange,
    /// Extra filters narrowing the displayed rows.
    pub refinements: Vec<EntryFilter>,
    pub display_order: EntryOrder,
}

impl LedgerRequest {
    pub fn build(&self) -> ResultEngine<LedgerSpec> {
        let owner_id = require_owner(&self.owner_id)?;
        let range = DateRange::parse(self.date_start.as_deref(), self.date_end.as_deref())?;
        let counterparty_id = require_counterparty(self.counterparty_id)?;

        let mut refinements = Vec::new();
        if let Some(id) = self.entry_id {
            refinements.push(EntryFilter::EntryId(id));
        }
        if let Some(label) = non_blank(self.label.as_deref()) {
            refinements.push(EntryFilter::LabelContains(label.to_string()));
        }
        if let Some(term) = non_blank(self.search_term.as_deref()) {
            refinements.push(EntryFilter::Search(term.to_string()));
        }

        let display_order = EntryOrder::By(
            SortColumn::from_param(self.sort_column.as_deref()),
            SortDirection::from_param(self.sort_direction.as_deref(), SortDirection::Asc),
        );

        Ok(LedgerSpec {
            owner_id,
            counterparty_id,
            range,
            refinements,
            display_order,
        })
    }
}

impl LedgerSpec {
    /// The rows to project, always in chronological order.
    pub fn query(&self) -> EntryQuery {
        let mut filters = vec![
            EntryFilter::Owner(self.owner_id.clone()),
            EntryFilter::DateBetween(self.range),
            EntryFilter::Counterparty(self.counterparty_id),
        ];
        filters.extend(self.refinements.iter().cloned());
        EntryQuery {
            filters,
            order: EntryOrder::Chronological,
            page: None,
        }
    }
}

/// Paginated statement of one counterparty, chronological, with running
/// balances continuing across pages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatementRequest {
    pub owner_id: String,
    pub counterparty_id: Option<i64>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementSpec {
    pub owner_id: String,
    pub counterparty_id: i64,
    pub range: DateRange,
    pub page: PageRequest,
}

impl StatementRequest {
    pub fn build(&self) -> ResultEngine<StatementSpec> {
        Ok(StatementSpec {
            owner_id: require_owner(&self.owner_id)?,
            range: DateRange::parse(self.date_start.as_deref(), self.date_end.as_deref())?,
            counterparty_id: require_counterparty(self.counterparty_id)?,
            page: PageRequest::normalize(self.page, self.page_size),
        })
    }
}

impl StatementSpec {
    pub fn query(&self) -> EntryQuery {
        EntryQuery {
            filters: vec![
                EntryFilter::Owner(self.owner_id.clone()),
                EntryFilter::DateBetween(self.range),
                EntryFilter::Counterparty(self.counterparty_id),
            ],
            order: EntryOrder::Chronological,
            page: Some(self.page),
        }
    }
}

/// Unscoped recent view request (dashboards): every counterparty, newest
/// first by default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecentRequest {
    pub owner_id: String,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_column: Option<String>,
    pub sort_direction: Option<String>,
}

impl RecentRequest {
    pub fn build(&self) -> ResultEngine<EntryQuery> {
        let owner_id = require_owner(&self.owner_id)?;
        let range = DateRange::parse(self.date_start.as_deref(), self.date_end.as_deref())?;
        Ok(EntryQuery {
            filters: vec![EntryFilter::Owner(owner_id), EntryFilter::DateBetween(range)],
            order: EntryOrder::By(
                SortColumn::from_param(self.sort_column.as_deref()),
                SortDirection::from_param(self.sort_direction.as_deref(), SortDirection::Desc),
            ),
            page: Some(PageRequest::normalize(self.page, self.page_size)),
        })
    }
}

/// One filter over the `counterparties` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CounterpartyFilter {
    Owner(String),
    Id(i64),
    NameContains(String),
    Kind(CounterpartyKind),
    EmailContains(String),
    PhoneContains(String),
    /// Matches name, email or phone.
    Search(String),
}

impl CounterpartyFilter {
    pub(crate) fn condition(&self) -> Condition {
        use counterparties::Column;
        match self {
            Self::Owner(owner) => Condition::all().add(Column::OwnerId.eq(owner.as_str())),
            Self::Id(id) => Condition::all().add(Column::Id.eq(*id)),
            Self::NameContains(name) => Condition::all().add(Column::Name.contains(name.as_str())),
            Self::Kind(kind) => Condition::all().add(Column::Kind.eq(kind.as_str())),
            Self::EmailContains(email) => {
                Condition::all().add(Column::Email.contains(email.as_str()))
            }
            Self::PhoneContains(phone) => {
                Condition::all().add(Column::Phone.contains(phone.as_str()))
            }
            Self::Search(term) => Condition::any()
                .add(Column::Name.contains(term.as_str()))
                .add(Column::Email.contains(term.as_str()))
                .add(Column::Phone.contains(term.as_str())),
        }
    }
}

pub(crate) fn counterparty_condition(filters: &[CounterpartyFilter]) -> Condition {
    filters
        .iter()
        .fold(Condition::all(), |cond, filter| cond.add(filter.condition()))
}

/// Whitelisted counterparty sort columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CounterpartySortColumn {
    Id,
    Name,
    Kind,
    Email,
    Phone,
    #[default]
    CreatedAt,
}

impl CounterpartySortColumn {
    /// Unknown or missing columns fall back to `created_at`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("id") => Self::Id,
            Some("name") => Self::Name,
            Some("kind") => Self::Kind,
            Some("email") => Self::Email,
            Some("phone") => Self::Phone,
            _ => Self::CreatedAt,
        }
    }

    pub(crate) fn column(self) -> counterparties::Column {
        match self {
            Self::Id => counterparties::Column::Id,
            Self::Name => counterparties::Column::Name,
            Self::Kind => counterparties::Column::Kind,
            Self::Email => counterparties::Column::Email,
            Self::Phone => counterparties::Column::Phone,
            Self::CreatedAt => counterparties::Column::CreatedAt,
        }
    }
}

/// Counterparty directory listing request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterpartyRequest {
    pub owner_id: String,
    pub id: Option<i64>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub search_term: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_column: Option<String>,
    pub sort_direction: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterpartyQuery {
    pub filters: Vec<CounterpartyFilter>,
    pub sort: (CounterpartySortColumn, SortDirection),
    pub page: PageRequest,
}

impl CounterpartyRequest {
    pub fn build(&self) -> ResultEngine<CounterpartyQuery> {
        let mut filters = vec![CounterpartyFilter::Owner(require_owner(&self.owner_id)?)];
        if let Some(id) = self.id {
            filters.push(CounterpartyFilter::Id(id));
        }
        if let Some(name) = non_blank(self.name.as_deref()) {
            filters.push(CounterpartyFilter::NameContains(name.to_string()));
        }
        if let Some(kind) = non_blank(self.kind.as_deref()) {
            filters.push(CounterpartyFilter::Kind(CounterpartyKind::try_from(kind)?));
        }
        if let Some(email) = non_blank(self.email.as_deref()) {
            filters.push(CounterpartyFilter::EmailContains(email.to_string()));
        }
        if let Some(phone) = non_blank(self.phone.as_deref()) {
            filters.push(CounterpartyFilter::PhoneContains(phone.to_string()));
        }
        if let Some(term) = non_blank(self.search_term.as_deref()) {
            filters.push(CounterpartyFilter::Search(term.to_string()));
        }
        Ok(CounterpartyQuery {
            filters,
            sort: (
                CounterpartySortColumn::from_param(self.sort_column.as_deref()),
                SortDirection::from_param(self.sort_direction.as_deref(), SortDirection::Desc),
            ),
            page: PageRequest::normalize(self.page, self.page_size),
        })
    }
}

/// Per-counterparty balances listing request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalancesRequest {
    pub owner_id: String,
    pub kind: Option<String>,
    pub search_term: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl BalancesRequest {
    pub fn build(&self) -> ResultEngine<(Vec<CounterpartyFilter>, PageRequest)> {
        let mut filters = vec![CounterpartyFilter::Owner(require_owner(&self.owner_id)?)];
        if let Some(kind) = non_blank(self.kind.as_deref()) {
            filters.push(CounterpartyFilter::Kind(CounterpartyKind::try_from(kind)?));
        }
        if let Some(term) = non_blank(self.search_term.as_deref()) {
            filters.push(CounterpartyFilter::Search(term.to_string()));
        }
        Ok((filters, PageRequest::normalize(self.page, self.page_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_request() -> LedgerRequest {
        LedgerRequest {
            owner_id: "alice".to_string(),
            counterparty_id: Some(7),
            date_start: Some("2024-01-01".to_string()),
            date_end: Some("2024-01-31".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn strict_date_format() {
        assert_eq!(parse_date("d", "2024-02-29").unwrap(), date(2024, 2, 29));
        assert!(parse_date("d", "2024-1-5").is_err());
        assert!(parse_date("d", "2023-02-29").is_err());
        assert!(parse_date("d", "05/01/2024").is_err());
        assert!(parse_date("d", "2024-01-05T00:00").is_err());
    }

    #[test]
    fn date_range_rules() {
        assert!(DateRange::parse(Some("2024-01-02"), Some("2024-01-01")).is_err());
        assert!(DateRange::parse(Some("2024-01-01"), None).is_err());
        assert!(DateRange::parse(Some("2024-01-01"), Some("2024-01-01")).is_ok());
        assert_eq!(DateRange::parse_optional(None, None).unwrap(), None);
        assert!(DateRange::parse_optional(Some("2024-01-01"), None).is_err());
    }

    #[test]
    fn invalid_page_and_size_reset_to_default() {
        assert_eq!(PageRequest::normalize(Some(0), Some(0)), PageRequest::default());
        assert_eq!(
            PageRequest::normalize(Some(-3), Some(101)),
            PageRequest::default()
        );
        // 250 resets to 10, it is not clamped to 100.
        assert_eq!(PageRequest::normalize(Some(2), Some(250)).page_size, 10);
        assert_eq!(
            PageRequest::normalize(Some(4), Some(100)),
            PageRequest {
                page: 4,
                page_size: 100
            }
        );
        assert_eq!(PageRequest::normalize(Some(3), Some(20)).offset(), Some(40));
    }

    #[test]
    fn unreachable_page_has_no_offset() {
        let page = PageRequest::normalize(Some(i64::MAX), Some(100));
        assert_eq!(page.page, i64::MAX as u64);
        assert_eq!(page.offset(), None);
        assert_eq!(PageRequest::normalize(Some(1), Some(100)).offset(), Some(0));

        let p = Pagination::compute(3, page);
        assert!(!p.has_next);
        assert!(p.has_previous);
    }

    #[test]
    fn single_page_size_stays_in_bounds() {
        assert_eq!(Pagination::single_page(0).page_size, 1);
        assert_eq!(Pagination::single_page(0).total_pages, 0);
        assert_eq!(Pagination::single_page(7).page_size, 7);
        assert_eq!(Pagination::single_page(250).page_size, MAX_PAGE_SIZE);
        assert_eq!(Pagination::single_page(250).total_pages, 1);
    }

    #[test]
    fn pagination_metadata() {
        let p = Pagination::compute(21, PageRequest::normalize(Some(2), Some(10)));
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_previous);

        let p = Pagination::compute(20, PageRequest::normalize(Some(2), Some(10)));
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);

        let p = Pagination::compute(0, PageRequest::default());
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_previous);
    }

    #[test]
    fn sort_fallbacks() {
        assert_eq!(SortColumn::from_param(Some("amount; DROP TABLE")), SortColumn::EntryDate);
        assert_eq!(SortColumn::from_param(None), SortColumn::EntryDate);
        assert_eq!(SortColumn::from_param(Some("credit")), SortColumn::Credit);
        assert_eq!(
            SortDirection::from_param(Some("desc"), SortDirection::Asc),
            SortDirection::Desc
        );
        assert_eq!(
            SortDirection::from_param(Some("sideways"), SortDirection::Asc),
            SortDirection::Asc
        );
        assert_eq!(
            SortDirection::from_param(None, SortDirection::Desc),
            SortDirection::Desc
        );
    }

    #[test]
    fn ledger_requires_owner_range_and_counterparty() {
        let mut req = ledger_request();
        req.owner_id = " ".to_string();
        assert_eq!(
            req.build().unwrap_err(),
            EngineError::InvalidInput("owner id is required".to_string())
        );

        let mut req = ledger_request();
        req.date_end = None;
        assert!(req.build().is_err());

        let mut req = ledger_request();
        req.counterparty_id = None;
        assert_eq!(
            req.build().unwrap_err(),
            EngineError::InvalidInput("counterparty id is required".to_string())
        );
    }

    #[test]
    fn ledger_spec_queries_chronologically() {
        let mut req = ledger_request();
        req.search_term = Some("rent".to_string());
        req.sort_column = Some("debit".to_string());
        req.sort_direction = Some("DESC".to_string());
        let spec = req.build().unwrap();

        assert_eq!(
            spec.display_order,
            EntryOrder::By(SortColumn::Debit, SortDirection::Desc)
        );
        let query = spec.query();
        assert_eq!(query.order, EntryOrder::Chronological);
        assert_eq!(query.page, None);
        assert!(query.filters.contains(&EntryFilter::Counterparty(7)));
        assert!(query.filters.contains(&EntryFilter::Search("rent".to_string())));
    }

    #[test]
    fn recent_view_defaults() {
        let query = RecentRequest {
            owner_id: "alice".to_string(),
            date_start: Some("2024-01-01".to_string()),
            date_end: Some("2024-01-31".to_string()),
            page_size: Some(500),
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(
            query.order,
            EntryOrder::By(SortColumn::EntryDate, SortDirection::Desc)
        );
        assert_eq!(query.page, Some(PageRequest::default()));
        assert!(
            !query
                .filters
                .iter()
                .any(|f| matches!(f, EntryFilter::Counterparty(_)))
        );
    }

    #[test]
    fn counterparty_request_rejects_unknown_kind() {
        let req = CounterpartyRequest {
            owner_id: "alice".to_string(),
            kind: Some("partner".to_string()),
            ..Default::default()
        };
        assert!(req.build().is_err());
    }
}
