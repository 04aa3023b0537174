//! Ledger core: stores income and expense entries and answers filtered,
//! paginated queries with aggregate totals and monthly reports.
//!
//! Client filters arrive as loosely typed JSON. [`parse_filters`] turns them
//! into typed [`Filter`]s, [`Query::compile`] turns those into a store
//! condition, and [`Engine`] runs it.

pub use entry::Entry;
pub use error::EngineError;
pub use filter::{Filter, FilterField, FilterOp, FilterValue, parse_filters};
pub use ops::{
    Aggregate, DEFAULT_QUERY_TIMEOUT, Engine, EngineBuilder, MAX_REPORT_YEAR, MIN_REPORT_YEAR,
    MonthlyTotals, Page, SearchResult, SortKey, year_query,
};
pub use query::{Comparison, Predicate, Query};

mod entry;
mod error;
mod filter;
mod ops;
mod query;
mod tokens;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
