use sea_orm::{EntityTrait, FromQueryResult, QueryOrder, QuerySelect, sea_query::Expr};
use serde::Serialize;

use crate::{
    ResultEngine,
    entry::{self, Entry},
    query::{ApplyQuery, Query},
};

use super::Engine;

const UNBOUNDED_LIMIT: u64 = i64::MAX as u64;

/// Sums of non-negative and negative amounts, zero when nothing matches.
pub(super) const POSITIVE_SUM: &str =
    "COALESCE(SUM(CASE WHEN amount >= 0 THEN amount ELSE 0.0 END), 0.0)";
pub(super) const NEGATIVE_SUM: &str =
    "COALESCE(SUM(CASE WHEN amount < 0 THEN amount ELSE 0.0 END), 0.0)";

/// Column the retrieval is ordered by. Ordering is always descending, ties
/// broken by id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Date,
    Amount,
    Description,
    CreateTime,
}

impl SortKey {
    /// Maps the client-facing sort name. Unknown names fall back to date.
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "amount" => Self::Amount,
            "desc" => Self::Description,
            "entryDate" => Self::CreateTime,
            _ => Self::Date,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Description => "desc",
            Self::CreateTime => "entryDate",
        }
    }

    fn column(self) -> entry::Column {
        match self {
            Self::Date => entry::Column::Date,
            Self::Amount => entry::Column::Amount,
            Self::Description => entry::Column::Description,
            Self::CreateTime => entry::Column::CreateTime,
        }
    }
}

/// Window over the sorted result. `limit: None` returns everything after
/// `start`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub start: u64,
    pub limit: Option<u64>,
}

impl Page {
    pub fn new(start: u64, limit: Option<u64>) -> Self {
        Self { start, limit }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Totals over every entry matching a query, independent of pagination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub count: u64,
    /// Sum of amounts `>= 0`. Zero amounts land here.
    pub positive_total: f64,
    /// Sum of amounts `< 0`, so never positive.
    pub negative_total: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub entries: Vec<Entry>,
    pub totals: Aggregate,
}

#[derive(Debug, FromQueryResult)]
struct AggregateRow {
    count: i64,
    positive_total: f64,
    negative_total: f64,
}

impl Engine {
    /// Returns the page of entries matching `query`, sorted descending on
    /// `sort`.
    pub async fn find_entries(
        &self,
        query: &Query,
        page: Page,
        sort: SortKey,
    ) -> ResultEngine<Vec<Entry>> {
        // SQLite only accepts OFFSET after a LIMIT.
        let select = entry::Entity::find()
            .apply_query(query)
            .order_by_desc(sort.column())
            .order_by_desc(entry::Column::Id)
            .limit(page.limit.unwrap_or(UNBOUNDED_LIMIT))
            .offset(page.start);

        let models = self.store(select.all(&self.database)).await?;
        models.into_iter().map(Entry::try_from).collect()
    }

    /// Count and signed totals of all entries matching `query`.
    pub async fn aggregate(&self, query: &Query) -> ResultEngine<Aggregate> {
        let select = entry::Entity::find()
            .select_only()
            .column_as(Expr::cust("COUNT(*)"), "count")
            .column_as(Expr::cust(POSITIVE_SUM), "positive_total")
            .column_as(Expr::cust(NEGATIVE_SUM), "negative_total")
            .apply_query(query)
            .into_model::<AggregateRow>();

        let row = self.store(select.one(&self.database)).await?;
        Ok(row
            .map(|row| Aggregate {
                count: u64::try_from(row.count).unwrap_or_default(),
                positive_total: row.positive_total,
                negative_total: row.negative_total,
            })
            .unwrap_or_default())
    }

    /// Page and totals for the same query, fetched concurrently.
    pub async fn search(
        &self,
        query: &Query,
        page: Page,
        sort: SortKey,
    ) -> ResultEngine<SearchResult> {
        tracing::debug!(
            "search [{query}] start={} limit={:?} sort={}",
            page.start,
            page.limit,
            sort.as_str()
        );
        let (entries, totals) =
            tokio::try_join!(self.find_entries(query, page, sort), self.aggregate(query))?;
        Ok(SearchResult { entries, totals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_from_wire() {
        assert_eq!(SortKey::from_wire("amount"), SortKey::Amount);
        assert_eq!(SortKey::from_wire("desc"), SortKey::Description);
        assert_eq!(SortKey::from_wire("entryDate"), SortKey::CreateTime);
        assert_eq!(SortKey::from_wire("createTime"), SortKey::Date);
        assert_eq!(SortKey::from_wire("date"), SortKey::Date);
        assert_eq!(SortKey::from_wire(""), SortKey::Date);
        assert_eq!(SortKey::from_wire("whatever"), SortKey::Date);
    }

    #[test]
    fn unbounded_page() {
        let page = Page::unbounded();
        assert_eq!(page.start, 0);
        assert!(page.limit.is_none());
    }
}
