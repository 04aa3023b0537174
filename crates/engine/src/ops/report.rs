use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{EntityTrait, FromQueryResult, QuerySelect, sea_query::Expr};
use serde::Serialize;

use crate::{
    EngineError, ResultEngine,
    entry,
    filter::{Filter, FilterField, FilterOp, FilterValue},
    query::{ApplyQuery, Query},
};

use super::{
    Engine,
    search::{NEGATIVE_SUM, POSITIVE_SUM},
};

pub const MIN_REPORT_YEAR: i32 = 1900;
pub const MAX_REPORT_YEAR: i32 = 2100;

/// Income and expense for one calendar month (UTC). `expense` is the sum of
/// negative amounts and therefore never positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub month: u32,
    pub income: f64,
    pub expense: f64,
}

/// Query selecting every entry whose transaction date falls in `year`.
pub fn year_query(year: i32) -> ResultEngine<Query> {
    if !(MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&year) {
        return Err(EngineError::InvalidYear(year));
    }
    let (start, end) = (year_start(year)?, year_start(year + 1)?);
    Query::compile(&[
        Filter::new(
            FilterField::TransactionDate,
            FilterOp::GreaterOrEqual,
            FilterValue::Time(start),
        )?,
        Filter::new(
            FilterField::TransactionDate,
            FilterOp::LessThan,
            FilterValue::Time(end),
        )?,
    ])
}

fn year_start(year: i32) -> ResultEngine<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or(EngineError::InvalidYear(year))
}

/// Calendar month (1-12) of the stored transaction date, in UTC.
const MONTH_OF_DATE: &str = "CAST(strftime('%m', date) AS INTEGER)";

#[derive(Debug, FromQueryResult)]
struct MonthRow {
    month: i32,
    income: f64,
    expense: f64,
}

/// Spreads the grouped rows over twelve zero-filled months. Months outside
/// `1..=12` are ignored.
fn fold_months(rows: impl IntoIterator<Item = MonthRow>) -> Vec<MonthlyTotals> {
    let mut months: Vec<MonthlyTotals> = (1..=12)
        .map(|month| MonthlyTotals {
            month,
            ..Default::default()
        })
        .collect();

    for row in rows {
        let Some(slot) = usize::try_from(row.month - 1)
            .ok()
            .and_then(|index| months.get_mut(index))
        else {
            continue;
        };
        slot.income += row.income;
        slot.expense += row.expense;
    }
    months
}

impl Engine {
    /// Twelve zero-filled monthly totals for `year`, January first.
    pub async fn monthly_report(&self, year: i32) -> ResultEngine<Vec<MonthlyTotals>> {
        let scope = year_query(year)?;
        let rows = self
            .store(
                entry::Entity::find()
                    .select_only()
                    .column_as(Expr::cust(MONTH_OF_DATE), "month")
                    .column_as(Expr::cust(POSITIVE_SUM), "income")
                    .column_as(Expr::cust(NEGATIVE_SUM), "expense")
                    .apply_query(&scope)
                    .group_by(Expr::cust(MONTH_OF_DATE))
                    .into_model::<MonthRow>()
                    .all(&self.database),
            )
            .await?;

        tracing::debug!("monthly report {year}: {} active months", rows.len());
        Ok(fold_months(rows))
    }
}
