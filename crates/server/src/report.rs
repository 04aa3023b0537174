//! Report API endpoints

use api_types::report::{MonthView, MonthlyReport, MonthlyReportRequest};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState, validate};

/// Handle requests for the twelve-month income/expense rollup of a year
pub async fn monthly_report(
    State(state): State<ServerState>,
    Json(payload): Json<MonthlyReportRequest>,
) -> Result<Json<MonthlyReport>, ServerError> {
    let year = validate::year(payload.year)?;
    let months = state.engine.monthly_report(year).await?;

    Ok(Json(MonthlyReport {
        monthly_data: months
            .into_iter()
            .map(|month| MonthView {
                month: month.month,
                income: month.income,
                expense: month.expense,
            })
            .collect(),
    }))
}
