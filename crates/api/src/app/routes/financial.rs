//! Financial reporting and expense bookkeeping.
//!
//! Every figure is recomputed from the caller's transactions and active
//! expenses on each request; nothing is cached between calls.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use storefront_core::{ExpenseId, PageRequest};
use storefront_finance::{
    DateRange, Expense, ExpenseFilter, ExpensePatch, FinancialSummary, INTEGRATIONS, NewExpense, ProfitLossReport,
    TaxReport, find_integration, parse_date,
};

use super::ApiRequest;
use crate::app::dto::{ExpenseRequest, require};
use crate::app::errors::{ApiError, ApiResponse, ApiResult};
use crate::authz::OwnerScope;

#[derive(Debug, Serialize)]
struct Dashboard {
    period: DateRange,
    #[serde(flatten)]
    summary: FinancialSummary,
}

fn requested_range(req: &ApiRequest) -> Result<DateRange, ApiError> {
    Ok(DateRange::from_query(req.query("start_date"), req.query("end_date"), Utc::now())?)
}

pub async fn dashboard(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let period = requested_range(req)?;
    let resources = scope.resources();
    let transactions = resources.transactions_in_range(scope.caller(), period).await?;
    let expenses = resources.active_expenses_in_range(scope.caller(), period).await?;

    ApiResponse::ok(Dashboard {
        period,
        summary: FinancialSummary::compute(&transactions, &expenses),
    })
}

pub async fn profit_loss(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let period = requested_range(req)?;
    let resources = scope.resources();
    let transactions = resources.transactions_in_range(scope.caller(), period).await?;
    let expenses = resources.active_expenses_in_range(scope.caller(), period).await?;

    ApiResponse::ok(ProfitLossReport::compute(period, &transactions, &expenses))
}

pub async fn tax_report(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let year: i32 = req
        .query("year")
        .ok_or_else(|| ApiError::validation("Missing required fields: year"))?
        .parse()
        .map_err(|_| ApiError::validation("year must be a number"))?;
    let quarter = req
        .query("quarter")
        .map(|q| q.parse::<u32>().map_err(|_| ApiError::validation("quarter must be between 1 and 4")))
        .transpose()?;

    let range = match quarter {
        Some(q) => DateRange::quarter(year, q)?,
        None => DateRange::year(year)?,
    };
    let resources = scope.resources();
    let transactions = resources.transactions_in_range(scope.caller(), range).await?;
    let expenses = resources.active_expenses_in_range(scope.caller(), range).await?;

    ApiResponse::ok(TaxReport::compute(year, quarter, range, &transactions, &expenses))
}

pub async fn list_expenses(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let filter = ExpenseFilter {
        category: req.query("category").map(str::to_lowercase),
        range: DateRange::bounded(req.query("start_date"), req.query("end_date"))?,
    };
    let page = PageRequest::from_query(req.query("page"), req.query("limit"));

    ApiResponse::ok(scope.resources().list_expenses(scope.caller(), &filter, page).await?)
}

pub async fn create_expense(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let body: ExpenseRequest = req.json()?;
    require(&[("amount", &body.amount), ("category", &body.category)])?;
    let expense_date = body
        .expense_date
        .as_deref()
        .map(|d| parse_date("expense_date", d))
        .transpose()?;

    let expense = Expense::record(
        scope.caller(),
        NewExpense {
            amount: body.amount.unwrap_or_default(),
            category: body.category.unwrap_or_default(),
            description: body.description,
            expense_date,
        },
        Utc::now(),
    )?;
    scope.resources().insert_expense(&expense).await?;

    Ok(ApiResponse::created(expense)?.message("Expense recorded"))
}

pub async fn update_expense(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ExpenseId = req.param("id")?;
    let body: ExpenseRequest = req.json()?;
    let mut expense = scope.expense(id).await?;

    ExpensePatch {
        amount: body.amount,
        category: body.category,
        description: body.description,
        expense_date: body
            .expense_date
            .as_deref()
            .map(|d| parse_date("expense_date", d))
            .transpose()?,
    }
    .apply(&mut expense, Utc::now())?;
    scope.resources().update_expense(&expense).await?;

    Ok(ApiResponse::ok(expense)?.message("Expense updated"))
}

pub async fn delete_expense(scope: &OwnerScope<'_>, req: &ApiRequest) -> ApiResult {
    let id: ExpenseId = req.param("id")?;
    let mut expense = scope.expense(id).await?;
    expense.soft_delete(Utc::now())?;
    scope.resources().update_expense(&expense).await?;
    tracing::info!(expense_id = %id, "expense soft-deleted");

    Ok(ApiResponse::ok(json!({ "id": id }))?.message("Expense deleted"))
}

pub async fn instant_payout() -> ApiResult {
    Err(ApiError::validation("Instant payouts are not available"))
}

pub async fn list_integrations() -> ApiResult {
    ApiResponse::ok(INTEGRATIONS)
}

pub async fn connect_integration(req: &ApiRequest) -> ApiResult {
    let id = req
        .params()
        .get("id")
        .ok_or_else(|| ApiError::validation("Missing path parameter: id"))?;
    let integration = find_integration(id).ok_or_else(|| ApiError::not_found("Integration"))?;
    Err(ApiError::NotImplemented(format!(
        "{} integration is not available yet",
        integration.name
    )))
}
