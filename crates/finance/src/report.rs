//! Profit/loss arithmetic over owner-scoped, date-bounded rows.
//!
//! Everything here is pure and recomputed on every request.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::expense::Expense;
use crate::period::DateRange;
use crate::transaction::{Transaction, TransactionStatus};

/// Round to cents for presentation.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `numerator / denominator * 100` with two decimals, or `"0"` when the
/// denominator is zero.
pub fn format_ratio(numerator: f64, denominator: f64) -> String {
    if denominator == 0.0 {
        return "0".to_string();
    }
    format!("{:.2}", numerator / denominator * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub revenue: f64,
    pub refunds: f64,
    pub commission: f64,
    pub expenses: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
    pub transaction_count: usize,
    pub completed_count: usize,
    pub refunded_count: usize,
}

impl FinancialSummary {
    /// Aggregate already-filtered rows. Deleted expenses are ignored even if
    /// the caller passed them in.
    pub fn compute(transactions: &[Transaction], expenses: &[Expense]) -> Self {
        let mut revenue = 0.0;
        let mut refunds = 0.0;
        let mut commission = 0.0;
        let mut completed_count = 0;
        let mut refunded_count = 0;

        for t in transactions {
            match t.status {
                TransactionStatus::Completed => {
                    revenue += t.net_to_seller();
                    commission += t.platform_fee.unwrap_or(0.0);
                    completed_count += 1;
                }
                TransactionStatus::Refunded => {
                    refunds += t.amount;
                    refunded_count += 1;
                }
                TransactionStatus::Pending | TransactionStatus::Failed => {}
            }
        }

        let expenses: f64 = expenses.iter().filter(|e| e.is_active()).map(|e| e.amount).sum();
        let gross_profit = revenue - refunds;
        let net_profit = gross_profit - expenses;
        let profit_margin = if revenue == 0.0 { 0.0 } else { net_profit / revenue * 100.0 };

        Self {
            revenue: round2(revenue),
            refunds: round2(refunds),
            commission: round2(commission),
            expenses: round2(expenses),
            gross_profit: round2(gross_profit),
            net_profit: round2(net_profit),
            profit_margin: round2(profit_margin),
            transaction_count: transactions.len(),
            completed_count,
            refunded_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitLossReport {
    pub period: DateRange,
    #[serde(flatten)]
    pub summary: FinancialSummary,
    pub expenses_by_category: BTreeMap<String, f64>,
}

impl ProfitLossReport {
    pub fn compute(period: DateRange, transactions: &[Transaction], expenses: &[Expense]) -> Self {
        let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
        for e in expenses.iter().filter(|e| e.is_active()) {
            *by_category.entry(e.category.clone()).or_default() += e.amount;
        }
        by_category.values_mut().for_each(|v| *v = round2(*v));

        Self {
            period,
            summary: FinancialSummary::compute(transactions, expenses),
            expenses_by_category: by_category,
        }
    }
}

/// Tax summary for a calendar year or quarter. Ratios are strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxReport {
    pub period: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub gross_revenue: f64,
    pub refunds: f64,
    pub platform_fees: f64,
    pub deductible_expenses: f64,
    pub net_profit: f64,
    pub taxable_income: f64,
    pub profit_margin: String,
    pub transaction_count: usize,
}

impl TaxReport {
    pub fn compute(
        year: i32,
        quarter: Option<u32>,
        range: DateRange,
        transactions: &[Transaction],
        expenses: &[Expense],
    ) -> Self {
        let s = FinancialSummary::compute(transactions, expenses);
        let period = match quarter {
            Some(q) => format!("{year}-Q{q}"),
            None => year.to_string(),
        };
        Self {
            period,
            start_date: range.start,
            end_date: range.end,
            gross_revenue: s.revenue,
            refunds: s.refunds,
            platform_fees: s.commission,
            deductible_expenses: s.expenses,
            net_profit: s.net_profit,
            taxable_income: s.net_profit.max(0.0),
            profit_margin: format_ratio(s.net_profit, s.revenue),
            transaction_count: s.transaction_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::NewExpense;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use storefront_core::{TransactionId, UserId};

    fn tx(amount: f64, status: TransactionStatus, payout: Option<f64>, fee: Option<f64>) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            seller_id: UserId::new(),
            buyer_id: UserId::new(),
            product_id: None,
            amount,
            seller_payout: payout,
            platform_fee: fee,
            status,
            created_at: Utc::now(),
        }
    }

    fn expense(amount: f64, category: &str) -> Expense {
        Expense::record(
            UserId::new(),
            NewExpense {
                amount,
                category: category.to_string(),
                ..NewExpense::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn single_completed_sale_without_expenses() {
        let s = FinancialSummary::compute(
            &[tx(100.0, TransactionStatus::Completed, Some(90.0), Some(10.0))],
            &[],
        );
        assert_eq!(s.revenue, 90.0);
        assert_eq!(s.commission, 10.0);
        assert_eq!(s.net_profit, 90.0);
        assert_eq!(s.profit_margin, 100.0);
    }

    #[test]
    fn payout_falls_back_to_amount() {
        let s = FinancialSummary::compute(&[tx(40.0, TransactionStatus::Completed, None, None)], &[]);
        assert_eq!(s.revenue, 40.0);
        assert_eq!(s.commission, 0.0);
    }

    #[test]
    fn refunds_and_expenses_reduce_profit() {
        let s = FinancialSummary::compute(
            &[
                tx(100.0, TransactionStatus::Completed, Some(90.0), Some(10.0)),
                tx(30.0, TransactionStatus::Refunded, Some(27.0), Some(3.0)),
                tx(500.0, TransactionStatus::Pending, None, None),
            ],
            &[expense(20.0, "ads")],
        );
        assert_eq!(s.refunds, 30.0);
        assert_eq!(s.gross_profit, 60.0);
        assert_eq!(s.net_profit, 40.0);
        assert_eq!(s.transaction_count, 3);
        assert_eq!(s.completed_count, 1);
        assert_eq!(s.refunded_count, 1);
    }

    #[test]
    fn deleted_expenses_are_ignored() {
        let mut gone = expense(50.0, "ads");
        gone.soft_delete(Utc::now()).unwrap();
        let s = FinancialSummary::compute(&[], &[gone, expense(5.0, "ads")]);
        assert_eq!(s.expenses, 5.0);
    }

    #[test]
    fn zero_revenue_gives_zero_margin() {
        let s = FinancialSummary::compute(&[], &[expense(10.0, "ads")]);
        assert_eq!(s.profit_margin, 0.0);
        assert_eq!(format_ratio(s.net_profit, s.revenue), "0");
    }

    #[test]
    fn tax_report_labels_and_string_margin() {
        let range = crate::period::DateRange::quarter(2024, 2).unwrap();
        let r = TaxReport::compute(2024, Some(2), range, &[], &[expense(10.0, "ads")]);
        assert_eq!(r.period, "2024-Q2");
        assert_eq!(r.profit_margin, "0");
        assert_eq!(r.taxable_income, 0.0);
        assert_eq!(r.start_date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());

        let r = TaxReport::compute(
            2024,
            None,
            crate::period::DateRange::year(2024).unwrap(),
            &[tx(200.0, TransactionStatus::Completed, Some(180.0), Some(20.0))],
            &[expense(45.0, "ads")],
        );
        assert_eq!(r.period, "2024");
        assert_eq!(r.profit_margin, "75.00");
        assert_eq!(r.taxable_income, 135.0);
    }

    #[test]
    fn profit_loss_groups_by_category() {
        let range = crate::period::DateRange::year(2024).unwrap();
        let r = ProfitLossReport::compute(
            range,
            &[],
            &[expense(10.0, "ads"), expense(2.5, "ads"), expense(7.0, "shipping")],
        );
        assert_eq!(r.expenses_by_category.get("ads"), Some(&12.5));
        assert_eq!(r.expenses_by_category.get("shipping"), Some(&7.0));

        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["expenses"], 19.5);
        assert_eq!(v["period"]["start"], "2024-01-01");
    }

    proptest! {
        #[test]
        fn identities_hold(
            rows in proptest::collection::vec((0u32..100_000, 0u8..4, proptest::option::of(0u32..100_000), proptest::option::of(0u32..10_000)), 0..40),
            costs in proptest::collection::vec(1u32..50_000, 0..10),
        ) {
            let statuses = [
                TransactionStatus::Pending,
                TransactionStatus::Completed,
                TransactionStatus::Refunded,
                TransactionStatus::Failed,
            ];
            let txs: Vec<_> = rows
                .iter()
                .map(|(a, s, p, f)| tx(*a as f64 / 100.0, statuses[*s as usize], p.map(|v| v as f64 / 100.0), f.map(|v| v as f64 / 100.0)))
                .collect();
            let exps: Vec<_> = costs.iter().map(|c| expense(*c as f64 / 100.0, "misc")).collect();

            let s = FinancialSummary::compute(&txs, &exps);
            prop_assert!(s.profit_margin.is_finite());
            prop_assert!((s.gross_profit - (s.revenue - s.refunds)).abs() < 0.011);
            prop_assert!((s.net_profit - (s.gross_profit - s.expenses)).abs() < 0.011);
            if s.revenue == 0.0 {
                prop_assert_eq!(s.profit_margin, 0.0);
            }
            prop_assert_eq!(s.completed_count + s.refunded_count <= s.transaction_count, true);
        }
    }
}
