//! `storefront-finance`: seller expenses, marketplace transactions and the
//! reports computed from them.

pub mod expense;
pub mod integration;
pub mod period;
pub mod report;
pub mod transaction;

pub use expense::{Expense, ExpenseFilter, ExpensePatch, ExpenseStatus, NewExpense};
pub use integration::{AccountingIntegration, INTEGRATIONS, find_integration};
pub use period::{DateRange, parse_date};
pub use report::{FinancialSummary, ProfitLossReport, TaxReport, format_ratio};
pub use transaction::{Transaction, TransactionStatus};
