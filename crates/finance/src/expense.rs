use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::{optional_text, positive_amount, required_text};
use storefront_core::{DomainError, DomainResult, ExpenseId, UserId, string_enum};

use crate::period::DateRange;

const CATEGORY_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;

string_enum! {
    /// Expenses are never removed; deleting one flips it to `deleted`.
    pub enum ExpenseStatus("expense status") {
        Active => "active",
        Deleted => "deleted",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub seller_id: UserId,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub expense_date: Option<NaiveDate>,
}

impl Expense {
    pub fn record(seller_id: UserId, input: NewExpense, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: ExpenseId::new(),
            seller_id,
            amount: positive_amount("amount", input.amount)?,
            category: normalize_category(&input.category)?,
            description: optional_text("description", input.description.as_deref(), DESCRIPTION_MAX)?,
            expense_date: input.expense_date.unwrap_or_else(|| now.date_naive()),
            status: ExpenseStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == ExpenseStatus::Active
    }

    /// Mark the expense deleted. The row itself is kept.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_active() {
            return Err(DomainError::not_found());
        }
        self.status = ExpenseStatus::Deleted;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub expense_date: Option<NaiveDate>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.category.is_none() && self.description.is_none() && self.expense_date.is_none()
    }

    pub fn apply(self, expense: &mut Expense, now: DateTime<Utc>) -> DomainResult<()> {
        if !expense.is_active() {
            return Err(DomainError::not_found());
        }
        if self.is_empty() {
            return Err(DomainError::validation("No fields to update"));
        }
        let amount = self.amount.map(|a| positive_amount("amount", a)).transpose()?;
        let category = self.category.as_deref().map(normalize_category).transpose()?;
        let description = self
            .description
            .as_deref()
            .map(|d| optional_text("description", Some(d), DESCRIPTION_MAX))
            .transpose()?;

        if let Some(amount) = amount {
            expense.amount = amount;
        }
        if let Some(category) = category {
            expense.category = category;
        }
        if let Some(description) = description {
            expense.description = description;
        }
        if let Some(date) = self.expense_date {
            expense.expense_date = date;
        }
        expense.updated_at = now;
        Ok(())
    }
}

/// Listing filter. Deleted expenses never match.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub range: Option<DateRange>,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        expense.is_active()
            && self
                .category
                .as_deref()
                .is_none_or(|c| expense.category.eq_ignore_ascii_case(c.trim()))
            && self.range.is_none_or(|r| r.contains_date(expense.expense_date))
    }
}

fn normalize_category(raw: &str) -> DomainResult<String> {
    required_text("category", raw, CATEGORY_MAX).map(|c| c.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping(amount: f64) -> NewExpense {
        NewExpense {
            amount,
            category: " Shipping ".to_string(),
            description: Some("Courier".to_string()),
            expense_date: NaiveDate::from_ymd_opt(2024, 5, 2),
        }
    }

    #[test]
    fn record_normalizes_category_and_defaults_active() {
        let e = Expense::record(UserId::new(), shipping(20.0), Utc::now()).unwrap();
        assert_eq!(e.category, "shipping");
        assert!(e.is_active());
    }

    #[test]
    fn zero_amount_is_rejected() {
        assert!(Expense::record(UserId::new(), shipping(0.0), Utc::now()).is_err());
    }

    #[test]
    fn soft_delete_keeps_row_and_hides_it_from_filters() {
        let mut e = Expense::record(UserId::new(), shipping(20.0), Utc::now()).unwrap();
        let filter = ExpenseFilter::default();
        assert!(filter.matches(&e));

        e.soft_delete(Utc::now()).unwrap();
        assert_eq!(e.status, ExpenseStatus::Deleted);
        assert!(!filter.matches(&e));
        assert_eq!(e.soft_delete(Utc::now()), Err(DomainError::NotFound));
    }

    #[test]
    fn deleted_expense_cannot_be_patched() {
        let mut e = Expense::record(UserId::new(), shipping(20.0), Utc::now()).unwrap();
        e.soft_delete(Utc::now()).unwrap();
        let patch = ExpensePatch { amount: Some(5.0), ..ExpensePatch::default() };
        assert_eq!(patch.apply(&mut e, Utc::now()), Err(DomainError::NotFound));
    }

    #[test]
    fn filter_by_category_and_range() {
        let e = Expense::record(UserId::new(), shipping(20.0), Utc::now()).unwrap();
        let may = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        )
        .unwrap();
        let june = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap();

        assert!(ExpenseFilter { category: Some("SHIPPING".into()), range: Some(may) }.matches(&e));
        assert!(!ExpenseFilter { category: Some("ads".into()), range: None }.matches(&e));
        assert!(!ExpenseFilter { category: None, range: Some(june) }.matches(&e));
    }
}
