use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::required_text;
use storefront_core::{DomainError, DomainResult, ProductId, QuestionId, UserId};

const TEXT_MAX: usize = 2_000;

/// A buyer's question about a product. Answered at most once, by the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub product_id: ProductId,
    pub asker_id: UserId,
    pub question: String,
    pub answer: Option<String>,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn ask(product_id: ProductId, asker_id: UserId, text: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: QuestionId::new(),
            product_id,
            asker_id,
            question: required_text("question", text, TEXT_MAX)?,
            answer: None,
            answered_at: None,
            created_at: now,
        })
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    pub fn answer(&mut self, text: &str, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_answered() {
            return Err(DomainError::conflict("Question already answered"));
        }
        self.answer = Some(required_text("answer", text, TEXT_MAX)?);
        self.answered_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_exactly_once() {
        let mut q = Question::ask(ProductId::new(), UserId::new(), "Dishwasher safe?", Utc::now()).unwrap();
        assert!(!q.is_answered());

        q.answer("Yes", Utc::now()).unwrap();
        assert!(q.is_answered());

        let err = q.answer("No", Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::conflict("Question already answered"));
        assert_eq!(q.answer.as_deref(), Some("Yes"));
    }

    #[test]
    fn blank_answer_leaves_question_open() {
        let mut q = Question::ask(ProductId::new(), UserId::new(), "Colour?", Utc::now()).unwrap();
        assert!(q.answer("  ", Utc::now()).is_err());
        assert!(!q.is_answered());
    }
}
