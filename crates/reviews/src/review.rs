use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::required_text;
use storefront_core::{DomainError, DomainResult, ProductId, ReviewId, UserId, string_enum};

const RESPONSE_MAX: usize = 2_000;

string_enum! {
    pub enum ReviewStatus("review status") {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl ReviewStatus {
    /// Parse a moderation decision. Only `approved` and `rejected` are targets;
    /// nothing moves a review back to `pending`.
    pub fn parse_decision(raw: &str) -> DomainResult<Self> {
        match raw.parse::<ReviewStatus>()? {
            ReviewStatus::Pending => Err(DomainError::validation(
                "Invalid review status: must be one of approved, rejected",
            )),
            decided => Ok(decided),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub rating: u8,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub seller_response: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// A freshly submitted review, awaiting moderation.
    pub fn submit(
        product_id: ProductId,
        seller_id: UserId,
        buyer_id: UserId,
        rating: u8,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !(1..=5).contains(&rating) {
            return Err(DomainError::validation("rating must be between 1 and 5"));
        }
        Ok(Self {
            id: ReviewId::new(),
            product_id,
            seller_id,
            buyer_id,
            rating,
            title: None,
            comment,
            status: ReviewStatus::Pending,
            seller_response: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Set the seller's public reply. A later reply replaces an earlier one.
    pub fn respond(&mut self, response: &str, now: DateTime<Utc>) -> DomainResult<()> {
        self.seller_response = Some(required_text("response", response, RESPONSE_MAX)?);
        self.responded_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn moderate(&mut self, decision: ReviewStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if decision == ReviewStatus::Pending {
            return Err(DomainError::validation("A review cannot be moved back to pending"));
        }
        self.status = decision;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewFilter {
    pub status: Option<ReviewStatus>,
    pub rating: Option<u8>,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        self.status.is_none_or(|s| review.status == s) && self.rating.is_none_or(|r| review.rating == r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review() -> Review {
        Review::submit(ProductId::new(), UserId::new(), UserId::new(), 4, Some("Nice".into()), Utc::now()).unwrap()
    }

    #[test]
    fn submit_validates_rating() {
        assert!(Review::submit(ProductId::new(), UserId::new(), UserId::new(), 0, None, Utc::now()).is_err());
        assert!(Review::submit(ProductId::new(), UserId::new(), UserId::new(), 6, None, Utc::now()).is_err());
        assert_eq!(review().status, ReviewStatus::Pending);
    }

    #[test]
    fn later_response_overwrites_earlier_one() {
        let mut r = review();
        let first = Utc::now();
        r.respond("Thanks!", first).unwrap();
        let second = first + chrono::Duration::minutes(1);
        r.respond("Thanks again!", second).unwrap();
        assert_eq!(r.seller_response.as_deref(), Some("Thanks again!"));
        assert_eq!(r.responded_at, Some(second));
    }

    #[test]
    fn response_does_not_touch_status() {
        let mut r = review();
        r.moderate(ReviewStatus::Rejected, Utc::now()).unwrap();
        r.respond("Sorry to hear", Utc::now()).unwrap();
        assert_eq!(r.status, ReviewStatus::Rejected);
    }

    #[test]
    fn blank_response_is_rejected() {
        assert!(review().respond("   ", Utc::now()).is_err());
    }

    #[test]
    fn decisions_exclude_pending() {
        assert_eq!(ReviewStatus::parse_decision("APPROVED").unwrap(), ReviewStatus::Approved);
        assert!(ReviewStatus::parse_decision("pending").is_err());
        assert!(ReviewStatus::parse_decision("spam").is_err());
        assert!(review().moderate(ReviewStatus::Pending, Utc::now()).is_err());
    }

    #[test]
    fn filter_combines_status_and_rating() {
        let r = review();
        assert!(ReviewFilter::default().matches(&r));
        assert!(ReviewFilter { status: Some(ReviewStatus::Pending), rating: Some(4) }.matches(&r));
        assert!(!ReviewFilter { status: None, rating: Some(5) }.matches(&r));
    }
}
