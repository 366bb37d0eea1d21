//! Review-request campaigns: asking buyers of completed orders for a review.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::text::optional_text;
use storefront_core::{DomainError, DomainResult, ProductId, ReviewRequestId, TransactionId, UserId};
use storefront_finance::Transaction;

use crate::review::Review;

pub const DEFAULT_DELAY_DAYS: u32 = 7;
pub const MAX_DELAY_DAYS: u32 = 90;
const MESSAGE_MAX: usize = 1_000;

/// A completed sale whose buyer can still be asked for a review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestableOrder {
    pub transaction_id: TransactionId,
    pub buyer_id: UserId,
    pub product_id: ProductId,
    pub amount: f64,
    pub completed_at: DateTime<Utc>,
}

/// Completed sales of `seller_id` that have a product, no review by that buyer
/// for that product, and no review request yet. Newest first.
pub fn requestable_orders(
    seller_id: UserId,
    transactions: &[Transaction],
    reviews: &[Review],
    requests: &[ReviewRequest],
) -> Vec<RequestableOrder> {
    let reviewed: HashSet<(UserId, ProductId)> = reviews.iter().map(|r| (r.buyer_id, r.product_id)).collect();
    let requested: HashSet<TransactionId> = requests.iter().map(|r| r.transaction_id).collect();

    let mut out: Vec<RequestableOrder> = transactions
        .iter()
        .filter(|t| t.seller_id == seller_id && t.is_completed())
        .filter(|t| !requested.contains(&t.id))
        .filter_map(|t| {
            let product_id = t.product_id?;
            if reviewed.contains(&(t.buyer_id, product_id)) {
                return None;
            }
            Some(RequestableOrder {
                transaction_id: t.id,
                buyer_id: t.buyer_id,
                product_id,
                amount: t.amount,
                completed_at: t.created_at,
            })
        })
        .collect();

    out.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub id: ReviewRequestId,
    pub seller_id: UserId,
    pub transaction_id: TransactionId,
    pub buyer_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

impl ReviewRequest {
    pub fn for_order(seller_id: UserId, order: &RequestableOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: ReviewRequestId::new(),
            seller_id,
            transaction_id: order.transaction_id,
            buyer_id: order.buyer_id,
            product_id: order.product_id,
            created_at: now,
        }
    }
}

/// Per-seller settings for automatically requesting reviews after a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRequestConfig {
    pub seller_id: UserId,
    pub enabled: bool,
    pub delay_days: u32,
    pub message: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AutoRequestConfig {
    /// Settings used until the seller saves their own.
    pub fn default_for(seller_id: UserId) -> Self {
        Self {
            seller_id,
            enabled: false,
            delay_days: DEFAULT_DELAY_DAYS,
            message: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutoRequestPatch {
    pub enabled: Option<bool>,
    pub delay_days: Option<u32>,
    pub message: Option<String>,
}

impl AutoRequestPatch {
    pub fn apply(self, config: &mut AutoRequestConfig, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(days) = self.delay_days {
            if days > MAX_DELAY_DAYS {
                return Err(DomainError::validation(format!(
                    "delay_days must be between 0 and {MAX_DELAY_DAYS}"
                )));
            }
        }
        let message = self
            .message
            .as_deref()
            .map(|m| optional_text("message", Some(m), MESSAGE_MAX))
            .transpose()?;

        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(days) = self.delay_days {
            config.delay_days = days;
        }
        if let Some(message) = message {
            config.message = message;
        }
        config.updated_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_finance::TransactionStatus;

    fn sale(seller: UserId, buyer: UserId, product: Option<ProductId>, status: TransactionStatus, mins_ago: i64) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            seller_id: seller,
            buyer_id: buyer,
            product_id: product,
            amount: 25.0,
            seller_payout: Some(22.5),
            platform_fee: Some(2.5),
            status,
            created_at: Utc::now() - chrono::Duration::minutes(mins_ago),
        }
    }

    #[test]
    fn excludes_reviewed_requested_incomplete_and_foreign_orders() {
        let seller = UserId::new();
        let buyer = UserId::new();
        let product = ProductId::new();

        let open_old = sale(seller, buyer, Some(ProductId::new()), TransactionStatus::Completed, 60);
        let open_new = sale(seller, UserId::new(), Some(product), TransactionStatus::Completed, 5);
        let reviewed = sale(seller, buyer, Some(product), TransactionStatus::Completed, 10);
        let already_asked = sale(seller, UserId::new(), Some(ProductId::new()), TransactionStatus::Completed, 15);
        let refunded = sale(seller, UserId::new(), Some(ProductId::new()), TransactionStatus::Refunded, 20);
        let no_product = sale(seller, UserId::new(), None, TransactionStatus::Completed, 25);
        let foreign = sale(UserId::new(), UserId::new(), Some(ProductId::new()), TransactionStatus::Completed, 30);

        let review = Review::submit(product, seller, buyer, 5, None, Utc::now()).unwrap();
        let request = ReviewRequest {
            id: ReviewRequestId::new(),
            seller_id: seller,
            transaction_id: already_asked.id,
            buyer_id: already_asked.buyer_id,
            product_id: already_asked.product_id.unwrap(),
            created_at: Utc::now(),
        };

        let txs = vec![open_old.clone(), reviewed, already_asked, refunded, no_product, foreign, open_new.clone()];
        let out = requestable_orders(seller, &txs, &[review], &[request]);

        let ids: Vec<_> = out.iter().map(|o| o.transaction_id).collect();
        assert_eq!(ids, vec![open_new.id, open_old.id]);
    }

    #[test]
    fn patch_validates_delay_and_keeps_other_fields() {
        let seller = UserId::new();
        let mut cfg = AutoRequestConfig::default_for(seller);
        AutoRequestPatch { enabled: Some(true), ..AutoRequestPatch::default() }
            .apply(&mut cfg, Utc::now())
            .unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.delay_days, DEFAULT_DELAY_DAYS);
        assert!(cfg.updated_at.is_some());

        let before = cfg.clone();
        let err = AutoRequestPatch { delay_days: Some(MAX_DELAY_DAYS + 1), enabled: Some(false), ..AutoRequestPatch::default() }
            .apply(&mut cfg, Utc::now());
        assert!(err.is_err());
        assert_eq!(cfg, before);
    }
}
