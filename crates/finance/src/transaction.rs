use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{ProductId, TransactionId, UserId, string_enum};

string_enum! {
    pub enum TransactionStatus("transaction status") {
        Pending => "pending",
        Completed => "completed",
        Refunded => "refunded",
        Failed => "failed",
    }
}

/// A marketplace sale settled for a seller. Read-only from the seller API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub seller_id: UserId,
    pub buyer_id: UserId,
    pub product_id: Option<ProductId>,
    /// Gross amount paid by the buyer.
    pub amount: f64,
    /// Amount credited to the seller after fees, when already computed.
    pub seller_payout: Option<f64>,
    pub platform_fee: Option<f64>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// What the seller actually earns from a completed sale.
    pub fn net_to_seller(&self) -> f64 {
        self.seller_payout.unwrap_or(self.amount)
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}
