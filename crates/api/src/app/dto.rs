//! Request bodies and the small parsing helpers handlers share.
//!
//! Every field is optional at the serde level so a missing field becomes a
//! `Missing required fields: ...` error listing all of them at once, rather
//! than a deserializer message naming only the first.

use std::str::FromStr;

use serde::Deserialize;

use storefront_core::DomainError;

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CreateStoreRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub visibility: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub visibility: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectSocialRequest {
    pub platform: Option<String>,
    pub account_name: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestReviewsRequest {
    pub transaction_ids: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutoRequestConfigRequest {
    pub enabled: Option<bool>,
    pub delay_days: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkUpdateReviewsRequest {
    pub review_ids: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RespondRequest {
    pub response: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnswerRequest {
    pub answer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseRequest {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub expense_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartConversationRequest {
    pub customer_id: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatMessageRequest {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: Option<String>,
    pub message: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketReplyRequest {
    pub message: Option<String>,
}

// -------------------------
// Helpers
// -------------------------

/// A request field that may be absent.
pub trait Field {
    fn is_present(&self) -> bool;
}

impl Field for Option<String> {
    fn is_present(&self) -> bool {
        self.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

impl Field for Option<f64> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl<T> Field for Option<Vec<T>> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(|v| !v.is_empty())
    }
}

/// Fail with one message naming every absent field, in the order given.
pub fn require(fields: &[(&str, &dyn Field)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| !value.is_present())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(format!("Missing required fields: {}", missing.join(", "))))
    }
}

/// Parse an optional label (`status`, `platform`, ...) into its enum.
pub fn parse_label<T>(raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    Ok(raw.map(str::parse).transpose()?)
}

/// Parse a list of ids, failing on the first malformed one.
pub fn parse_ids<T>(field: &str, raw: &[String]) -> Result<Vec<T>, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.iter()
        .map(|s| s.parse().map_err(|_| ApiError::validation(format!("Invalid id in {field}: {s}"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use storefront_catalog::StoreVisibility;
    use storefront_core::ReviewId;

    use super::*;

    #[test]
    fn require_lists_every_missing_field() {
        let body = ProductRequest {
            name: Some("  ".into()),
            ..Default::default()
        };
        let err = require(&[("name", &body.name), ("price", &body.price)]).unwrap_err();
        assert_eq!(err, ApiError::Validation("Missing required fields: name, price".into()));
    }

    #[test]
    fn require_passes_when_all_present() {
        let body = ProductRequest {
            name: Some("Mug".into()),
            price: Some(0.0),
            ..Default::default()
        };
        assert!(require(&[("name", &body.name), ("price", &body.price)]).is_ok());
    }

    #[test]
    fn empty_lists_count_as_missing() {
        let body = BulkUpdateReviewsRequest {
            review_ids: Some(vec![]),
            status: Some("approved".into()),
        };
        assert!(require(&[("review_ids", &body.review_ids), ("status", &body.status)]).is_err());
    }

    #[test]
    fn labels_and_ids_parse_or_reject() {
        assert_eq!(parse_label::<StoreVisibility>(Some("private")).unwrap(), Some(StoreVisibility::Private));
        assert_eq!(parse_label::<StoreVisibility>(None).unwrap(), None);
        assert!(parse_label::<StoreVisibility>(Some("secret")).is_err());

        let good = ReviewId::new().to_string();
        assert_eq!(parse_ids::<ReviewId>("review_ids", &[good]).unwrap().len(), 1);
        assert!(parse_ids::<ReviewId>("review_ids", &["x".into()]).is_err());
    }
}
